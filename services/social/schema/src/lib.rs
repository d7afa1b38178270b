//! sea-orm entities for the social service database.

pub mod conversation_outbox;
pub mod friend_requests;
pub mod profile_sync_outbox;
pub mod profiles;
pub mod user_lifecycle_outbox;
pub mod users;
