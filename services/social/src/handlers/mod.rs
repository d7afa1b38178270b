pub mod friend_request;
pub mod health;
pub mod lifecycle;
pub mod matching;
pub mod profile;
