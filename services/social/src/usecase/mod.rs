pub mod friend_request;
pub mod lifecycle;
pub mod matching;
pub mod profile;
