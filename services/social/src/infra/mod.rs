pub mod broker;
pub mod conversation;
pub mod db;
pub mod matching;
