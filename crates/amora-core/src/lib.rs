//! Service plumbing shared by Amora backends: request ids, tracing setup,
//! env-driven config, liveness and serde helpers.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
