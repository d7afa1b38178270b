//! Test utilities for Amora services.
//!
//! Provides `MockAuth` bearer headers and `MockHttpServer` for standing in for
//! downstream HTTP collaborators. Use from tests only. Not for production code.

pub mod auth;
pub mod http;
