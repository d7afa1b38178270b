//! Auth types shared across Amora services.
//!
//! Provides bearer JWT issuance/validation and the `Identity` extractor.

pub mod identity;
pub mod token;
