//! Domain types shared across Amora services.
//!
//! Pure types with no framework dependencies. Import in `usecase/` and `domain/`
//! layers; `infra/` converts them to and from their stored representation.

pub mod friend_request;
pub mod lifecycle;
