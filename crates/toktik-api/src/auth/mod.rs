//! Caller identity
//!
//! Authentication happens upstream: a proxy verifies the caller and injects
//! the `X-Username` header, which is trusted as-is.

mod identity;

pub use identity::UserIdentity;
