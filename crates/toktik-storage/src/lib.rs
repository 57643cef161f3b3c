//! TokTik Storage Library
//!
//! Storage abstraction, the S3-compatible and local filesystem backends, and
//! the capability issuer that turns them into short-lived signed URLs.
//!
//! # Storage key format
//!
//! Every video lives under `users/{username}/videos/{video_key}`:
//!
//! - `vid`: raw upload written by the client through a write capability
//! - `vid.m3u8`: playlist written by the encoder
//! - `vid*`: segments and sub-playlists referenced by the playlist
//! - `thumbnail`: poster image written by the encoder
//!
//! Keys must not contain `..` or a leading `/`; see [`toktik_core::models::ObjectKey`].

pub mod capability;
pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod signing;
pub mod traits;

// Re-export commonly used types
pub use capability::{CapabilityError, CapabilityIssuer};
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use signing::{SignatureError, SignedQuery, UrlSigner};
pub use toktik_core::StorageBackend;
pub use traits::{ByteStream, Storage, StorageError, StorageResult};
