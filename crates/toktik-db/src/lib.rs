//! TokTik Database Layer
//!
//! PostgreSQL repositories for users, videos and encode tasks, plus the
//! [`MetadataStore`] abstraction the upload and catalogue services depend on.

pub mod db;
pub mod store;

pub use db::{TaskRepository, UserRepository, VideoRepository};
pub use store::{MetadataStore, PgMetadataStore};
