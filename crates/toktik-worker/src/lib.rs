//! TokTik task submission
//!
//! Encode tasks are written to the `tasks` table and announced over
//! `pg_notify`; the external encoder claims and runs them.

pub mod queue;

pub use queue::{EncodeQueue, TaskQueue, TaskQueueConfig};
