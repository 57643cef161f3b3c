//! Database repositories
//!
//! Each repository owns the queries for one table and holds a cloned `PgPool`.

pub mod task;
pub mod user;
pub mod video;

pub use task::TaskRepository;
pub use user::UserRepository;
pub use video::VideoRepository;
