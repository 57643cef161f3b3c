//! Data models for the application

mod capability;
mod object_key;
mod playlist;
mod task;
mod video;

pub use capability::*;
pub use object_key::*;
pub use playlist::*;
pub use task::*;
pub use video::*;
