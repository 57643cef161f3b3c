//! TokTik API Library
//!
//! HTTP handlers, the video services behind them (manifest rewriting,
//! upload coordination, catalogue) and application setup.

mod api_doc;
pub mod constants;
mod handlers;
pub mod services;
pub mod setup;
mod telemetry;

pub mod auth;
pub mod error;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
