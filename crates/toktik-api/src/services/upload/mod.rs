//! Upload pipeline: write capability issuance and upload confirmation.

mod service;
mod types;

pub use service::UploadCoordinator;
pub use types::{ConfirmedUpload, UploadError, UploadTicket};
