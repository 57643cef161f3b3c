pub mod catalogue;
pub mod manifest;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_support;

pub use catalogue::{CatalogueService, VideoEntry};
pub use manifest::{ManifestError, ManifestRewriter};
pub use upload::{ConfirmedUpload, UploadCoordinator, UploadError, UploadTicket};
