//! Random video key generation.
//!
//! Video keys are the unguessable component of `users/{username}/videos/{video_key}`.

use rand::distr::{Alphanumeric, SampleString};
use toktik_core::constants::VIDEO_KEY_LEN;

/// Generate a fresh video key: `VIDEO_KEY_LEN` characters drawn uniformly from `[A-Za-z0-9]`.
pub fn generate_video_key() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), VIDEO_KEY_LEN)
}

/// Whether `candidate` has the shape of a generated video key.
pub fn is_video_key(candidate: &str) -> bool {
    candidate.len() == VIDEO_KEY_LEN && candidate.bytes().all(|b| b.is_ascii_alphanumeric())
}
