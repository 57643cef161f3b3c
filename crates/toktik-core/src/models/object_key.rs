use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::{MANIFEST_FILENAME, THUMBNAIL_OBJECT_NAME, UPLOAD_OBJECT_NAME};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("object key must not be empty")]
    Empty,

    #[error("object key must not start with '/': {0}")]
    Absolute(String),

    #[error("object key must not contain a '..' segment: {0}")]
    Traversal(String),

    #[error("invalid key segment: {0:?}")]
    InvalidSegment(String),
}

/// Hierarchical name of a blob in object storage, e.g.
/// `users/alice/videos/<video key>/vid.m3u8`.
///
/// Never empty, never absolute, never has a `..` segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn parse(raw: impl Into<String>) -> Result<Self, KeyError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(KeyError::Empty);
        }
        if raw.starts_with('/') {
            return Err(KeyError::Absolute(raw));
        }
        if raw.split('/').any(|segment| segment == "..") {
            return Err(KeyError::Traversal(raw));
        }
        if raw.chars().any(|c| c.is_control() || c == '\\') {
            return Err(KeyError::InvalidSegment(raw));
        }
        Ok(ObjectKey(raw))
    }

    /// `users/<username>/videos/<video_key>`
    pub fn video_root(username: &str, video_key: &str) -> Result<Self, KeyError> {
        validate_segment(username)?;
        validate_segment(video_key)?;
        Ok(ObjectKey(format!("users/{}/videos/{}", username, video_key)))
    }

    /// Raw upload target under a video root.
    pub fn upload_target(username: &str, video_key: &str) -> Result<Self, KeyError> {
        Self::video_root(username, video_key)?.join(UPLOAD_OBJECT_NAME)
    }

    pub fn thumbnail(username: &str, video_key: &str) -> Result<Self, KeyError> {
        Self::video_root(username, video_key)?.join(THUMBNAIL_OBJECT_NAME)
    }

    /// Playlist location under this root.
    pub fn manifest(&self) -> Self {
        ObjectKey(format!("{}/{}", self.0, MANIFEST_FILENAME))
    }

    /// Appends a relative child path, which may itself contain `/`.
    pub fn join(&self, child: &str) -> Result<Self, KeyError> {
        if child.is_empty() {
            return Err(KeyError::Empty);
        }
        Self::parse(format!("{}/{}", self.0, child))
    }

    /// Video key of this key if it is the upload target owned by `username`,
    /// i.e. `users/<username>/videos/<video_key>/vid`.
    pub fn upload_video_key(&self, username: &str) -> Option<&str> {
        match self.0.split('/').collect::<Vec<_>>().as_slice() {
            ["users", owner, "videos", video_key, name]
                if *owner == username
                    && *name == UPLOAD_OBJECT_NAME
                    && validate_segment(video_key).is_ok() =>
            {
                Some(*video_key)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// A single path component: non-empty, no separators, not `.` or `..`.
pub fn validate_segment(segment: &str) -> Result<(), KeyError> {
    if segment.is_empty() {
        return Err(KeyError::Empty);
    }
    if segment == "."
        || segment.contains("..")
        || segment.contains('/')
        || segment.contains('\\')
        || segment.chars().any(|c| c.is_control() || c.is_whitespace())
    {
        return Err(KeyError::InvalidSegment(segment.to_string()));
    }
    Ok(())
}

impl Display for ObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ObjectKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ObjectKey::parse(value)
    }
}

impl From<ObjectKey> for String {
    fn from(key: ObjectKey) -> Self {
        key.0
    }
}
