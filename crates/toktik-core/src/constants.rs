//! Constants shared by the storage layout, the encoder contract and the API.

/// Bucket used when `S3_BUCKET` is not set.
pub const DEFAULT_BUCKET: &str = "toktik-videos";

/// Region used when `S3_REGION` is not set.
pub const DEFAULT_REGION: &str = "sgp1";

/// Playlist written by the encoder under every video root.
pub const MANIFEST_FILENAME: &str = "vid.m3u8";

/// Object name of the raw upload under a video root.
pub const UPLOAD_OBJECT_NAME: &str = "vid";

/// Prefix the encoder gives every segment and sub-playlist it writes.
/// Lines of the stored playlist starting with it are rewritten to capability URLs.
pub const SEGMENT_PREFIX: &str = "vid";

/// Object name of the thumbnail under a video root.
pub const THUMBNAIL_OBJECT_NAME: &str = "thumbnail";

/// Number of random alphanumeric characters in a freshly generated video key.
pub const VIDEO_KEY_LEN: usize = 100;

/// Task type consumed by the external encoder.
pub const ENCODE_TASK_TYPE: &str = "video:save";

/// Header injected by the upstream auth proxy with the verified username.
pub const USERNAME_HEADER: &str = "x-username";
