//! API constants

/// Content type of rewritten playlists
pub const MANIFEST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

/// Rewritten playlists embed short-lived capabilities and must not be cached
pub const MANIFEST_CACHE_CONTROL: &str = "no-store";

/// Route prefix under which the local backend serves its capability URLs
pub const OBJECTS_PREFIX: &str = "/objects";

/// Largest request body accepted (raw uploads through a local write capability)
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024 * 1024;

/// Upper bound on concurrently served requests
pub const HTTP_CONCURRENCY_LIMIT: usize = 10_000;
