pub mod feed;
pub mod local_object;
pub mod upload;
pub mod video_info;
pub mod video_stream;
