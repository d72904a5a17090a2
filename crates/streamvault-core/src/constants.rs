//! Fixed pipeline parameters.

/// Upload ceiling: 100 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Container formats accepted by the validator (lowercase, without the dot).
pub const DEFAULT_VIDEO_EXTENSIONS: &[&str] =
    &["mp4", "webm", "avi", "mkv", "mov", "wmv", "flv", "3gp"];

pub const HLS_SEGMENT_SECONDS: u64 = 10;
pub const THUMBNAIL_OFFSET_SECONDS: u64 = 8;
pub const THUMBNAIL_WIDTH: u32 = 480;

pub const MANIFEST_FILENAME: &str = "output.m3u8";
pub const MANIFEST_EXTENSION: &str = "m3u8";
pub const SEGMENT_EXTENSION: &str = "ts";
pub const THUMBNAIL_FILENAME: &str = "thumbnail.webp";
pub const THUMBNAIL_EXTENSION: &str = "webp";

pub const CONTENT_TYPE_MANIFEST: &str = "application/vnd.apple.mpegurl";
pub const CONTENT_TYPE_SEGMENT: &str = "video/mp2t";
pub const CONTENT_TYPE_THUMBNAIL: &str = "image/webp";
pub const CONTENT_TYPE_DEFAULT: &str = "application/octet-stream";

/// Content type for an artifact file, chosen by extension.
pub fn content_type_for(filename: &str) -> &'static str {
    match filename.rsplit_once('.').map(|(_, ext)| ext) {
        Some(MANIFEST_EXTENSION) => CONTENT_TYPE_MANIFEST,
        Some(SEGMENT_EXTENSION) => CONTENT_TYPE_SEGMENT,
        Some(THUMBNAIL_EXTENSION) => CONTENT_TYPE_THUMBNAIL,
        _ => CONTENT_TYPE_DEFAULT,
    }
}
