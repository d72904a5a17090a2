//! Shared key generation for storage backends.

use crate::{StorageError, StorageResult};

/// Storage key for an artifact of the upload whose prefix is `prefix`.
///
/// Produces `{prefix}/{filename}`. Both parts must be non-empty, must not contain
/// a `.` or `..` path segment, and must not introduce a leading `/`.
pub fn object_key(prefix: &str, filename: &str) -> StorageResult<String> {
    validate_segment(prefix)?;
    validate_segment(filename)?;
    if filename.contains('/') {
        return Err(StorageError::InvalidKey(format!(
            "Artifact filename must not contain '/': {}",
            filename
        )));
    }
    Ok(format!("{}/{}", prefix.trim_end_matches('/'), filename))
}

/// Listing prefix for every artifact of one upload (`{prefix}/`).
pub fn listing_prefix(prefix: &str) -> StorageResult<String> {
    validate_segment(prefix)?;
    Ok(format!("{}/", prefix.trim_end_matches('/')))
}

fn validate_segment(segment: &str) -> StorageResult<()> {
    if segment.trim_matches('/').is_empty() {
        return Err(StorageError::InvalidKey("Key segment is empty".to_string()));
    }
    let traverses = segment.split('/').any(|part| part == "." || part == "..");
    if traverses || segment.starts_with('/') {
        return Err(StorageError::InvalidKey(format!(
            "Key segment contains invalid characters: {}",
            segment
        )));
    }
    Ok(())
}
