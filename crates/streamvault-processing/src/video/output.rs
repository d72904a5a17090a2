use std::path::{Path, PathBuf};

/// Output directory name for a staged file: its unique filename without the extension.
pub fn output_dir_name(unique_filename: &str) -> &str {
    Path::new(unique_filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(unique_filename)
}

/// Create `<output_root>/<stem>`; an existing directory is reused.
pub async fn prepare_output_dir(
    output_root: &Path,
    unique_filename: &str,
) -> std::io::Result<PathBuf> {
    let dir = output_root.join(output_dir_name(unique_filename));
    tokio::fs::create_dir_all(&dir).await?;
    Ok(dir)
}
