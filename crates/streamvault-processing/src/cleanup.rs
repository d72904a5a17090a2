//! Scoped removal of local pipeline artifacts.
//!
//! Each stage that creates something on local disk registers it with the run's
//! [`CleanupScope`]. Dropping the scope removes everything registered, on success,
//! early return, error propagation and cancellation alike.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArtifactKind {
    File,
    Directory,
}

/// Removes one local file or directory tree when dropped
#[derive(Debug)]
pub struct LocalArtifactGuard {
    path: PathBuf,
    kind: ArtifactKind,
    armed: bool,
}

impl LocalArtifactGuard {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: ArtifactKind::File,
            armed: true,
        }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: ArtifactKind::Directory,
            armed: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Leave the artifact on disk.
    pub fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for LocalArtifactGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        // Blocking removal on the current worker. The artifacts must be gone before
        // the run's future completes, and a directory holds one upload's segments.
        let result = match self.kind {
            ArtifactKind::File => std::fs::remove_file(&self.path),
            ArtifactKind::Directory => std::fs::remove_dir_all(&self.path),
        };

        match result {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Removed local artifact");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %self.path.display(),
                    "Failed to remove local artifact"
                );
            }
        }
    }
}

/// All local artifacts of one pipeline run
#[derive(Debug, Default)]
pub struct CleanupScope {
    guards: Vec<LocalArtifactGuard>,
    keep_artifacts: bool,
}

impl CleanupScope {
    /// `keep_artifacts` leaves everything on disk (debugging override).
    pub fn new(keep_artifacts: bool) -> Self {
        Self {
            guards: Vec::new(),
            keep_artifacts,
        }
    }

    pub fn register_file(&mut self, path: impl Into<PathBuf>) {
        self.register(LocalArtifactGuard::file(path));
    }

    pub fn register_directory(&mut self, path: impl Into<PathBuf>) {
        self.register(LocalArtifactGuard::directory(path));
    }

    fn register(&mut self, mut guard: LocalArtifactGuard) {
        if self.keep_artifacts {
            tracing::info!(path = %guard.path().display(), "Keeping local artifact");
            guard.disarm();
        }
        self.guards.push(guard);
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}

impl Drop for CleanupScope {
    fn drop(&mut self) {
        // Newest first, so an output directory goes before the file it was made from.
        while let Some(guard) = self.guards.pop() {
            drop(guard);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_scope_removes_file_and_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("raw.mp4");
        let output = dir.path().join("raw");
        std::fs::write(&file, b"x").unwrap();
        std::fs::create_dir_all(&output).unwrap();
        std::fs::write(output.join("output.m3u8"), b"#EXTM3U").unwrap();

        {
            let mut scope = CleanupScope::new(false);
            scope.register_file(&file);
            scope.register_directory(&output);
            assert_eq!(scope.len(), 2);
        }

        assert!(!file.exists());
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_paths_are_ignored() {
        let dir = tempdir().unwrap();
        let mut scope = CleanupScope::new(false);
        scope.register_file(dir.path().join("never-created.mp4"));
        scope.register_directory(dir.path().join("never-created"));
        drop(scope);
    }

    #[test]
    fn test_keep_artifacts_leaves_files() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("raw.mp4");
        std::fs::write(&file, b"x").unwrap();

        {
            let mut scope = CleanupScope::new(true);
            scope.register_file(&file);
        }

        assert!(file.exists());
    }

    #[test]
    fn test_disarmed_guard_keeps_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("raw.mp4");
        std::fs::write(&file, b"x").unwrap();

        let mut guard = LocalArtifactGuard::file(&file);
        guard.disarm();
        drop(guard);

        assert!(file.exists());
    }
}
