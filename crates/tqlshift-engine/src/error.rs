//! Stage directory error types.

use std::path::PathBuf;

/// Errors produced by [`Stage`](crate::stage::Stage) operations.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// File-system I/O failure on a specific path.
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stage path exists but is not a directory.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The stage directory does not exist.
    #[error("directory does not exist: {}", .0.display())]
    Missing(PathBuf),

    /// Refusing to replace an existing file.
    #[error("file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
}

impl StageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for stage operations.
pub type Result<T> = std::result::Result<T, StageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_the_path() {
        let err = StageError::io(
            "/stage/admin.app.tql",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/stage/admin.app.tql"), "got: {msg}");
        assert!(msg.contains("denied"), "got: {msg}");
    }

    #[test]
    fn missing_displays() {
        let err = StageError::Missing(PathBuf::from("import"));
        assert_eq!(err.to_string(), "directory does not exist: import");
    }
}
