//! Stage directory of exported definition documents.
//!
//! One `<app>.tql` file per application. Documents are always read and
//! written whole; nothing is ever appended or partially rewritten.

use std::fs;
use std::path::{Path, PathBuf};

use tqlshift_types::AppName;

use crate::error::{Result, StageError};

/// File extension of definition documents.
pub const DOCUMENT_EXTENSION: &str = "tql";

/// A definition document found in a stage directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedDocument {
    /// Application name, taken from the file stem.
    pub app: AppName,
    pub path: PathBuf,
}

/// Directory holding definition documents.
#[derive(Debug, Clone)]
pub struct Stage {
    dir: PathBuf,
}

impl Stage {
    /// Open `dir`, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns [`StageError`] if the path is not a directory or cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if dir.exists() && !dir.is_dir() {
            return Err(StageError::NotADirectory(dir));
        }
        fs::create_dir_all(&dir).map_err(|e| StageError::io(&dir, e))?;
        Ok(Self { dir })
    }

    /// Open an existing directory without creating it.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::Missing`] or [`StageError::NotADirectory`].
    pub fn existing(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.exists() {
            return Err(StageError::Missing(dir));
        }
        if !dir.is_dir() {
            return Err(StageError::NotADirectory(dir));
        }
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for `app` (whether or not it exists).
    #[must_use]
    pub fn document_path(&self, app: &AppName) -> PathBuf {
        self.dir.join(format!("{app}.{DOCUMENT_EXTENSION}"))
    }

    /// All `*.tql` documents, sorted by file name.
    ///
    /// A file whose name is not valid UTF-8 cannot name an application; it
    /// is logged and left out.
    ///
    /// # Errors
    ///
    /// Returns [`StageError`] if the directory cannot be listed.
    pub fn documents(&self) -> Result<Vec<StagedDocument>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| StageError::io(&self.dir, e))?;

        let mut documents = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StageError::io(&self.dir, e))?.path();
            let is_document = path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION));
            if !is_document {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                tracing::warn!(
                    path = %path.display(),
                    "Skipping document: file name is not valid UTF-8"
                );
                continue;
            };
            documents.push(StagedDocument {
                app: AppName::new(stem),
                path,
            });
        }

        documents.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(documents)
    }

    /// Read a whole document.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::Io`] on read failure or invalid UTF-8.
    pub fn read(&self, document: &StagedDocument) -> Result<String> {
        fs::read_to_string(&document.path).map_err(|e| StageError::io(&document.path, e))
    }

    /// Replace a whole document.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::Io`] on write failure.
    pub fn write(&self, document: &StagedDocument, text: &str) -> Result<()> {
        fs::write(&document.path, text).map_err(|e| StageError::io(&document.path, e))
    }

    /// Write an arbitrary file (archive, user export) into the stage.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::AlreadyExists`] when the file is present and
    /// `overwrite` is false, [`StageError::Io`] on write failure.
    pub fn write_file(
        &self,
        file_name: &str,
        contents: impl AsRef<[u8]>,
        overwrite: bool,
    ) -> Result<PathBuf> {
        let path = self.dir.join(file_name);
        if !overwrite && path.exists() {
            return Err(StageError::AlreadyExists(path));
        }
        fs::write(&path, contents).map_err(|e| StageError::io(&path, e))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_creates_missing_directory() {
        let root = tempdir().unwrap();
        let dir = root.path().join("stage");
        let stage = Stage::open(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(stage.dir(), dir.as_path());
    }

    #[test]
    fn open_rejects_a_file() {
        let root = tempdir().unwrap();
        let file = root.path().join("stage");
        fs::write(&file, "x").unwrap();
        assert!(matches!(Stage::open(&file), Err(StageError::NotADirectory(_))));
    }

    #[test]
    fn existing_requires_directory() {
        let root = tempdir().unwrap();
        let missing = root.path().join("import");
        assert!(matches!(Stage::existing(&missing), Err(StageError::Missing(_))));
        fs::create_dir(&missing).unwrap();
        assert!(Stage::existing(&missing).is_ok());
    }

    #[test]
    fn documents_are_tql_files_sorted_with_app_from_stem() {
        let root = tempdir().unwrap();
        let stage = Stage::open(root.path()).unwrap();
        fs::write(root.path().join("admin.zeta.tql"), "z").unwrap();
        fs::write(root.path().join("admin.alpha.tql"), "a").unwrap();
        fs::write(root.path().join("all_applications.zip"), "PK").unwrap();
        fs::write(root.path().join("notes.txt"), "n").unwrap();
        fs::create_dir(root.path().join("nested.tql")).unwrap();

        let documents = stage.documents().unwrap();
        let apps: Vec<&str> = documents.iter().map(|d| d.app.as_str()).collect();
        assert_eq!(apps, vec!["admin.alpha", "admin.zeta"]);
    }

    #[test]
    fn read_and_write_replace_whole_file() {
        let root = tempdir().unwrap();
        let stage = Stage::open(root.path()).unwrap();
        let app = AppName::new("admin.app");
        fs::write(stage.document_path(&app), "old contents that are longer").unwrap();

        let document = stage.documents().unwrap().remove(0);
        assert_eq!(stage.read(&document).unwrap(), "old contents that are longer");
        stage.write(&document, "new").unwrap();
        assert_eq!(stage.read(&document).unwrap(), "new");
    }

    #[test]
    fn write_file_lands_in_stage() {
        let root = tempdir().unwrap();
        let stage = Stage::open(root.path()).unwrap();
        let path = stage
            .write_file("all_applications.zip", b"PK\x03\x04", true)
            .unwrap();
        assert_eq!(fs::read(path).unwrap(), b"PK\x03\x04");
    }

    #[test]
    fn write_file_respects_overwrite_flag() {
        let root = tempdir().unwrap();
        let stage = Stage::open(root.path()).unwrap();
        stage.write_file("users.tql", "first", false).unwrap();
        assert!(matches!(
            stage.write_file("users.tql", "second", false),
            Err(StageError::AlreadyExists(_))
        ));
        stage.write_file("users.tql", "second", true).unwrap();
        assert_eq!(fs::read_to_string(root.path().join("users.tql")).unwrap(), "second");
    }
}
