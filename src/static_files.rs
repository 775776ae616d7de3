//! Static file retrieval.
//!
//! The file lookup collaborator: resolves a request target against the
//! configured document root and returns the file bytes together with a MIME
//! type for the `Content-Type` header.

use bytes::Bytes;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::config::StaticFilesConfig;
use crate::http::mime;

#[derive(Debug)]
pub enum FileError {
    /// The resolved resource does not exist.
    NotFound,
    /// Any other filesystem failure.
    Io(io::Error),
}

pub struct StaticFile {
    pub bytes: Bytes,
    pub mime: &'static str,
}

#[derive(Clone, Debug)]
pub struct StaticFiles {
    root: PathBuf,
    index: String,
}

impl StaticFiles {
    pub fn new(config: &StaticFilesConfig) -> Self {
        Self {
            root: config.root.clone(),
            index: config.index.clone(),
        }
    }

    /// Resolves `target` under the document root and reads it.
    ///
    /// `/` maps to the configured index file. Targets with parent-directory
    /// components never resolve.
    pub fn lookup(&self, target: &str) -> Result<StaticFile, FileError> {
        let relative = target.trim_start_matches('/');
        let relative = if relative.is_empty() {
            self.index.as_str()
        } else {
            relative
        };

        if Path::new(relative)
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(FileError::NotFound);
        }

        let path = self.root.join(relative);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(StaticFile {
                mime: mime::from_path(&path),
                bytes: Bytes::from(bytes),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(FileError::NotFound),
            Err(e) => Err(FileError::Io(e)),
        }
    }
}
