//! Document loading for ingest.
//!
//! [`DocumentLoader`] is the seam between the ingest pipeline and wherever
//! documents live. [`FsLoader`] reads from the local filesystem: text files
//! as UTF-8, PDF and Office files through [`crate::extract`].

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::extract::{extract_text, Format};

/// Loads the raw text of one document.
///
/// A failure is scoped to that one path; the caller decides whether to skip
/// it. Implementations are called from blocking threads.
pub trait DocumentLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<String>;
}

/// Filesystem loader with a per-file size cap.
#[derive(Debug, Clone)]
pub struct FsLoader {
    max_file_bytes: u64,
}

impl FsLoader {
    pub fn new(max_file_bytes: u64) -> Self {
        Self { max_file_bytes }
    }
}

impl DocumentLoader for FsLoader {
    fn load(&self, path: &Path) -> Result<String> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("cannot stat {}", path.display()))?;
        if !metadata.is_file() {
            bail!("{} is not a regular file", path.display());
        }
        if metadata.len() > self.max_file_bytes {
            bail!(
                "{} is {} bytes, over the {} byte limit",
                path.display(),
                metadata.len(),
                self.max_file_bytes
            );
        }

        let bytes =
            std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;

        match Format::from_path(path) {
            Some(format) => extract_text(&bytes, format)
                .with_context(|| format!("cannot extract text from {}", path.display())),
            None => String::from_utf8(bytes)
                .with_context(|| format!("{} is not valid UTF-8", path.display())),
        }
    }
}
