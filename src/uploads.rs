//! Sources of dynamically added documents.
//!
//! Ingest asks an [`UploadRegistry`] for the current upload list on every
//! run, on top of the static `[corpus].paths`. [`DirUploadRegistry`] treats
//! a directory as the registry: whatever the upload collaborator has written
//! there and matches the include globs is part of the corpus.

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::PathBuf;
use tracing::warn;
use walkdir::WalkDir;

use crate::config::CorpusConfig;

pub trait UploadRegistry: Send + Sync {
    /// Current set of uploaded document paths.
    fn paths(&self) -> Result<Vec<PathBuf>>;
}

/// A fixed list, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticUploads(pub Vec<PathBuf>);

impl UploadRegistry for StaticUploads {
    fn paths(&self) -> Result<Vec<PathBuf>> {
        Ok(self.0.clone())
    }
}

/// Every matching file under a directory, sorted by path.
pub struct DirUploadRegistry {
    root: PathBuf,
    include: GlobSet,
    exclude: GlobSet,
}

impl DirUploadRegistry {
    pub fn new(root: PathBuf, include_globs: &[String], exclude_globs: &[String]) -> Result<Self> {
        let mut excludes = vec!["**/.*".to_string(), "**/.*/**".to_string()];
        excludes.extend(exclude_globs.iter().cloned());
        Ok(Self {
            root,
            include: build_globset(include_globs)?,
            exclude: build_globset(&excludes)?,
        })
    }

    pub fn from_config(corpus: &CorpusConfig) -> Result<Option<Self>> {
        corpus
            .uploads_dir
            .as_ref()
            .map(|dir| Self::new(dir.clone(), &corpus.include_globs, &corpus.exclude_globs))
            .transpose()
    }
}

impl UploadRegistry for DirUploadRegistry {
    fn paths(&self) -> Result<Vec<PathBuf>> {
        if !self.root.exists() {
            warn!(dir = %self.root.display(), "uploads directory does not exist");
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable upload entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            let rel_str = relative.to_string_lossy();

            if self.exclude.is_match(rel_str.as_ref()) || !self.include.is_match(rel_str.as_ref()) {
                continue;
            }
            paths.push(path.to_path_buf());
        }

        paths.sort();
        Ok(paths)
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
