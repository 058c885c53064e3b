//! Ingestion pipeline orchestration.
//!
//! Coordinates one full rebuild: corpus paths (static list + uploads) →
//! load → chunk → tokenize → vectorize → new [`Index`] → atomic swap.
//! A document that fails to load is logged, recorded in
//! [`IngestReport::skipped`], and left out; it never aborts the run.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::chunk::chunk_words;
use crate::index::{Index, IndexHandle};
use crate::loader::DocumentLoader;
use crate::models::{Chunk, IngestReport};
use crate::tokenize::Tokenizer;
use crate::uploads::UploadRegistry;
use crate::vector::vectorize;

/// Everything needed to rebuild the index from scratch.
pub struct IngestPipeline {
    pub static_paths: Vec<PathBuf>,
    pub uploads: Option<Arc<dyn UploadRegistry>>,
    pub loader: Arc<dyn DocumentLoader>,
    pub tokenizer: Tokenizer,
    pub max_words: usize,
}

impl IngestPipeline {
    /// Static paths first, then uploads, each file once.
    ///
    /// Paths are compared after canonicalization, so `./uploads/a.md` and
    /// `uploads/a.md` are the same document. A path that cannot be
    /// canonicalized (for example, a missing file) is compared as written.
    pub fn corpus_paths(&self) -> Vec<PathBuf> {
        let uploaded = match &self.uploads {
            Some(registry) => registry.paths().unwrap_or_else(|e| {
                warn!(error = %e, "upload registry unavailable; ingesting static corpus only");
                Vec::new()
            }),
            None => Vec::new(),
        };

        let mut seen = HashSet::new();
        self.static_paths
            .iter()
            .chain(uploaded.iter())
            .filter(|p| seen.insert(std::fs::canonicalize(p).unwrap_or_else(|_| (*p).clone())))
            .cloned()
            .collect()
    }

    /// Build a fresh index from `paths` without publishing it.
    pub fn build(&self, paths: &[PathBuf]) -> (Index, IngestReport) {
        let mut chunks = Vec::new();
        let mut report = IngestReport::default();

        for path in paths {
            let text = match self.loader.load(path) {
                Ok(t) => t,
                Err(e) => {
                    let reason = format!("{:#}", e);
                    warn!(path = %path.display(), error = %reason, "skipping unreadable document");
                    report.skipped.push(path.display().to_string());
                    continue;
                }
            };

            let before = chunks.len();
            for (ordinal, piece) in chunk_words(&text, self.max_words).into_iter().enumerate() {
                let vector = vectorize(self.tokenizer.tokenize(&piece));
                chunks.push(Chunk::new(path, ordinal, piece, vector));
            }
            debug!(path = %path.display(), chunks = chunks.len() - before, "document chunked");
            report.documents += 1;
        }

        report.indexed = chunks.len();
        (Index::new(chunks), report)
    }

    /// Rebuild and publish the index. Concurrent calls run one at a time.
    pub async fn run(self: &Arc<Self>, handle: &IndexHandle) -> Result<IngestReport> {
        let _guard = handle.lock_ingest().await;

        let pipeline = Arc::clone(self);
        let (index, report) = tokio::task::spawn_blocking(move || {
            let paths = pipeline.corpus_paths();
            pipeline.build(&paths)
        })
        .await
        .context("ingest worker panicked")?;

        handle.replace(index);
        info!(
            indexed = report.indexed,
            documents = report.documents,
            skipped = report.skipped.len(),
            "index rebuilt"
        );
        Ok(report)
    }
}
