//! Core data models shared by the ingest and query paths.
//!
//! [`Chunk`]s are built once during ingest and owned by the index; queries
//! hand out cheap `Arc` references to them inside [`ScoredChunk`]s. The
//! `*Response` / [`SearchHit`] types are the serialized shapes returned by
//! the CLI (`--json`) and the HTTP server.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::vector::TermVector;

/// One bounded slice of a document, with its term vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// `<basename>::<ordinal>`.
    pub id: String,
    pub source: PathBuf,
    pub ordinal: usize,
    pub text: String,
    pub vector: TermVector,
}

impl Chunk {
    pub fn new(source: &Path, ordinal: usize, text: String, vector: TermVector) -> Self {
        Self {
            id: format!("{}::{}", basename(source), ordinal),
            source: source.to_path_buf(),
            ordinal,
            text,
            vector,
        }
    }

    pub fn source_name(&self) -> String {
        basename(&self.source)
    }
}

/// Final path component, or the whole path when it has none.
pub fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// A chunk paired with its similarity to a query.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Arc<Chunk>,
    pub score: f64,
}

/// An assembled answer for one question.
#[derive(Debug, Clone)]
pub struct AnswerResult {
    pub text: String,
    pub sources: Vec<ScoredChunk>,
    pub confidence: f64,
    /// True when the text came from the external generator.
    pub generated: bool,
}

/// Outcome of one ingest run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub indexed: usize,
    pub documents: usize,
    /// Paths that could not be read and were left out of the index.
    pub skipped: Vec<String>,
}

/// Wire shape of a single search result.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub source: String,
    pub chunk_index: usize,
    pub text: String,
    pub score: f64,
}

impl From<&ScoredChunk> for SearchHit {
    fn from(sc: &ScoredChunk) -> Self {
        Self {
            id: sc.chunk.id.clone(),
            source: sc.chunk.source.display().to_string(),
            chunk_index: sc.chunk.ordinal,
            text: sc.chunk.text.clone(),
            score: sc.score,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub sources: Vec<SearchHit>,
    pub confidence: f64,
    pub generated: bool,
}

impl From<&AnswerResult> for AskResponse {
    fn from(result: &AnswerResult) -> Self {
        Self {
            answer: result.text.clone(),
            sources: result.sources.iter().map(SearchHit::from).collect(),
            confidence: result.confidence,
            generated: result.generated,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub indexed: usize,
}
