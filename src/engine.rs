//! The engine: one shared index plus the operations exposed on it.
//!
//! | Operation | Mutates index | Errors |
//! |-----------|---------------|--------|
//! | [`Engine::ingest`] | replaces it | only if the worker task dies |
//! | [`Engine::search`] | no | [`EngineError::InvalidInput`] |
//! | [`Engine::ask`] | no | [`EngineError::InvalidInput`] |
//! | [`Engine::status`] | no | none |
//!
//! `Engine` is `Send + Sync`; wrap it in an `Arc` to share it between the
//! HTTP handlers or tasks. Queries take an index snapshot up front, so they
//! can run in parallel with an ingest.

use anyhow::Result;
use serde::Deserialize;
use std::sync::Arc;

use crate::answer::{assemble, AnswerParams, AskContext};
use crate::config::Config;
use crate::error::EngineError;
use crate::generate::{create_generator, Generator};
use crate::index::IndexHandle;
use crate::ingest::IngestPipeline;
use crate::loader::FsLoader;
use crate::models::{AnswerResult, IngestReport, ScoredChunk, StatusResponse};
use crate::search::search;
use crate::tokenize::Tokenizer;
use crate::uploads::{DirUploadRegistry, UploadRegistry};

/// Input of the search operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// Input of the ask operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
    /// Defaults to true: use the generator whenever one is configured.
    #[serde(default)]
    pub use_external_generation: Option<bool>,
}

pub struct Engine {
    index: IndexHandle,
    pipeline: Arc<IngestPipeline>,
    params: AnswerParams,
    default_top_k: usize,
    generator: Option<Arc<dyn Generator>>,
}

impl Engine {
    pub fn new(
        pipeline: IngestPipeline,
        params: AnswerParams,
        default_top_k: usize,
        generator: Option<Arc<dyn Generator>>,
    ) -> Self {
        Self {
            index: IndexHandle::new(),
            pipeline: Arc::new(pipeline),
            params,
            default_top_k,
            generator,
        }
    }

    /// Wire up the filesystem loader, upload directory and generator
    /// described by `config`. The index starts empty.
    pub fn from_config(config: &Config) -> Result<Self> {
        let uploads = DirUploadRegistry::from_config(&config.corpus)?
            .map(|r| Arc::new(r) as Arc<dyn UploadRegistry>);

        let pipeline = IngestPipeline {
            static_paths: config.corpus.paths.clone(),
            uploads,
            loader: Arc::new(FsLoader::new(config.corpus.max_file_bytes)),
            tokenizer: Tokenizer::new(config.retrieval.script_ranges()),
            max_words: config.chunking.max_words,
        };

        Ok(Self::new(
            pipeline,
            AnswerParams::from_config(config),
            config.retrieval.top_k,
            create_generator(&config.generation)?,
        ))
    }

    /// Rebuild the index from the corpus and publish it.
    pub async fn ingest(&self) -> Result<IngestReport> {
        self.pipeline.run(&self.index).await
    }

    pub fn search(&self, req: &SearchRequest) -> Result<Vec<ScoredChunk>, EngineError> {
        let question = require_question(req.question.as_deref())?;
        let top_k = self.resolve_top_k(req.top_k)?;
        let snapshot = self.index.snapshot();
        Ok(search(&snapshot, &self.pipeline.tokenizer, question, top_k))
    }

    pub async fn ask(&self, req: &AskRequest) -> Result<AnswerResult, EngineError> {
        let question = require_question(req.question.as_deref())?;
        let top_k = self.resolve_top_k(req.top_k)?;

        let results = {
            let snapshot = self.index.snapshot();
            search(&snapshot, &self.pipeline.tokenizer, question, top_k)
        };

        let ctx = AskContext {
            industry: req.industry.as_deref(),
            scenario: req.scenario.as_deref(),
        };
        Ok(assemble(
            question,
            &ctx,
            results,
            &self.params,
            self.generator.as_deref(),
            req.use_external_generation.unwrap_or(true),
        )
        .await)
    }

    pub fn status(&self) -> StatusResponse {
        StatusResponse {
            indexed: self.index.len(),
        }
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    fn resolve_top_k(&self, top_k: Option<usize>) -> Result<usize, EngineError> {
        match top_k {
            Some(0) => Err(EngineError::InvalidInput(
                "top_k must be a positive integer".to_string(),
            )),
            Some(k) => Ok(k),
            None => Ok(self.default_top_k),
        }
    }
}

fn require_question(question: Option<&str>) -> Result<&str, EngineError> {
    match question.map(str::trim) {
        Some(q) if !q.is_empty() => Ok(q),
        _ => Err(EngineError::InvalidInput(
            "question must not be empty".to_string(),
        )),
    }
}
