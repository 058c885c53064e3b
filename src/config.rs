//! TOML configuration parsing and validation.
//!
//! Every section except `[corpus]` is optional and falls back to the defaults
//! below. [`load_config`] rejects values the engine cannot work with
//! (zero chunk size, zero `top_k`, out-of-range thresholds, unknown
//! generation providers) before anything is ingested.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::tokenize::ScriptRange;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub answer: AnswerConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CorpusConfig {
    /// Static document list, ingested on every run.
    #[serde(default)]
    pub paths: Vec<PathBuf>,
    /// Directory the upload collaborator drops files into.
    #[serde(default)]
    pub uploads_dir: Option<PathBuf>,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

fn default_include_globs() -> Vec<String> {
    [
        "**/*.md", "**/*.txt", "**/*.pdf", "**/*.docx", "**/*.pptx", "**/*.xlsx",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_file_bytes() -> u64 {
    20 * 1024 * 1024
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_words")]
    pub max_words: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_words: default_max_words(),
        }
    }
}

fn default_max_words() -> usize {
    crate::chunk::DEFAULT_MAX_WORDS
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Results scoring at or below this are not used in answers.
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f64,
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
    /// Inclusive code point ranges accepted by the tokenizer besides ASCII
    /// letters and digits.
    #[serde(default = "default_script_ranges")]
    pub extra_script_ranges: Vec<[u32; 2]>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            relevance_threshold: default_relevance_threshold(),
            preview_chars: default_preview_chars(),
            extra_script_ranges: default_script_ranges(),
        }
    }
}

fn default_top_k() -> usize {
    crate::search::DEFAULT_TOP_K
}
fn default_relevance_threshold() -> f64 {
    0.01
}
fn default_preview_chars() -> usize {
    240
}
fn default_script_ranges() -> Vec<[u32; 2]> {
    vec![[0x4E00, 0x9FFF]]
}

impl RetrievalConfig {
    pub fn script_ranges(&self) -> Vec<ScriptRange> {
        self.extra_script_ranges
            .iter()
            .filter_map(|[start, end]| ScriptRange::new(*start, *end))
            .collect()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnswerConfig {
    /// Returned verbatim when nothing clears the relevance threshold.
    #[serde(default = "default_insufficient_message")]
    pub insufficient_message: String,
    /// First line of the built-in extractive answer.
    #[serde(default = "default_header")]
    pub header: String,
    /// Language the generator is asked to answer in.
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            insufficient_message: default_insufficient_message(),
            header: default_header(),
            language: default_language(),
        }
    }
}

fn default_insufficient_message() -> String {
    "当前资料中没有足够的信息回答这个问题。请补充相关文档后重试。".to_string()
}
fn default_header() -> String {
    "根据当前资料，最相关的内容如下：".to_string()
}
fn default_language() -> String {
    "Chinese".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            url: default_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            temperature: default_temperature(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_url() -> String {
    "https://api.openai.com".to_string()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    2
}
fn default_temperature() -> f32 {
    0.2
}

impl GenerationConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

impl Config {
    /// A config with every default and an empty corpus.
    pub fn minimal() -> Self {
        Self {
            corpus: CorpusConfig {
                include_globs: default_include_globs(),
                max_file_bytes: default_max_file_bytes(),
                ..CorpusConfig::default()
            },
            chunking: ChunkingConfig::default(),
            retrieval: RetrievalConfig::default(),
            answer: AnswerConfig::default(),
            generation: GenerationConfig::default(),
            server: ServerConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunking.max_words == 0 {
            anyhow::bail!("chunking.max_words must be > 0");
        }

        if self.retrieval.top_k == 0 {
            anyhow::bail!("retrieval.top_k must be > 0");
        }

        if !(0.0..1.0).contains(&self.retrieval.relevance_threshold) {
            anyhow::bail!("retrieval.relevance_threshold must be in [0.0, 1.0)");
        }

        if self.retrieval.preview_chars == 0 {
            anyhow::bail!("retrieval.preview_chars must be > 0");
        }

        for [start, end] in &self.retrieval.extra_script_ranges {
            if ScriptRange::new(*start, *end).is_none() {
                anyhow::bail!(
                    "retrieval.extra_script_ranges: [{:#x}, {:#x}] is not a valid code point range",
                    start,
                    end
                );
            }
        }

        match self.generation.provider.as_str() {
            "disabled" | "openai" => {}
            other => anyhow::bail!(
                "Unknown generation provider: '{}'. Must be disabled or openai.",
                other
            ),
        }

        if self.generation.timeout_secs == 0 {
            anyhow::bail!("generation.timeout_secs must be > 0");
        }

        let temperature = self.generation.temperature;
        if !temperature.is_finite() || temperature < 0.0 {
            anyhow::bail!(
                "generation.temperature must be a finite number >= 0, got {}",
                temperature
            );
        }

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}
