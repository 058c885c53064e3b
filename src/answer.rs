//! Answer assembly from ranked search results.
//!
//! Results at or below the relevance threshold are dropped. If nothing is
//! left the caller gets the configured "insufficient information" message
//! with no sources and zero confidence. Otherwise confidence is the mean
//! score of the retained results, and the text comes from the first
//! strategy that succeeds:
//!
//! 1. the external [`Generator`], when one is present and requested;
//! 2. the built-in extractive format: one attributed preview per source.
//!
//! A generator that is absent or fails only moves the chain on to step 2;
//! sources and confidence are the same either way.

use tracing::{debug, warn};

use crate::config::Config;
use crate::generate::Generator;
use crate::models::{AnswerResult, ScoredChunk};

/// Tunables for answer assembly.
#[derive(Debug, Clone)]
pub struct AnswerParams {
    pub relevance_threshold: f64,
    pub preview_chars: usize,
    pub insufficient_message: String,
    pub header: String,
    pub language: String,
}

impl AnswerParams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            relevance_threshold: config.retrieval.relevance_threshold,
            preview_chars: config.retrieval.preview_chars,
            insufficient_message: config.answer.insufficient_message.clone(),
            header: config.answer.header.clone(),
            language: config.answer.language.clone(),
        }
    }
}

impl Default for AnswerParams {
    fn default() -> Self {
        Self::from_config(&Config::minimal())
    }
}

/// Advisory context carried into the answer; never affects ranking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AskContext<'a> {
    pub industry: Option<&'a str>,
    pub scenario: Option<&'a str>,
}

impl AskContext<'_> {
    fn lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(industry) = self.industry.filter(|s| !s.trim().is_empty()) {
            out.push(format!("Industry: {}", industry.trim()));
        }
        if let Some(scenario) = self.scenario.filter(|s| !s.trim().is_empty()) {
            out.push(format!("Scenario: {}", scenario.trim()));
        }
        out
    }
}

/// Results scoring strictly above `threshold`, in rank order.
pub fn retain_relevant(results: Vec<ScoredChunk>, threshold: f64) -> Vec<ScoredChunk> {
    results.into_iter().filter(|r| r.score > threshold).collect()
}

/// Mean score, clamped to `[0, 1]`. Zero for no results.
pub fn confidence(retained: &[ScoredChunk]) -> f64 {
    if retained.is_empty() {
        return 0.0;
    }
    let mean = retained.iter().map(|r| r.score).sum::<f64>() / retained.len() as f64;
    mean.clamp(0.0, 1.0)
}

/// First `max_chars` characters of `text` on a single line, with an
/// ellipsis when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", flat[..cut].trim_end()),
        None => flat,
    }
}

/// Built-in answer text: header, optional context, then one attributed
/// preview per retained chunk.
pub fn format_answer(ctx: &AskContext<'_>, retained: &[ScoredChunk], params: &AnswerParams) -> String {
    let mut out = String::new();
    out.push_str(&params.header);
    out.push('\n');
    for line in ctx.lines() {
        out.push_str(&line);
        out.push('\n');
    }
    for (i, sc) in retained.iter().enumerate() {
        out.push_str(&format!(
            "\n{}. [{} #{}] (score {:.2})\n   {}\n",
            i + 1,
            sc.chunk.source_name(),
            sc.chunk.ordinal,
            sc.score,
            preview(&sc.chunk.text, params.preview_chars)
        ));
    }
    out.trim_end().to_string()
}

/// Prompt for the external generator, with each source delimited and
/// attributed.
pub fn build_prompt(
    question: &str,
    ctx: &AskContext<'_>,
    retained: &[ScoredChunk],
    params: &AnswerParams,
) -> String {
    let mut prompt = format!(
        "You are a business systems consultant. Answer the question using only the \
         numbered sources below. Reply in {}. Cite sources as [file #chunk]. If the \
         sources do not contain the answer, say that the current material is insufficient.\n\n",
        params.language
    );
    for line in ctx.lines() {
        prompt.push_str(&line);
        prompt.push('\n');
    }
    prompt.push_str(&format!("Question: {}\n\n", question.trim()));

    for (i, sc) in retained.iter().enumerate() {
        prompt.push_str(&format!(
            "<source n=\"{}\" file=\"{}\" chunk=\"{}\">\n{}\n</source>\n",
            i + 1,
            sc.chunk.source_name(),
            sc.chunk.ordinal,
            sc.chunk.text
        ));
    }
    prompt
}

/// Turn ranked results into an answer.
///
/// `generator` is `None` when no generation backend is configured. When it
/// is `Some` and `use_generation` is set, a generator error is logged and
/// the built-in format is used instead; it is never returned.
pub async fn assemble(
    question: &str,
    ctx: &AskContext<'_>,
    results: Vec<ScoredChunk>,
    params: &AnswerParams,
    generator: Option<&dyn Generator>,
    use_generation: bool,
) -> AnswerResult {
    let retained = retain_relevant(results, params.relevance_threshold);
    if retained.is_empty() {
        return AnswerResult {
            text: params.insufficient_message.clone(),
            sources: Vec::new(),
            confidence: 0.0,
            generated: false,
        };
    }

    let confidence = confidence(&retained);

    let generated = match (generator, use_generation) {
        (Some(g), true) => {
            let prompt = build_prompt(question, ctx, &retained, params);
            match g.generate(&prompt).await {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!(model = g.model_name(), error = %e, "generation failed; using built-in answer");
                    None
                }
            }
        }
        (None, true) => {
            debug!("generation requested but no generator is configured");
            None
        }
        (_, false) => None,
    };

    let (text, generated) = match generated {
        Some(text) => (text, true),
        None => (format_answer(ctx, &retained, params), false),
    };

    AnswerResult {
        text,
        sources: retained,
        confidence,
        generated,
    }
}
