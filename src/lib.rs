//! # Answer Harness
//!
//! An in-memory document indexing and question-answering engine.
//!
//! Documents are split into word-bounded chunks, each chunk gets a sparse
//! term-frequency vector, and questions are answered by ranking chunks with
//! cosine similarity and assembling an attributed answer with a confidence
//! score. An external text generator can optionally phrase the answer; if
//! it is missing or fails, the built-in answer is returned instead.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────────┐   ┌──────────────┐
//! │ Corpus paths │──▶│ Ingest               │──▶│ Index        │
//! │ + uploads    │   │ load→chunk→vectorize │   │ (Arc swap)   │
//! └──────────────┘   └──────────────────────┘   └──────┬───────┘
//!                                                      │ snapshot
//!                         ┌────────────────────────────┤
//!                         ▼                            ▼
//!                   ┌──────────┐                ┌─────────────┐
//!                   │ search   │───ranked──────▶│ answer      │──▶ generator?
//!                   └──────────┘                └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! ah ingest                                   # build the index, report counts
//! ah search "inventory setup" --top-k 3
//! ah ask "How do I set up warehouses?" --industry retail
//! ah serve                                    # JSON HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types and wire shapes |
//! | [`tokenize`] | Text → lowercase terms |
//! | [`vector`] | Term-frequency vectors and cosine similarity |
//! | [`chunk`] | Word-bounded chunking |
//! | [`extract`] | PDF / Office text extraction |
//! | [`loader`] | Document loading |
//! | [`uploads`] | Upload registry |
//! | [`index`] | Immutable index and atomic swap slot |
//! | [`ingest`] | Ingest pipeline |
//! | [`search`] | Ranking |
//! | [`answer`] | Answer assembly |
//! | [`generate`] | External generation |
//! | [`engine`] | Operations over the shared index |
//! | [`error`] | Engine error type |
//! | [`server`] | HTTP server |

pub mod answer;
pub mod chunk;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod generate;
pub mod index;
pub mod ingest;
pub mod loader;
pub mod models;
pub mod search;
pub mod server;
pub mod tokenize;
pub mod uploads;
pub mod vector;
