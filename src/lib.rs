//! # ARGUS Argument Engine
//!
//! A dialectic reasoning engine that turns free-form argumentative text into
//! a structured, scored critique by delegating natural-language generation
//! to an external reasoning service.
//!
//! ## Features
//!
//! - **Claim Decomposition**: atomic, independently evaluable claims with
//!   types, assumptions and cross-references
//! - **Adversarial Generation**: per-claim attacks and steelmanned defenses,
//!   fanned out concurrently behind a bounded gate
//! - **Fallacy Detection**: LLM-detected fallacies plus structural
//!   circular-reasoning detection over the claim relation graph
//! - **Robustness Scoring**: deterministic 0-100 score with
//!   survived/collapsed/value-dependent claim categorization
//! - **Dialectic Sessions**: multi-round debate where each round's input is
//!   synthesized from the previous round's defenses
//!
//! ## Architecture
//!
//! ```text
//! Caller → ArgusEngine → Reasoning Service (HTTP pipes)
//!              ↓
//!        ArgumentGraph (per round)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use argus_engine::{AnalysisRequest, ArgusEngine, Config};
//! use argus_engine::gateway::HttpReasoningService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let gateway = HttpReasoningService::new(&config.gateway, config.request.clone())?;
//!     let engine = ArgusEngine::new(Arc::new(gateway), &config);
//!     let report = engine.analyze(AnalysisRequest::new("AI will replace doctors")).await?;
//!     println!("robustness: {:?}", report.graph.robustness_score());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Injected caching interface for finished graphs.
pub mod cache;
/// Configuration management for the engine.
pub mod config;
/// Engine façade: analyze, dialectic sessions, quick scoring.
pub mod engine;
/// Error types and result aliases.
pub mod error;
/// Reasoning service gateway contract and HTTP client.
pub mod gateway;
/// Argument graph model and cycle detection.
pub mod graph;
/// Pipeline stages: decomposition, orchestration, scoring, dialectic loop.
pub mod pipeline;
/// System prompts for the reasoning service task kinds.
pub mod prompts;

pub use config::Config;
pub use engine::{AnalysisReport, AnalysisRequest, ArgusEngine, DialecticRequest, QuickScore};
pub use error::{EngineError, EngineResult};
pub use graph::ArgumentGraph;
pub use pipeline::{DialecticError, DialecticSession, Persona, Stance};
