//! Reasoning service gateway.
//!
//! The engine delegates all natural-language generation to an external
//! reasoning service exposed as named pipes over HTTP. This module defines
//! the consumed contract ([`ReasoningService`]) and the production client
//! ([`HttpReasoningService`]); everything above it treats the service as an
//! opaque, possibly-failing source of structured completions.

mod client;
mod types;

pub use client::*;
pub use types::*;
