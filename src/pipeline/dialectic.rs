//! Dialectic loop control - multi-round debate state.
//!
//! A session runs the full analysis pipeline once per round. Round *k*+1's
//! input text is derived only from round *k*'s defenses; the loop never
//! looks ahead and never stops early - every requested round runs.
//!
//! ```text
//! Pending -> RunningRound(1) -> RoundComplete(1) -> RunningRound(2) -> ...
//!                                                -> Finished
//! ```
//!
//! The engine drives the loop; this module owns the state transitions so
//! they stay testable without a gateway.

use serde::Serialize;
use thiserror::Error;

use super::{GenerationFailure, Persona};
use crate::error::EngineError;
use crate::graph::ArgumentGraph;

/// Multi-round analysis session: one graph per round, in round order.
///
/// Each graph is a self-contained snapshot; the session owns its sequence
/// exclusively.
#[derive(Debug, Clone, Serialize)]
pub struct DialecticSession {
    /// Persona used for every round.
    pub persona: Persona,
    /// Rounds requested by the caller.
    pub rounds_requested: usize,
    /// Completed round graphs, in round order.
    pub rounds: Vec<ArgumentGraph>,
    /// Non-fatal generation failures across all rounds.
    pub failures: Vec<RoundFailure>,
}

/// A generation failure tagged with the round it occurred in.
#[derive(Debug, Clone, Serialize)]
pub struct RoundFailure {
    /// 1-based round number.
    pub round: usize,
    /// The underlying failure.
    #[serde(flatten)]
    pub failure: GenerationFailure,
}

/// Fatal session abort.
///
/// Rounds completed before the failure are not discarded; they ride along
/// in `completed`.
#[derive(Debug, Error)]
#[error("Dialectic session aborted in round {round}: {source}")]
pub struct DialecticError {
    /// The round that failed.
    pub round: usize,
    /// What went wrong.
    #[source]
    pub source: EngineError,
    /// The session as it stood when the failure hit.
    pub completed: DialecticSession,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DialecticState {
    Pending,
    RunningRound(usize),
    RoundComplete(usize),
    Finished,
}

/// Round bookkeeping for one dialectic session.
pub(crate) struct DialecticLoop {
    state: DialecticState,
    rounds_requested: usize,
    current_input: String,
    persona: Persona,
    rounds: Vec<ArgumentGraph>,
    failures: Vec<RoundFailure>,
}

impl DialecticLoop {
    /// Start a session; `rounds` must already be validated to be >= 1.
    pub(crate) fn new(input_text: impl Into<String>, rounds: usize, persona: Persona) -> Self {
        Self {
            state: DialecticState::Pending,
            rounds_requested: rounds,
            current_input: input_text.into(),
            persona,
            rounds: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Advance to the next round, returning its number and input text.
    ///
    /// Returns `None` once all requested rounds have completed (or while a
    /// round is still marked running).
    pub(crate) fn next_round(&mut self) -> Option<(usize, String)> {
        match self.state {
            DialecticState::Pending => {
                self.state = DialecticState::RunningRound(1);
                Some((1, self.current_input.clone()))
            }
            DialecticState::RoundComplete(k) if k < self.rounds_requested => {
                self.state = DialecticState::RunningRound(k + 1);
                Some((k + 1, self.current_input.clone()))
            }
            DialecticState::RoundComplete(_) => {
                self.state = DialecticState::Finished;
                None
            }
            DialecticState::RunningRound(_) | DialecticState::Finished => None,
        }
    }

    /// Record a finished round and synthesize the next round's input.
    ///
    /// With no defenses this round, the input text carries over unchanged -
    /// no regression, no failure.
    pub(crate) fn complete_round(
        &mut self,
        graph: ArgumentGraph,
        failures: Vec<GenerationFailure>,
    ) {
        let round = match self.state {
            DialecticState::RunningRound(k) => k,
            _ => return,
        };

        if let Some(next_input) = synthesize_next_input(&graph) {
            self.current_input = next_input;
        }
        self.failures
            .extend(failures.into_iter().map(|failure| RoundFailure {
                round,
                failure,
            }));
        self.rounds.push(graph);
        self.state = DialecticState::RoundComplete(round);
    }

    /// Consume the loop into its session, finished or not.
    pub(crate) fn into_session(self) -> DialecticSession {
        DialecticSession {
            persona: self.persona,
            rounds_requested: self.rounds_requested,
            rounds: self.rounds,
            failures: self.failures,
        }
    }
}

/// Build the next round's input from this round's defenses.
///
/// Strengthened claims concatenate in claim order (the stable decomposition
/// order of this round's graph). Returns `None` when the round produced no
/// defenses.
pub(crate) fn synthesize_next_input(graph: &ArgumentGraph) -> Option<String> {
    if graph.defenses().is_empty() {
        return None;
    }

    let text = graph
        .claims()
        .iter()
        .filter_map(|claim| {
            graph
                .defenses()
                .iter()
                .find(|d| d.original_claim_id == claim.id)
        })
        .map(|d| d.strengthened_claim.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    Some(text)
}
