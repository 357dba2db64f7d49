//! Attack/defense/fallacy orchestration - bounded concurrent fan-out.
//!
//! For a given stance the orchestrator dispatches one attack and/or defense
//! call per claim, plus one pass-level fallacy call when requested. All
//! calls run concurrently behind an injectable semaphore gate (tests run
//! with one permit for determinism). Each result is validated
//! independently: a malformed or failed call degrades the result and is
//! recorded as a [`GenerationFailure`], never raised as an error. The merge
//! into the graph is single-threaded and happens only after every
//! dispatched call has settled.
//!
//! ## Partial failure policy
//!
//! A claim whose attack (or defense) call fails simply receives no attacks
//! (or defense) this round. Deadline expiry cancels in-flight calls, keeps
//! everything already settled, and marks the graph `partial: timeout`.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant as StdInstant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{info, warn};

use super::{extract_json_from_completion, Persona, StageCore, Stance};
use crate::config::TaskConfig;
use crate::error::EngineResult;
use crate::gateway::{Message, ReasoningService, TaskKind, TaskRequest};
use crate::graph::{
    ArgumentGraph, AtomicClaim, AttackVector, CounterArgument, DefenseArgument, FallacyLocation,
    FallacyType, LogicalFallacy, PartialReason, Severity,
};
use crate::prompts::{persona_style, ATTACK_PROMPT, DEFEND_PROMPT, FALLACY_PROMPT};

/// Higher temperature for creative attacks.
const ATTACK_TEMPERATURE: f64 = 0.7;
/// Mid temperature for steelmanning.
const DEFEND_TEMPERATURE: f64 = 0.5;
/// Low temperature for precise fallacy identification.
const FALLACY_TEMPERATURE: f64 = 0.2;

/// Which generation call a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    /// A per-claim attack call.
    Attack,
    /// A per-claim defense call.
    Defense,
    /// The pass-level fallacy call.
    Fallacies,
}

impl std::fmt::Display for CallKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CallKind::Attack => "attack",
            CallKind::Defense => "defense",
            CallKind::Fallacies => "fallacies",
        };
        write!(f, "{}", name)
    }
}

/// One non-fatal generation failure, surfaced as analysis metadata.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationFailure {
    /// Which call failed.
    pub call: CallKind,
    /// The claim the call was for; absent for the fallacy pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_id: Option<String>,
    /// Why it failed.
    pub reason: String,
}

/// Settled result of one dispatched call.
enum CallOutcome {
    Attacks {
        claim_id: String,
        result: Result<Vec<CounterArgument>, String>,
    },
    Defense {
        claim_id: String,
        result: Result<DefenseArgument, String>,
    },
    Fallacies {
        result: Result<Vec<LogicalFallacy>, String>,
    },
}

/// Generation orchestrator.
#[derive(Clone)]
pub struct Orchestrator {
    core: StageCore,
    tasks: TaskConfig,
    gate: Arc<Semaphore>,
}

impl Orchestrator {
    /// Create a new orchestrator behind the given concurrency gate
    pub fn new(core: StageCore, tasks: &TaskConfig, gate: Arc<Semaphore>) -> Self {
        Self {
            core,
            tasks: tasks.clone(),
            gate,
        }
    }

    /// Run the generation passes for a stance and merge the results.
    ///
    /// Returns the partial-failure list; fatal graph contract violations
    /// (which indicate a bug, not a bad completion) propagate as errors.
    pub async fn run(
        &self,
        graph: &mut ArgumentGraph,
        stance: Stance,
        persona: Persona,
        detect_fallacies: bool,
        deadline: Option<Instant>,
    ) -> EngineResult<Vec<GenerationFailure>> {
        let start = StdInstant::now();
        let mut join_set: JoinSet<CallOutcome> = JoinSet::new();

        if stance.issues_attacks() {
            for claim in graph.claims() {
                let gateway = Arc::clone(self.core.gateway());
                let gate = Arc::clone(&self.gate);
                let pipe = self.tasks.attack.clone();
                let claim = claim.clone();
                join_set.spawn(async move {
                    let _permit = gate.acquire_owned().await.expect("semaphore closed");
                    let claim_id = claim.id.clone();
                    let result = generate_attacks(gateway, &pipe, &claim, persona).await;
                    CallOutcome::Attacks { claim_id, result }
                });
            }
        }

        if stance.issues_defenses() {
            for claim in graph.claims() {
                let gateway = Arc::clone(self.core.gateway());
                let gate = Arc::clone(&self.gate);
                let pipe = self.tasks.defend.clone();
                let claim = claim.clone();
                join_set.spawn(async move {
                    let _permit = gate.acquire_owned().await.expect("semaphore closed");
                    let claim_id = claim.id.clone();
                    let result = generate_defense(gateway, &pipe, &claim).await;
                    CallOutcome::Defense { claim_id, result }
                });
            }
        }

        if detect_fallacies {
            let gateway = Arc::clone(self.core.gateway());
            let gate = Arc::clone(&self.gate);
            let pipe = self.tasks.fallacies.clone();
            let original_input = graph.original_input().to_string();
            let claims: Vec<AtomicClaim> = graph.claims().to_vec();
            join_set.spawn(async move {
                let _permit = gate.acquire_owned().await.expect("semaphore closed");
                let result = detect_fallacy_pass(gateway, &pipe, &original_input, &claims).await;
                CallOutcome::Fallacies { result }
            });
        }

        let dispatched = join_set.len();
        let (outcomes, timed_out) = join_until(&mut join_set, deadline).await;

        // Single-threaded merge; the graph is only touched after the
        // concurrent phase has settled.
        let mut failures = Vec::new();
        for outcome in outcomes {
            self.merge_outcome(graph, outcome, &mut failures)?;
        }

        if timed_out {
            graph.mark_partial(PartialReason::Timeout);
        }
        graph.sort_for_snapshot();

        info!(
            stance = %stance,
            dispatched,
            attacks = graph.attacks().len(),
            defenses = graph.defenses().len(),
            fallacies = graph.fallacies().len(),
            failures = failures.len(),
            timed_out,
            latency_ms = start.elapsed().as_millis() as u64,
            "Generation passes merged"
        );

        Ok(failures)
    }

    fn merge_outcome(
        &self,
        graph: &mut ArgumentGraph,
        outcome: CallOutcome,
        failures: &mut Vec<GenerationFailure>,
    ) -> EngineResult<()> {
        match outcome {
            CallOutcome::Attacks { claim_id, result } => match result {
                Ok(attacks) => {
                    for attack in attacks {
                        graph.add_attack(attack)?;
                    }
                }
                Err(reason) => failures.push(GenerationFailure {
                    call: CallKind::Attack,
                    claim_id: Some(claim_id),
                    reason,
                }),
            },
            CallOutcome::Defense { claim_id, result } => match result {
                Ok(defense) => graph.add_defense(defense)?,
                Err(reason) => failures.push(GenerationFailure {
                    call: CallKind::Defense,
                    claim_id: Some(claim_id),
                    reason,
                }),
            },
            CallOutcome::Fallacies { result } => match result {
                Ok(fallacies) => {
                    // All-or-nothing per call: an unknown location means the
                    // service violated the contract, so nothing from this
                    // call is merged.
                    let unknown = fallacies.iter().find_map(|f| match &f.location {
                        FallacyLocation::Claim(id) if !graph.contains_claim(id) => {
                            Some(id.clone())
                        }
                        _ => None,
                    });
                    if let Some(id) = unknown {
                        failures.push(GenerationFailure {
                            call: CallKind::Fallacies,
                            claim_id: None,
                            reason: format!("fallacy names unknown claim {}", id),
                        });
                    } else {
                        for fallacy in fallacies {
                            graph.add_fallacy(fallacy)?;
                        }
                    }
                }
                Err(reason) => failures.push(GenerationFailure {
                    call: CallKind::Fallacies,
                    claim_id: None,
                    reason,
                }),
            },
        }
        Ok(())
    }
}

/// Join all spawned calls, stopping at the deadline.
///
/// On expiry the remaining tasks are aborted at their next suspension point
/// and everything already settled is returned.
async fn join_until(
    join_set: &mut JoinSet<CallOutcome>,
    deadline: Option<Instant>,
) -> (Vec<CallOutcome>, bool) {
    let mut outcomes = Vec::new();
    let mut timed_out = false;

    loop {
        let joined = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, join_set.join_next()).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(
                        pending = join_set.len(),
                        "Analysis deadline expired, cancelling in-flight calls"
                    );
                    join_set.abort_all();
                    timed_out = true;
                    break;
                }
            },
            None => join_set.join_next().await,
        };

        match joined {
            None => break,
            Some(Ok(outcome)) => outcomes.push(outcome),
            Some(Err(e)) if e.is_cancelled() => {}
            Some(Err(e)) => warn!(error = %e, "Generation task panicked"),
        }
    }

    (outcomes, timed_out)
}

// ============================================================================
// Per-call generation + validation
// ============================================================================

#[derive(Debug, Deserialize)]
struct AttackPayload {
    attacks: Vec<AttackRecord>,
}

#[derive(Debug, Deserialize)]
struct AttackRecord {
    attack_vector: AttackVector,
    counterpoint: String,
    #[serde(default)]
    supporting_evidence: Option<String>,
    strength: f64,
}

async fn generate_attacks(
    gateway: Arc<dyn ReasoningService>,
    pipe: &str,
    claim: &AtomicClaim,
    persona: Persona,
) -> Result<Vec<CounterArgument>, String> {
    let assumptions = if claim.assumptions.is_empty() {
        "None identified".to_string()
    } else {
        claim.assumptions.join(", ")
    };
    let messages = vec![
        Message::system(ATTACK_PROMPT),
        Message::user(format!(
            "Target claim: \"{}\"\nClaim type: {}\nHidden assumptions: {}\n\nYour style: {}",
            claim.text,
            claim.claim_type,
            assumptions,
            persona_style(persona),
        )),
    ];
    let request = TaskRequest::new(TaskKind::Attack, pipe, messages)
        .with_temperature(ATTACK_TEMPERATURE)
        .with_variable("persona", persona.as_str());

    let response = gateway.invoke(request).await.map_err(|e| e.to_string())?;
    parse_attacks(&response.completion, &claim.id)
}

fn parse_attacks(completion: &str, claim_id: &str) -> Result<Vec<CounterArgument>, String> {
    let json = extract_json_from_completion(completion)?;
    let payload: AttackPayload =
        serde_json::from_str(json).map_err(|e| format!("Failed to parse attacks: {}", e))?;

    payload
        .attacks
        .into_iter()
        .map(|record| {
            if !(0.0..=1.0).contains(&record.strength) {
                return Err(format!("attack strength {} outside [0, 1]", record.strength));
            }
            if record.counterpoint.trim().is_empty() {
                return Err("attack counterpoint must be non-empty".to_string());
            }
            Ok(CounterArgument {
                target_claim_id: claim_id.to_string(),
                attack_vector: record.attack_vector,
                counterpoint: record.counterpoint,
                supporting_evidence: record.supporting_evidence,
                strength: record.strength,
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct DefensePayload {
    strengthened_claim: String,
    #[serde(default)]
    additional_support: Vec<String>,
    #[serde(default)]
    removed_weaknesses: Vec<String>,
}

async fn generate_defense(
    gateway: Arc<dyn ReasoningService>,
    pipe: &str,
    claim: &AtomicClaim,
) -> Result<DefenseArgument, String> {
    let messages = vec![
        Message::system(DEFEND_PROMPT),
        Message::user(format!(
            "Original claim: \"{}\"\nClaim type: {}\nKnown assumptions: {}",
            claim.text,
            claim.claim_type,
            if claim.assumptions.is_empty() {
                "None identified".to_string()
            } else {
                claim.assumptions.join(", ")
            },
        )),
    ];
    let request =
        TaskRequest::new(TaskKind::Defend, pipe, messages).with_temperature(DEFEND_TEMPERATURE);

    let response = gateway.invoke(request).await.map_err(|e| e.to_string())?;
    parse_defense(&response.completion, &claim.id)
}

fn parse_defense(completion: &str, claim_id: &str) -> Result<DefenseArgument, String> {
    let json = extract_json_from_completion(completion)?;
    let payload: DefensePayload =
        serde_json::from_str(json).map_err(|e| format!("Failed to parse defense: {}", e))?;

    if payload.strengthened_claim.trim().is_empty() {
        return Err("strengthened claim must be non-empty".to_string());
    }

    Ok(DefenseArgument {
        original_claim_id: claim_id.to_string(),
        strengthened_claim: payload.strengthened_claim,
        additional_support: payload.additional_support,
        removed_weaknesses: payload.removed_weaknesses,
    })
}

#[derive(Debug, Deserialize)]
struct FallacyPayload {
    fallacies: Vec<FallacyRecord>,
}

#[derive(Debug, Deserialize)]
struct FallacyRecord {
    fallacy_type: FallacyType,
    location: String,
    explanation: String,
    severity: Severity,
}

async fn detect_fallacy_pass(
    gateway: Arc<dyn ReasoningService>,
    pipe: &str,
    original_input: &str,
    claims: &[AtomicClaim],
) -> Result<Vec<LogicalFallacy>, String> {
    let claims_text = claims
        .iter()
        .map(|c| format!("{}: {}", c.id, c.text))
        .collect::<Vec<_>>()
        .join("\n");
    let messages = vec![
        Message::system(FALLACY_PROMPT),
        Message::user(format!(
            "Original argument:\n\"{}\"\n\nDecomposed claims:\n{}",
            original_input, claims_text,
        )),
    ];
    let request = TaskRequest::new(TaskKind::DetectFallacies, pipe, messages)
        .with_temperature(FALLACY_TEMPERATURE);

    let response = gateway.invoke(request).await.map_err(|e| e.to_string())?;
    parse_fallacies(&response.completion)
}

fn parse_fallacies(completion: &str) -> Result<Vec<LogicalFallacy>, String> {
    let json = extract_json_from_completion(completion)?;
    let payload: FallacyPayload =
        serde_json::from_str(json).map_err(|e| format!("Failed to parse fallacies: {}", e))?;

    Ok(payload
        .fallacies
        .into_iter()
        .map(|record| LogicalFallacy {
            fallacy_type: record.fallacy_type,
            location: FallacyLocation::from(record.location),
            explanation: record.explanation,
            severity: record.severity,
        })
        .collect())
}
