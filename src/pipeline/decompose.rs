//! Decomposition stage - argument to atomic claims.
//!
//! One gateway call per analysis. This stage is fail-fast: without at least
//! one valid claim set there is no meaningful partial result, so any
//! gateway failure or validation failure aborts the analysis. An empty (but
//! well-formed) claim list is not a failure - it produces an empty graph.

use serde::Deserialize;
use std::time::Instant;
use tracing::info;

use super::{extract_json_from_completion, Persona, StageCore};
use crate::config::TaskConfig;
use crate::error::DecompositionError;
use crate::gateway::{Message, TaskKind, TaskRequest};
use crate::graph::{ArgumentGraph, AtomicClaim, ClaimType};
use crate::prompts::DECOMPOSE_PROMPT;

/// Lower temperature for structured decomposition.
const DECOMPOSE_TEMPERATURE: f64 = 0.3;

/// Decomposition stage handler.
#[derive(Clone)]
pub struct Decomposer {
    core: StageCore,
    pipe: String,
}

/// Raw decomposition payload from the reasoning service.
#[derive(Debug, Deserialize)]
struct DecompositionPayload {
    claims: Vec<ClaimRecord>,
}

#[derive(Debug, Deserialize)]
struct ClaimRecord {
    id: String,
    text: String,
    claim_type: ClaimType,
    #[serde(default)]
    assumptions: Vec<String>,
    #[serde(default)]
    evidence_required: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    supports: Vec<String>,
    #[serde(default)]
    contradicts: Vec<String>,
}

impl ClaimRecord {
    /// Validate and convert into a model claim.
    fn into_claim(self) -> Result<AtomicClaim, DecompositionError> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return Err(DecompositionError::InvalidClaim {
                id: "<empty>".to_string(),
                reason: "claim id must be non-empty".to_string(),
            });
        }
        if self.text.trim().is_empty() {
            return Err(DecompositionError::InvalidClaim {
                id,
                reason: "claim text must be non-empty".to_string(),
            });
        }
        if let Some(confidence) = self.confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(DecompositionError::InvalidClaim {
                    id,
                    reason: format!("confidence {} outside [0, 1]", confidence),
                });
            }
        }

        Ok(AtomicClaim {
            id,
            text: self.text,
            claim_type: self.claim_type,
            assumptions: self.assumptions,
            evidence_required: self.evidence_required,
            confidence: self.confidence,
            supports: self.supports,
            contradicts: self.contradicts,
        })
    }
}

impl Decomposer {
    /// Create a new decomposition stage
    pub fn new(core: StageCore, tasks: &TaskConfig) -> Self {
        Self {
            core,
            pipe: tasks.decompose.clone(),
        }
    }

    /// Decompose input text into a graph holding only claims.
    ///
    /// Claim IDs keep the order the service returned them in and are stable
    /// for the lifetime of the graph.
    pub async fn decompose(
        &self,
        input_text: &str,
        persona: Persona,
    ) -> Result<ArgumentGraph, DecompositionError> {
        let start = Instant::now();

        let messages = vec![
            Message::system(DECOMPOSE_PROMPT),
            Message::user(format!("Input argument:\n\"{}\"", input_text)),
        ];
        let request = TaskRequest::new(TaskKind::Decompose, &self.pipe, messages)
            .with_temperature(DECOMPOSE_TEMPERATURE)
            .with_variable("persona", persona.as_str());

        let response = self.core.gateway().invoke(request).await?;

        let json = extract_json_from_completion(&response.completion)
            .map_err(|message| DecompositionError::Malformed { message })?;
        let payload: DecompositionPayload =
            serde_json::from_str(json).map_err(|e| DecompositionError::Malformed {
                message: format!("Failed to parse claims: {}", e),
            })?;

        let claims = payload
            .claims
            .into_iter()
            .map(ClaimRecord::into_claim)
            .collect::<Result<Vec<_>, _>>()?;

        let mut graph = ArgumentGraph::new(input_text);
        graph.add_claims(claims)?;

        info!(
            claim_count = graph.claim_count(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Decomposition completed"
        );

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MockReasoningService, TaskResponse};
    use std::sync::Arc;

    fn decomposer_returning(completion: &str) -> Decomposer {
        let completion = completion.to_string();
        let mut mock = MockReasoningService::new();
        mock.expect_invoke().returning(move |request| {
            assert_eq!(request.kind, TaskKind::Decompose);
            Ok(TaskResponse {
                success: true,
                completion: completion.clone(),
                raw: None,
            })
        });
        Decomposer::new(StageCore::new(Arc::new(mock)), &TaskConfig::default())
    }

    #[tokio::test]
    async fn test_decompose_valid_payload() {
        let decomposer = decomposer_returning(
            r#"{"claims": [
                {"id": "claim_1", "text": "Diagnosis can be automated", "claim_type": "empirical",
                 "assumptions": ["Diagnosis is pattern matching"], "evidence_required": "Trial data",
                 "confidence": 0.7, "supports": [], "contradicts": []},
                {"id": "claim_2", "text": "Patients will trust machines", "claim_type": "predictive"}
            ]}"#,
        );

        let graph = decomposer
            .decompose("AI will replace doctors", Persona::Academic)
            .await
            .unwrap();

        assert_eq!(graph.original_input(), "AI will replace doctors");
        assert_eq!(graph.claim_count(), 2);
        assert_eq!(graph.claims()[0].id, "claim_1");
        assert_eq!(graph.claims()[0].claim_type, ClaimType::Empirical);
        assert_eq!(graph.claims()[1].claim_type, ClaimType::Predictive);
    }

    #[tokio::test]
    async fn test_decompose_handles_markdown_fences() {
        let decomposer =
            decomposer_returning("Here you go:\n```json\n{\"claims\": []}\n```");

        let graph = decomposer
            .decompose("some argument", Persona::Academic)
            .await
            .unwrap();
        assert_eq!(graph.claim_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_claim_list_is_valid() {
        let decomposer = decomposer_returning(r#"{"claims": []}"#);
        let graph = decomposer
            .decompose("nothing to argue", Persona::Academic)
            .await
            .unwrap();
        assert_eq!(graph.claim_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_fatal() {
        let decomposer = decomposer_returning("I could not find any claims, sorry.");
        let result = decomposer.decompose("argument", Persona::Academic).await;
        assert!(matches!(result, Err(DecompositionError::Malformed { .. })));
    }

    #[tokio::test]
    async fn test_unknown_claim_type_is_fatal() {
        let decomposer = decomposer_returning(
            r#"{"claims": [{"id": "claim_1", "text": "x", "claim_type": "rhetorical"}]}"#,
        );
        let result = decomposer.decompose("argument", Persona::Academic).await;
        assert!(matches!(result, Err(DecompositionError::Malformed { .. })));
    }

    #[tokio::test]
    async fn test_empty_claim_id_is_fatal() {
        let decomposer = decomposer_returning(
            r#"{"claims": [{"id": "  ", "text": "x", "claim_type": "empirical"}]}"#,
        );
        let result = decomposer.decompose("argument", Persona::Academic).await;
        assert!(matches!(
            result,
            Err(DecompositionError::InvalidClaim { .. })
        ));
    }

    #[tokio::test]
    async fn test_out_of_range_confidence_is_fatal() {
        let decomposer = decomposer_returning(
            r#"{"claims": [{"id": "claim_1", "text": "x", "claim_type": "empirical", "confidence": 1.4}]}"#,
        );
        let result = decomposer.decompose("argument", Persona::Academic).await;
        assert!(matches!(
            result,
            Err(DecompositionError::InvalidClaim { id, .. }) if id == "claim_1"
        ));
    }

    #[tokio::test]
    async fn test_duplicate_claim_ids_are_fatal() {
        let decomposer = decomposer_returning(
            r#"{"claims": [
                {"id": "claim_1", "text": "x", "claim_type": "empirical"},
                {"id": "claim_1", "text": "y", "claim_type": "causal"}
            ]}"#,
        );
        let result = decomposer.decompose("argument", Persona::Academic).await;
        assert!(matches!(result, Err(DecompositionError::Graph(_))));
    }

    #[tokio::test]
    async fn test_gateway_failure_propagates() {
        let mut mock = MockReasoningService::new();
        mock.expect_invoke().returning(|_| {
            Err(crate::error::GatewayError::Timeout { timeout_ms: 100 })
        });
        let decomposer = Decomposer::new(StageCore::new(Arc::new(mock)), &TaskConfig::default());

        let result = decomposer.decompose("argument", Persona::Academic).await;
        assert!(matches!(result, Err(DecompositionError::Gateway(_))));
    }
}
