//! End-to-end engine tests against a mocked reasoning service.
//!
//! Requests are routed to per-task mocks by the pipe name in the request
//! body, exercising the full decompose → orchestrate → score path over HTTP.

use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use argus_engine::config::{
    Config, EngineConfig, GatewayConfig, LogFormat, LoggingConfig, RequestConfig, TaskConfig,
};
use argus_engine::engine::{AnalysisRequest, ArgusEngine, DialecticRequest};
use argus_engine::gateway::HttpReasoningService;
use argus_engine::graph::PartialReason;
use argus_engine::pipeline::{CallKind, ScoringConfig, Stance};

fn engine_for(server: &MockServer) -> ArgusEngine {
    let config = Config {
        gateway: GatewayConfig {
            api_key: "test-api-key".to_string(),
            base_url: server.uri(),
        },
        request: RequestConfig {
            timeout_ms: 5000,
            max_retries: 0,
            retry_delay_ms: 10,
        },
        engine: EngineConfig::default(),
        scoring: ScoringConfig::default(),
        tasks: TaskConfig::default(),
        logging: LoggingConfig {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        },
    };
    let gateway =
        HttpReasoningService::new(&config.gateway, config.request.clone()).expect("client");
    ArgusEngine::new(Arc::new(gateway), &config)
}

/// Mount a pipe mock whose completion is the given JSON payload
async fn mount_pipe(server: &MockServer, pipe: &str, completion: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/v1/pipes/run"))
        .and(body_partial_json(json!({"name": pipe})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "completion": completion.to_string()
        })))
        .mount(server)
        .await;
}

fn two_claim_decomposition() -> serde_json::Value {
    json!({
        "claims": [
            {
                "id": "claim_1",
                "text": "Diagnosis can be automated",
                "claim_type": "empirical",
                "assumptions": ["Diagnosis is mostly pattern matching"],
                "evidence_required": "Clinical trial data",
                "confidence": 0.7,
                "supports": [],
                "contradicts": []
            },
            {
                "id": "claim_2",
                "text": "Machines should make medical decisions",
                "claim_type": "normative"
            }
        ]
    })
}

#[tokio::test]
async fn test_full_dialectic_analysis() {
    let server = MockServer::start().await;
    mount_pipe(&server, "argument-decompose-v1", two_claim_decomposition()).await;
    mount_pipe(
        &server,
        "claim-attack-v1",
        json!({
            "attacks": [{
                "attack_vector": "weak_assumption",
                "counterpoint": "Diagnosis also requires context a model lacks",
                "strength": 0.5
            }]
        }),
    )
    .await;
    mount_pipe(
        &server,
        "claim-defend-v1",
        json!({
            "strengthened_claim": "Diagnosis of routine conditions can be automated",
            "additional_support": ["Imaging triage already matches specialists"],
            "removed_weaknesses": ["Scoped to routine conditions"]
        }),
    )
    .await;
    mount_pipe(
        &server,
        "fallacy-detect-v1",
        json!({
            "fallacies": [{
                "fallacy_type": "hasty_generalization",
                "location": "claim_1",
                "explanation": "Generalizes from narrow task benchmarks",
                "severity": "moderate"
            }]
        }),
    )
    .await;

    let engine = engine_for(&server);
    let report = engine
        .analyze(AnalysisRequest::new("AI will replace doctors"))
        .await
        .expect("analysis should succeed");

    let graph = &report.graph;
    assert!(report.generation_failures.is_empty());
    assert_eq!(graph.claim_count(), 2);
    assert_eq!(graph.attacks().len(), 2);
    assert_eq!(graph.defenses().len(), 2);
    assert_eq!(graph.fallacies().len(), 1);
    assert!(graph.partial().is_none());

    // Snapshot ordering by claim id
    assert_eq!(graph.attacks()[0].target_claim_id, "claim_1");
    assert_eq!(graph.attacks()[1].target_claim_id, "claim_2");
    assert_eq!(graph.defenses()[0].original_claim_id, "claim_1");

    // claim_1 survives (0.5 < collapse threshold), claim_2 is value-dependent.
    // survived 1/2 * 60 + empirical 1/2 * 20 - moderate 0.6 * 20 = 28
    assert!(graph.survived_claims().contains("claim_1"));
    assert!(graph.value_dependent_claims().contains("claim_2"));
    assert!(graph.collapsed_claims().is_empty());
    let score = graph.robustness_score().unwrap();
    assert!((score - 28.0).abs() < 1e-9, "score was {}", score);
}

#[tokio::test]
async fn test_defense_outage_degrades_without_aborting() {
    let server = MockServer::start().await;
    mount_pipe(&server, "argument-decompose-v1", two_claim_decomposition()).await;
    mount_pipe(
        &server,
        "claim-attack-v1",
        json!({"attacks": [{"attack_vector": "counterexample", "counterpoint": "x", "strength": 0.3}]}),
    )
    .await;
    mount_pipe(&server, "fallacy-detect-v1", json!({"fallacies": []})).await;

    Mock::given(method("POST"))
        .and(path("/v1/pipes/run"))
        .and(body_partial_json(json!({"name": "claim-defend-v1"})))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"error": {}})))
        .mount(&server)
        .await;

    let engine = engine_for(&server);
    let report = engine
        .analyze(AnalysisRequest::new("AI will replace doctors"))
        .await
        .expect("partial generation failures must not abort");

    assert_eq!(report.generation_failures.len(), 2);
    assert!(report
        .generation_failures
        .iter()
        .all(|f| f.call == CallKind::Defense));
    assert!(report.graph.defenses().is_empty());
    assert_eq!(report.graph.attacks().len(), 2);
    assert!(report.graph.robustness_score().is_some());
}

#[tokio::test]
async fn test_deadline_expiry_yields_partial_graph() {
    let server = MockServer::start().await;
    mount_pipe(
        &server,
        "argument-decompose-v1",
        json!({
            "claims": [{"id": "claim_1", "text": "x", "claim_type": "empirical"}]
        }),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/v1/pipes/run"))
        .and(body_partial_json(json!({"name": "claim-attack-v1"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "completion": "{\"attacks\": []}"}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let engine = engine_for(&server);
    let report = engine
        .analyze(
            AnalysisRequest::new("AI will replace doctors")
                .with_stance(Stance::Attack)
                .with_fallacy_detection(false)
                .with_deadline(Duration::from_millis(300)),
        )
        .await
        .expect("timeout must degrade, not fail");

    let graph = &report.graph;
    assert_eq!(graph.partial(), Some(PartialReason::Timeout));
    assert_eq!(graph.claim_count(), 1);
    assert!(graph.attacks().is_empty());
    // Scored best-effort: unattacked empirical claim survives
    assert_eq!(graph.robustness_score(), Some(80.0));
}

#[tokio::test]
async fn test_dialectic_feeds_defenses_forward() {
    let server = MockServer::start().await;
    mount_pipe(
        &server,
        "argument-decompose-v1",
        json!({
            "claims": [{"id": "claim_1", "text": "Diagnosis can be automated", "claim_type": "empirical"}]
        }),
    )
    .await;
    mount_pipe(&server, "claim-attack-v1", json!({"attacks": []})).await;
    mount_pipe(
        &server,
        "claim-defend-v1",
        json!({
            "strengthened_claim": "Diagnosis of routine conditions can be automated",
            "additional_support": [],
            "removed_weaknesses": []
        }),
    )
    .await;
    mount_pipe(&server, "fallacy-detect-v1", json!({"fallacies": []})).await;

    let engine = engine_for(&server);
    let session = engine
        .run_dialectic(DialecticRequest::new("AI will replace doctors").with_rounds(2))
        .await
        .expect("session should complete");

    assert_eq!(session.rounds_requested, 2);
    assert_eq!(session.rounds.len(), 2);
    assert_eq!(session.rounds[0].original_input(), "AI will replace doctors");
    assert_eq!(
        session.rounds[1].original_input(),
        "Diagnosis of routine conditions can be automated"
    );
}

#[tokio::test]
async fn test_dialectic_without_defenses_reuses_input() {
    let server = MockServer::start().await;
    mount_pipe(
        &server,
        "argument-decompose-v1",
        json!({
            "claims": [{"id": "claim_1", "text": "x", "claim_type": "empirical"}]
        }),
    )
    .await;
    mount_pipe(&server, "claim-attack-v1", json!({"attacks": []})).await;
    mount_pipe(&server, "fallacy-detect-v1", json!({"fallacies": []})).await;

    // Defense pipe down for the whole session
    Mock::given(method("POST"))
        .and(path("/v1/pipes/run"))
        .and(body_partial_json(json!({"name": "claim-defend-v1"})))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"error": {}})))
        .mount(&server)
        .await;

    let engine = engine_for(&server);
    let session = engine
        .run_dialectic(DialecticRequest::new("AI will replace doctors").with_rounds(3))
        .await
        .expect("session should still run every round");

    // Exactly the requested number of rounds, every input unchanged
    assert_eq!(session.rounds.len(), 3);
    for round in &session.rounds {
        assert_eq!(round.original_input(), "AI will replace doctors");
    }
    // One defense failure per round, tagged with its round
    let rounds: Vec<usize> = session.failures.iter().map(|f| f.round).collect();
    assert_eq!(rounds, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_quick_score_bands_weak_argument() {
    let server = MockServer::start().await;
    mount_pipe(
        &server,
        "argument-decompose-v1",
        json!({
            "claims": [{"id": "claim_1", "text": "x", "claim_type": "empirical"}]
        }),
    )
    .await;
    mount_pipe(
        &server,
        "claim-attack-v1",
        json!({"attacks": [{"attack_vector": "counterexample", "counterpoint": "y", "strength": 0.9}]}),
    )
    .await;
    mount_pipe(&server, "fallacy-detect-v1", json!({"fallacies": []})).await;

    let engine = engine_for(&server);
    let quick = engine
        .quick_score("AI will replace doctors", None)
        .await
        .unwrap();

    // Undefended 0.9 attack collapses the only claim: 0*60 + 20 - 0 = 20
    assert!((quick.robustness_score - 20.0).abs() < 1e-9);
    assert!(quick.summary.starts_with("Weak"));
}
