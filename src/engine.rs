//! Engine façade - the operations the serving layer consumes.
//!
//! [`ArgusEngine::analyze`] runs one full analysis round;
//! [`ArgusEngine::run_dialectic`] threads rounds into a session. The engine
//! owns a single concurrency gate shared by every analysis it runs, so
//! batch callers share one budget of in-flight gateway calls.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::info;

use crate::config::Config;
use crate::error::{DecompositionError, EngineError, EngineResult, GatewayError, GraphResult};
use crate::gateway::ReasoningService;
use crate::graph::{
    detect_cycles, ArgumentGraph, FallacyLocation, FallacyType, LogicalFallacy, Severity,
};
use crate::pipeline::{
    scorer, Decomposer, DialecticError, DialecticLoop, DialecticSession, GenerationFailure,
    Orchestrator, Persona, ScoringConfig, StageCore, Stance,
};

/// Parameters for a single analysis.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// The argument to analyze.
    pub input_text: String,
    /// Which generation passes to run.
    pub stance: Stance,
    /// Argument style persona.
    pub persona: Persona,
    /// Whether to run the fallacy-detection pass.
    pub detect_fallacies: bool,
    /// Time budget for the whole analysis.
    pub deadline: Option<Duration>,
}

impl AnalysisRequest {
    /// Create a request with the default stance (dialectic), persona
    /// (academic) and fallacy detection enabled
    pub fn new(input_text: impl Into<String>) -> Self {
        Self {
            input_text: input_text.into(),
            stance: Stance::Dialectic,
            persona: Persona::Academic,
            detect_fallacies: true,
            deadline: None,
        }
    }

    /// Set the stance
    pub fn with_stance(mut self, stance: Stance) -> Self {
        self.stance = stance;
        self
    }

    /// Set the persona
    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = persona;
        self
    }

    /// Enable or disable fallacy detection
    pub fn with_fallacy_detection(mut self, detect: bool) -> Self {
        self.detect_fallacies = detect;
        self
    }

    /// Set the analysis deadline
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Parameters for a multi-round dialectic session.
#[derive(Debug, Clone)]
pub struct DialecticRequest {
    /// The argument to analyze.
    pub input_text: String,
    /// Number of rounds to run (>= 1).
    pub rounds: usize,
    /// Argument style persona.
    pub persona: Persona,
    /// Time budget for the whole session.
    pub deadline: Option<Duration>,
}

impl DialecticRequest {
    /// Create a request with 3 rounds and the academic persona
    pub fn new(input_text: impl Into<String>) -> Self {
        Self {
            input_text: input_text.into(),
            rounds: 3,
            persona: Persona::Academic,
            deadline: None,
        }
    }

    /// Set the round count
    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    /// Set the persona
    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = persona;
        self
    }

    /// Set the session deadline
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// A completed analysis: the graph plus non-fatal failure metadata.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// The scored argument graph.
    pub graph: ArgumentGraph,
    /// Generation calls that failed without aborting the analysis.
    pub generation_failures: Vec<GenerationFailure>,
}

/// Fast robustness check without the full graph.
#[derive(Debug, Clone, Serialize)]
pub struct QuickScore {
    /// Robustness score in [0, 100].
    pub robustness_score: f64,
    /// One-line human-readable band.
    pub summary: String,
}

/// The argument analysis engine.
pub struct ArgusEngine {
    decomposer: Decomposer,
    orchestrator: Orchestrator,
    scoring: ScoringConfig,
    max_rounds: usize,
}

impl ArgusEngine {
    /// Create an engine with its own concurrency gate sized from config
    pub fn new(gateway: Arc<dyn ReasoningService>, config: &Config) -> Self {
        let gate = Arc::new(Semaphore::new(config.engine.max_concurrency.max(1)));
        Self::with_gate(gateway, config, gate)
    }

    /// Create an engine over an injected concurrency gate.
    ///
    /// Sharing one gate across engines makes the limit process-wide when the
    /// service enforces a global rate limit; tests pass a single-permit gate
    /// for deterministic call ordering.
    pub fn with_gate(
        gateway: Arc<dyn ReasoningService>,
        config: &Config,
        gate: Arc<Semaphore>,
    ) -> Self {
        let core = StageCore::new(gateway);
        Self {
            decomposer: Decomposer::new(core.clone(), &config.tasks),
            orchestrator: Orchestrator::new(core, &config.tasks, gate),
            scoring: config.scoring.clone(),
            max_rounds: config.engine.max_rounds,
        }
    }

    /// Run one full analysis: decompose, generate, detect, score.
    ///
    /// Fails only on validation, decomposition, or a graph contract
    /// violation. Generation failures and deadline expiry degrade the
    /// result instead; the returned graph is then marked partial.
    pub async fn analyze(&self, request: AnalysisRequest) -> EngineResult<AnalysisReport> {
        if request.input_text.trim().is_empty() {
            return Err(EngineError::Validation {
                field: "input_text".to_string(),
                reason: "cannot be empty".to_string(),
            });
        }

        let deadline = request.deadline.map(|budget| Instant::now() + budget);

        // Decomposition is fail-fast; running out of budget here is fatal
        // because there is no graph to degrade onto yet.
        let decompose = self
            .decomposer
            .decompose(&request.input_text, request.persona);
        let mut graph = match deadline {
            Some(at) => tokio::time::timeout_at(at, decompose).await.map_err(|_| {
                DecompositionError::Gateway(GatewayError::Timeout {
                    timeout_ms: request
                        .deadline
                        .map(|d| d.as_millis() as u64)
                        .unwrap_or_default(),
                })
            })??,
            None => decompose.await?,
        };

        let generation_failures = self
            .orchestrator
            .run(
                &mut graph,
                request.stance,
                request.persona,
                request.detect_fallacies,
                deadline,
            )
            .await?;

        if request.detect_fallacies {
            flag_relation_cycles(&mut graph)?;
            // Re-establish snapshot ordering after appending cycle fallacies
            graph.sort_for_snapshot();
        }

        let outcome = scorer::score(&graph, &self.scoring);
        graph.apply_score(
            outcome.robustness,
            outcome.survived,
            outcome.collapsed,
            outcome.value_dependent,
        )?;

        info!(
            stance = %request.stance,
            persona = %request.persona,
            claims = graph.claim_count(),
            score = graph.robustness_score().unwrap_or_default(),
            partial = graph.partial().is_some(),
            "Analysis completed"
        );

        Ok(AnalysisReport {
            graph,
            generation_failures,
        })
    }

    /// Run a multi-round dialectic session.
    ///
    /// Every round runs with the dialectic stance and fallacy detection so
    /// defenses exist to synthesize the next round from. A fatal round
    /// failure aborts the session; completed rounds are returned inside the
    /// error.
    pub async fn run_dialectic(
        &self,
        request: DialecticRequest,
    ) -> Result<DialecticSession, DialecticError> {
        let mut dialectic = DialecticLoop::new(
            request.input_text.clone(),
            request.rounds,
            request.persona,
        );

        if let Err(source) = self.validate_dialectic(&request) {
            return Err(DialecticError {
                round: 0,
                source,
                completed: dialectic.into_session(),
            });
        }

        // One deadline governs the whole session; each round gets whatever
        // budget is left.
        let session_deadline = request.deadline.map(|budget| Instant::now() + budget);

        while let Some((round, input_text)) = dialectic.next_round() {
            info!(round, rounds_requested = request.rounds, "Dialectic round starting");

            let analysis = AnalysisRequest {
                input_text,
                stance: Stance::Dialectic,
                persona: request.persona,
                detect_fallacies: true,
                deadline: session_deadline.map(|at| at.duration_since(Instant::now())),
            };

            match self.analyze(analysis).await {
                Ok(report) => {
                    dialectic.complete_round(report.graph, report.generation_failures)
                }
                Err(source) => {
                    return Err(DialecticError {
                        round,
                        source,
                        completed: dialectic.into_session(),
                    })
                }
            }
        }

        Ok(dialectic.into_session())
    }

    /// Fast robustness check: attack-stance analysis reduced to a score band
    pub async fn quick_score(
        &self,
        input_text: impl Into<String>,
        deadline: Option<Duration>,
    ) -> EngineResult<QuickScore> {
        let mut request = AnalysisRequest::new(input_text).with_stance(Stance::Attack);
        request.deadline = deadline;

        let report = self.analyze(request).await?;
        let robustness_score = report.graph.robustness_score().unwrap_or_default();

        Ok(QuickScore {
            robustness_score,
            summary: score_summary(robustness_score).to_string(),
        })
    }

    fn validate_dialectic(&self, request: &DialecticRequest) -> EngineResult<()> {
        if request.input_text.trim().is_empty() {
            return Err(EngineError::Validation {
                field: "input_text".to_string(),
                reason: "cannot be empty".to_string(),
            });
        }
        if request.rounds == 0 {
            return Err(EngineError::Validation {
                field: "rounds".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if request.rounds > self.max_rounds {
            return Err(EngineError::Validation {
                field: "rounds".to_string(),
                reason: format!("must be at most {}", self.max_rounds),
            });
        }
        Ok(())
    }
}

/// Flag structural circular reasoning from the claim relation edges.
///
/// Runs as a discrete pass after generation; each cycle adds one
/// `circular_reasoning` fallacy anchored at the cycle's smallest claim ID.
fn flag_relation_cycles(graph: &mut ArgumentGraph) -> GraphResult<()> {
    for cycle in detect_cycles(graph) {
        let anchor = cycle[0].clone();
        let path = cycle.join(" -> ");
        graph.add_fallacy(LogicalFallacy {
            fallacy_type: FallacyType::CircularReasoning,
            location: FallacyLocation::Claim(anchor),
            explanation: format!("Claims form a support cycle: {} -> {}", path, cycle[0]),
            severity: Severity::Moderate,
        })?;
    }
    Ok(())
}

/// Human-readable band for a robustness score.
fn score_summary(score: f64) -> &'static str {
    if score >= 70.0 {
        "Strong argument - withstands critical analysis"
    } else if score >= 40.0 {
        "Moderate argument - has vulnerabilities"
    } else {
        "Weak argument - significant logical issues"
    }
}
