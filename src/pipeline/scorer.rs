//! Robustness scoring and claim categorization.
//!
//! [`score`] is a pure function over a finished graph: no I/O, no hidden
//! state, identical output for identical input. The engine applies the
//! outcome back onto the graph after the generation passes settle.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::graph::{ArgumentGraph, ClaimType, Severity};

/// Thresholds and weights for robustness scoring.
///
/// The defaults reconstruct the documented 60/20/20 weighting; they are
/// configuration values, not a compatibility contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Minimum max-attack strength at which a claim can collapse.
    pub collapse_threshold: f64,
    /// Max-attack strength at or above which a defense no longer saves the claim.
    pub severe_threshold: f64,
    /// Penalty weight of a minor fallacy.
    pub weight_minor: f64,
    /// Penalty weight of a moderate fallacy.
    pub weight_moderate: f64,
    /// Penalty weight of a severe fallacy.
    pub weight_severe: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            collapse_threshold: 0.6,
            severe_threshold: 0.8,
            weight_minor: 0.3,
            weight_moderate: 0.6,
            weight_severe: 1.0,
        }
    }
}

impl ScoringConfig {
    fn severity_weight(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Minor => self.weight_minor,
            Severity::Moderate => self.weight_moderate,
            Severity::Severe => self.weight_severe,
        }
    }
}

/// Result of scoring a graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreOutcome {
    /// Robustness score in [0, 100].
    pub robustness: f64,
    /// Claims that withstood attacks.
    pub survived: BTreeSet<String>,
    /// Claims defeated by attacks.
    pub collapsed: BTreeSet<String>,
    /// Normative claims, excluded from fact-checking.
    pub value_dependent: BTreeSet<String>,
}

/// Score a graph's robustness and categorize its claims.
///
/// Rules:
/// - an empty claim set scores 0 with empty categories
/// - normative claims are value-dependent and never survive or collapse
/// - a claim collapses when its strongest attack reaches
///   `collapse_threshold`, unless a defense exists and the attack stays
///   below `severe_threshold`
/// - `score = survived_ratio*60 + empirical_ratio*20 - fallacy_penalty*20`,
///   with both ratios over the full claim count and the penalty being the
///   summed severity weights clamped to 1
pub fn score(graph: &ArgumentGraph, config: &ScoringConfig) -> ScoreOutcome {
    let total = graph.claim_count();
    if total == 0 {
        return ScoreOutcome {
            robustness: 0.0,
            survived: BTreeSet::new(),
            collapsed: BTreeSet::new(),
            value_dependent: BTreeSet::new(),
        };
    }

    let mut survived = BTreeSet::new();
    let mut collapsed = BTreeSet::new();
    let mut value_dependent = BTreeSet::new();

    for claim in graph.claims() {
        if claim.claim_type == ClaimType::Normative {
            value_dependent.insert(claim.id.clone());
            continue;
        }

        let max_attack = graph
            .attacks()
            .iter()
            .filter(|a| a.target_claim_id == claim.id)
            .map(|a| a.strength)
            .fold(0.0_f64, f64::max);
        let has_defense = graph
            .defenses()
            .iter()
            .any(|d| d.original_claim_id == claim.id);

        let saved_by_defense = has_defense && max_attack < config.severe_threshold;
        if max_attack >= config.collapse_threshold && !saved_by_defense {
            collapsed.insert(claim.id.clone());
        } else {
            survived.insert(claim.id.clone());
        }
    }

    let survived_ratio = survived.len() as f64 / total as f64;
    let empirical_ratio = graph
        .claims()
        .iter()
        .filter(|c| c.claim_type == ClaimType::Empirical)
        .count() as f64
        / total as f64;

    let fallacy_penalty = graph
        .fallacies()
        .iter()
        .map(|f| config.severity_weight(f.severity))
        .sum::<f64>()
        .min(1.0);

    let robustness =
        (survived_ratio * 60.0 + empirical_ratio * 20.0 - fallacy_penalty * 20.0).clamp(0.0, 100.0);

    ScoreOutcome {
        robustness,
        survived,
        collapsed,
        value_dependent,
    }
}
