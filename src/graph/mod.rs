//! Argument graph model.
//!
//! An [`ArgumentGraph`] is a self-contained snapshot of one analysis round:
//! the decomposed claims, the generated attacks and defenses, detected
//! fallacies, and (after scoring) the robustness score with the claim
//! categorization. Construction is append-only — nothing is edited or
//! removed after insertion, so a finished graph is safe to share with any
//! number of readers.

mod cycles;

pub use cycles::detect_cycles;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::error::{GraphError, GraphResult};

/// Classification of an atomic claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    /// Testable, fact-based.
    Empirical,
    /// Value judgment; not fact-checkable.
    Normative,
    /// Asserts X causes Y.
    Causal,
    /// Future-oriented.
    Predictive,
    /// Asserts what something means.
    Definitional,
}

impl ClaimType {
    /// Get the claim type as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::Empirical => "empirical",
            ClaimType::Normative => "normative",
            ClaimType::Causal => "causal",
            ClaimType::Predictive => "predictive",
            ClaimType::Definitional => "definitional",
        }
    }
}

impl std::fmt::Display for ClaimType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a counterargument attacks its target claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackVector {
    /// A load-bearing assumption is questionable.
    WeakAssumption,
    /// A real or hypothetical case contradicts the claim.
    Counterexample,
    /// Something else explains the same observations.
    AlternativeExplanation,
    /// Evidence is asserted but not provided.
    MissingEvidence,
    /// The claim breaks down outside a narrow scope.
    ScopeLimitation,
}

/// Fixed enumeration of detectable logical fallacies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallacyType {
    /// Misrepresenting the opposing position.
    Strawman,
    /// Attacking the person instead of the argument.
    AdHominem,
    /// Presenting two options when more exist.
    FalseDichotomy,
    /// Conclusion assumed in the premises.
    CircularReasoning,
    /// Citing authority instead of evidence.
    AppealToAuthority,
    /// Assuming a chain reaction without justification.
    SlipperySlope,
    /// Broad conclusion from limited data.
    HastyGeneralization,
    /// Causation inferred from sequence alone.
    PostHoc,
    /// Emotion substituted for logic.
    AppealToEmotion,
    /// Hypocrisy offered as refutation.
    TuQuoque,
}

/// Severity of a detected fallacy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Weakens the argument slightly.
    Minor,
    /// Undermines a supporting line of reasoning.
    Moderate,
    /// Invalidates the reasoning it appears in.
    Severe,
}

/// Where a fallacy attaches: one claim, or the argument as a whole.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FallacyLocation {
    /// The argument as a whole.
    Global,
    /// A specific claim by ID.
    Claim(String),
}

impl From<String> for FallacyLocation {
    fn from(value: String) -> Self {
        if value == "global" {
            FallacyLocation::Global
        } else {
            FallacyLocation::Claim(value)
        }
    }
}

impl From<FallacyLocation> for String {
    fn from(value: FallacyLocation) -> Self {
        match value {
            FallacyLocation::Global => "global".to_string(),
            FallacyLocation::Claim(id) => id,
        }
    }
}

/// Single decomposed claim from an argument.
///
/// Immutable once inserted into a graph; later stages only append related
/// attacks, defenses and fallacies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtomicClaim {
    /// Opaque ID, unique within its graph.
    pub id: String,
    /// The claim statement.
    pub text: String,
    /// Claim classification.
    pub claim_type: ClaimType,
    /// Hidden assumptions the claim relies on.
    #[serde(default)]
    pub assumptions: Vec<String>,
    /// What evidence would verify or falsify the claim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_required: Option<String>,
    /// Decomposition confidence in [0, 1].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// IDs of claims this one supports.
    #[serde(default)]
    pub supports: Vec<String>,
    /// IDs of claims this one contradicts.
    #[serde(default)]
    pub contradicts: Vec<String>,
}

/// Generated attack on one claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterArgument {
    /// Claim under attack; must exist in the same graph.
    pub target_claim_id: String,
    /// How the claim is being attacked.
    pub attack_vector: AttackVector,
    /// The counterargument itself.
    pub counterpoint: String,
    /// Evidence for the counterpoint, when offered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supporting_evidence: Option<String>,
    /// Attack strength in [0, 1].
    pub strength: f64,
}

/// Strengthened restatement of one claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefenseArgument {
    /// Claim being defended; must exist in the same graph.
    pub original_claim_id: String,
    /// The improved claim statement.
    pub strengthened_claim: String,
    /// New supporting points.
    #[serde(default)]
    pub additional_support: Vec<String>,
    /// How identified weaknesses were addressed.
    #[serde(default)]
    pub removed_weaknesses: Vec<String>,
}

/// Detected structural reasoning error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogicalFallacy {
    /// Which fallacy.
    pub fallacy_type: FallacyType,
    /// Claim it occurs in, or global.
    pub location: FallacyLocation,
    /// Why this is a fallacy.
    pub explanation: String,
    /// How badly it damages the argument.
    pub severity: Severity,
}

/// Why a graph carries less than the requested analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialReason {
    /// The analysis deadline expired while generation calls were in flight.
    Timeout,
}

/// Complete argument structure for one analysis round.
#[derive(Debug, Clone, Serialize)]
pub struct ArgumentGraph {
    original_input: String,
    claims: Vec<AtomicClaim>,
    attacks: Vec<CounterArgument>,
    defenses: Vec<DefenseArgument>,
    fallacies: Vec<LogicalFallacy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    robustness_score: Option<f64>,
    survived_claims: BTreeSet<String>,
    collapsed_claims: BTreeSet<String>,
    value_dependent_claims: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    partial: Option<PartialReason>,
    #[serde(skip)]
    claim_index: HashSet<String>,
    #[serde(skip)]
    defended: HashSet<String>,
}

impl ArgumentGraph {
    /// Create an empty graph for the given input text
    pub fn new(original_input: impl Into<String>) -> Self {
        Self {
            original_input: original_input.into(),
            claims: Vec::new(),
            attacks: Vec::new(),
            defenses: Vec::new(),
            fallacies: Vec::new(),
            robustness_score: None,
            survived_claims: BTreeSet::new(),
            collapsed_claims: BTreeSet::new(),
            value_dependent_claims: BTreeSet::new(),
            partial: None,
            claim_index: HashSet::new(),
            defended: HashSet::new(),
        }
    }

    /// Append a batch of claims.
    ///
    /// The whole batch is rejected — and the graph left unmodified — if any
    /// claim ID is duplicated, within the batch or against existing claims.
    pub fn add_claims(&mut self, claims: Vec<AtomicClaim>) -> GraphResult<()> {
        let mut batch_ids = HashSet::with_capacity(claims.len());
        for claim in &claims {
            if self.claim_index.contains(&claim.id) || !batch_ids.insert(claim.id.clone()) {
                return Err(GraphError::DuplicateClaim {
                    id: claim.id.clone(),
                });
            }
        }

        self.claim_index.extend(batch_ids);
        self.claims.extend(claims);
        Ok(())
    }

    /// Append one attack; fails if the target claim does not exist
    pub fn add_attack(&mut self, attack: CounterArgument) -> GraphResult<()> {
        if !self.claim_index.contains(&attack.target_claim_id) {
            return Err(GraphError::DanglingReference {
                entity: "attack",
                claim_id: attack.target_claim_id,
            });
        }
        self.attacks.push(attack);
        Ok(())
    }

    /// Append one defense; at most one defense per claim per graph
    pub fn add_defense(&mut self, defense: DefenseArgument) -> GraphResult<()> {
        if !self.claim_index.contains(&defense.original_claim_id) {
            return Err(GraphError::DanglingReference {
                entity: "defense",
                claim_id: defense.original_claim_id,
            });
        }
        if !self.defended.insert(defense.original_claim_id.clone()) {
            return Err(GraphError::DuplicateDefense {
                claim_id: defense.original_claim_id,
            });
        }
        self.defenses.push(defense);
        Ok(())
    }

    /// Append one fallacy; its location must be a known claim or global
    pub fn add_fallacy(&mut self, fallacy: LogicalFallacy) -> GraphResult<()> {
        if let FallacyLocation::Claim(id) = &fallacy.location {
            if !self.claim_index.contains(id) {
                return Err(GraphError::DanglingReference {
                    entity: "fallacy",
                    claim_id: id.clone(),
                });
            }
        }
        self.fallacies.push(fallacy);
        Ok(())
    }

    /// Record the scoring outcome.
    ///
    /// The three sets must partition the full claim-ID set; a violation is a
    /// scorer bug and is rejected rather than stored.
    pub fn apply_score(
        &mut self,
        score: f64,
        survived: BTreeSet<String>,
        collapsed: BTreeSet<String>,
        value_dependent: BTreeSet<String>,
    ) -> GraphResult<()> {
        let mut seen: HashSet<&String> = HashSet::with_capacity(self.claims.len());
        for id in survived.iter().chain(&collapsed).chain(&value_dependent) {
            if !self.claim_index.contains(id) {
                return Err(GraphError::InvalidPartition {
                    message: format!("categorized unknown claim {}", id),
                });
            }
            if !seen.insert(id) {
                return Err(GraphError::InvalidPartition {
                    message: format!("claim {} appears in more than one set", id),
                });
            }
        }
        if seen.len() != self.claims.len() {
            return Err(GraphError::InvalidPartition {
                message: format!(
                    "categorized {} of {} claims",
                    seen.len(),
                    self.claims.len()
                ),
            });
        }

        self.robustness_score = Some(score);
        self.survived_claims = survived;
        self.collapsed_claims = collapsed;
        self.value_dependent_claims = value_dependent;
        Ok(())
    }

    /// Sort the generated sequences by their stable snapshot keys.
    ///
    /// Claims keep decomposition order; attacks sort by (target claim,
    /// vector), defenses by claim, fallacies by (location, type). Insertion
    /// order across claims is completion order and not reproducible, so
    /// exposed snapshots use these keys instead.
    pub(crate) fn sort_for_snapshot(&mut self) {
        self.attacks
            .sort_by(|a, b| {
                (&a.target_claim_id, a.attack_vector).cmp(&(&b.target_claim_id, b.attack_vector))
            });
        self.defenses
            .sort_by(|a, b| a.original_claim_id.cmp(&b.original_claim_id));
        self.fallacies
            .sort_by(|a, b| (&a.location, a.fallacy_type).cmp(&(&b.location, b.fallacy_type)));
    }

    /// Mark the graph as a best-effort partial result
    pub(crate) fn mark_partial(&mut self, reason: PartialReason) {
        self.partial = Some(reason);
    }

    /// The input text this graph was built from
    pub fn original_input(&self) -> &str {
        &self.original_input
    }

    /// Claims in decomposition order
    pub fn claims(&self) -> &[AtomicClaim] {
        &self.claims
    }

    /// Whether a claim ID exists in this graph
    pub fn contains_claim(&self, id: &str) -> bool {
        self.claim_index.contains(id)
    }

    /// Number of claims
    pub fn claim_count(&self) -> usize {
        self.claims.len()
    }

    /// Generated attacks
    pub fn attacks(&self) -> &[CounterArgument] {
        &self.attacks
    }

    /// Generated defenses
    pub fn defenses(&self) -> &[DefenseArgument] {
        &self.defenses
    }

    /// Detected fallacies
    pub fn fallacies(&self) -> &[LogicalFallacy] {
        &self.fallacies
    }

    /// Robustness score, absent until scored
    pub fn robustness_score(&self) -> Option<f64> {
        self.robustness_score
    }

    /// Claims that withstood attacks
    pub fn survived_claims(&self) -> &BTreeSet<String> {
        &self.survived_claims
    }

    /// Claims defeated by attacks
    pub fn collapsed_claims(&self) -> &BTreeSet<String> {
        &self.collapsed_claims
    }

    /// Claims excluded from fact-checking as value judgments
    pub fn value_dependent_claims(&self) -> &BTreeSet<String> {
        &self.value_dependent_claims
    }

    /// Whether (and why) this graph is a partial result
    pub fn partial(&self) -> Option<PartialReason> {
        self.partial
    }
}

#[cfg(test)]
pub(crate) fn test_claim(id: &str, claim_type: ClaimType) -> AtomicClaim {
    AtomicClaim {
        id: id.to_string(),
        text: format!("claim text for {}", id),
        claim_type,
        assumptions: vec![],
        evidence_required: None,
        confidence: None,
        supports: vec![],
        contradicts: vec![],
    }
}
