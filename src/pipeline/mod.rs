//! Analysis pipeline stages.
//!
//! One analysis round runs the stages in order:
//! - [`Decomposer`]: break the input into atomic claims (fail-fast)
//! - [`Orchestrator`]: fan out attack/defense/fallacy generation (degrade
//!   gracefully, bounded concurrency)
//! - [`scorer`]: pure robustness scoring and claim categorization
//!
//! [`DialecticLoop`] threads rounds together for multi-round sessions.
//!
//! All stages share gateway access via [`StageCore`] composition.

mod core;
mod decompose;
mod dialectic;
mod orchestrator;
pub mod scorer;

pub use self::core::*;
pub use decompose::*;
pub use dialectic::*;
pub use orchestrator::*;
pub use scorer::{ScoreOutcome, ScoringConfig};

use serde::{Deserialize, Serialize};

/// Which generation passes an analysis runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    /// Devil's advocate: attacks only.
    Attack,
    /// Steelman: defenses only.
    Defense,
    /// Full debate: attacks and defenses.
    Dialectic,
    /// Objective analysis: no generation passes.
    Neutral,
}

impl Stance {
    /// Get the stance as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Stance::Attack => "attack",
            Stance::Defense => "defense",
            Stance::Dialectic => "dialectic",
            Stance::Neutral => "neutral",
        }
    }

    /// Whether this stance issues per-claim attack calls
    pub fn issues_attacks(&self) -> bool {
        matches!(self, Stance::Attack | Stance::Dialectic)
    }

    /// Whether this stance issues per-claim defense calls
    pub fn issues_defenses(&self) -> bool {
        matches!(self, Stance::Defense | Stance::Dialectic)
    }
}

impl std::fmt::Display for Stance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Stance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "attack" => Ok(Stance::Attack),
            "defense" => Ok(Stance::Defense),
            "dialectic" => Ok(Stance::Dialectic),
            "neutral" => Ok(Stance::Neutral),
            _ => Err(format!("Unknown stance: {}", s)),
        }
    }
}

/// Argument delivery styles.
///
/// A closed tag; the persona only selects prompt-construction parameters
/// (see [`crate::prompts::persona_style`]), never behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    /// Rigorous, evidence-based, formal.
    Academic,
    /// Persuasive, constituency-aware.
    Politician,
    /// Systems-thinking, edge-case hunting.
    Engineer,
    /// Informal, emotional, relatable.
    Teenager,
    /// Moral frameworks and tradition.
    Religious,
    /// Incentives and opportunity costs.
    Economist,
    /// Punchy and provocative.
    Twitter,
    /// Skeptical, evidence-demanding.
    RedditAtheist,
    /// Risk- and stakeholder-focused.
    Corporate,
}

impl Persona {
    /// Get the persona as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::Academic => "academic",
            Persona::Politician => "politician",
            Persona::Engineer => "engineer",
            Persona::Teenager => "teenager",
            Persona::Religious => "religious",
            Persona::Economist => "economist",
            Persona::Twitter => "twitter",
            Persona::RedditAtheist => "reddit_atheist",
            Persona::Corporate => "corporate",
        }
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "academic" => Ok(Persona::Academic),
            "politician" => Ok(Persona::Politician),
            "engineer" => Ok(Persona::Engineer),
            "teenager" => Ok(Persona::Teenager),
            "religious" => Ok(Persona::Religious),
            "economist" => Ok(Persona::Economist),
            "twitter" => Ok(Persona::Twitter),
            "reddit_atheist" => Ok(Persona::RedditAtheist),
            "corporate" => Ok(Persona::Corporate),
            _ => Err(format!("Unknown persona: {}", s)),
        }
    }
}

/// Extract JSON from a completion string, handling markdown code blocks.
///
/// Attempts extraction in this order:
/// 1. Try parsing as raw JSON first (fast path)
/// 2. Extract from ```json ... ``` code blocks
/// 3. Extract from ``` ... ``` code blocks
/// 4. Return error if none work
pub(crate) fn extract_json_from_completion(completion: &str) -> Result<&str, String> {
    // Fast path: raw JSON
    let trimmed = completion.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Ok(trimmed);
    }

    // Try ```json ... ``` blocks
    if completion.contains("```json") {
        return completion
            .split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "Found ```json block but content was empty or malformed".to_string());
    }

    // Try ``` ... ``` blocks
    if completion.contains("```") {
        return completion
            .split("```")
            .nth(1)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "Found ``` block but content was empty or malformed".to_string());
    }

    Err(format!(
        "No JSON found in response. First 100 chars: '{}'",
        completion.chars().take(100).collect::<String>()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stance_as_str() {
        assert_eq!(Stance::Attack.as_str(), "attack");
        assert_eq!(Stance::Defense.as_str(), "defense");
        assert_eq!(Stance::Dialectic.as_str(), "dialectic");
        assert_eq!(Stance::Neutral.as_str(), "neutral");
    }

    #[test]
    fn test_stance_passes() {
        assert!(Stance::Attack.issues_attacks());
        assert!(!Stance::Attack.issues_defenses());
        assert!(!Stance::Defense.issues_attacks());
        assert!(Stance::Defense.issues_defenses());
        assert!(Stance::Dialectic.issues_attacks());
        assert!(Stance::Dialectic.issues_defenses());
        assert!(!Stance::Neutral.issues_attacks());
        assert!(!Stance::Neutral.issues_defenses());
    }

    #[test]
    fn test_stance_from_str() {
        assert_eq!("dialectic".parse::<Stance>().unwrap(), Stance::Dialectic);
        assert_eq!("ATTACK".parse::<Stance>().unwrap(), Stance::Attack);
        assert!("sideways".parse::<Stance>().is_err());
    }

    #[test]
    fn test_persona_round_trip() {
        for persona in [
            Persona::Academic,
            Persona::Politician,
            Persona::Engineer,
            Persona::Teenager,
            Persona::Religious,
            Persona::Economist,
            Persona::Twitter,
            Persona::RedditAtheist,
            Persona::Corporate,
        ] {
            assert_eq!(persona.as_str().parse::<Persona>().unwrap(), persona);
        }
        assert!("philosopher".parse::<Persona>().is_err());
    }

    #[test]
    fn test_extract_json_raw_object() {
        let result = extract_json_from_completion(r#"{"claims": []}"#);
        assert_eq!(result.unwrap(), r#"{"claims": []}"#);
    }

    #[test]
    fn test_extract_json_with_whitespace() {
        let result = extract_json_from_completion("  \n  {\"claims\": []}  \n  ");
        assert_eq!(result.unwrap(), r#"{"claims": []}"#);
    }

    #[test]
    fn test_extract_json_from_json_code_block() {
        let input = "Here is the breakdown:\n```json\n{\"claims\": []}\n```\nDone.";
        assert_eq!(extract_json_from_completion(input).unwrap(), r#"{"claims": []}"#);
    }

    #[test]
    fn test_extract_json_from_plain_code_block() {
        let input = "```\n{\"attacks\": []}\n```";
        assert_eq!(
            extract_json_from_completion(input).unwrap(),
            r#"{"attacks": []}"#
        );
    }

    #[test]
    fn test_extract_json_empty_block() {
        assert!(extract_json_from_completion("```json\n\n```").is_err());
    }

    #[test]
    fn test_extract_json_no_json_found() {
        let result = extract_json_from_completion("Plain prose, no JSON at all.");
        assert!(result.unwrap_err().contains("No JSON found"));
    }
}
