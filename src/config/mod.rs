use std::env;
use std::str::FromStr;

use crate::error::EngineError;
use crate::pipeline::ScoringConfig;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Reasoning service credentials and endpoint.
    pub gateway: GatewayConfig,
    /// HTTP request behavior.
    pub request: RequestConfig,
    /// Engine-level limits.
    pub engine: EngineConfig,
    /// Robustness scoring thresholds and weights.
    pub scoring: ScoringConfig,
    /// Pipe names per task kind.
    pub tasks: TaskConfig,
    /// Logging behavior.
    pub logging: LoggingConfig,
}

/// Reasoning service API configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bearer token for the service.
    pub api_key: String,
    /// Service base URL.
    pub base_url: String,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum retry attempts per call.
    pub max_retries: u32,
    /// Base delay for exponential backoff.
    pub retry_delay_ms: u64,
}

/// Engine-level limits
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum concurrent gateway calls per engine (semaphore permits).
    pub max_concurrency: usize,
    /// Maximum dialectic rounds a single request may ask for.
    pub max_rounds: usize,
}

/// Pipe names for the four generation task kinds
#[derive(Debug, Clone)]
pub struct TaskConfig {
    /// Argument decomposition pipe.
    pub decompose: String,
    /// Per-claim attack generation pipe.
    pub attack: String,
    /// Per-claim defense generation pipe.
    pub defend: String,
    /// Pass-level fallacy detection pipe.
    pub fallacies: String,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info").
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    /// Human-readable output.
    Pretty,
    /// Line-delimited JSON.
    Json,
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, EngineError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let gateway = GatewayConfig {
            api_key: env::var("REASONING_API_KEY").map_err(|_| EngineError::Config {
                message: "REASONING_API_KEY is required".to_string(),
            })?,
            base_url: env::var("REASONING_BASE_URL")
                .unwrap_or_else(|_| "https://api.langbase.com".to_string()),
        };

        let request = RequestConfig {
            timeout_ms: env_parse("REQUEST_TIMEOUT_MS", 30000),
            max_retries: env_parse("MAX_RETRIES", 3),
            retry_delay_ms: env_parse("RETRY_DELAY_MS", 1000),
        };

        let engine = EngineConfig {
            max_concurrency: env_parse("MAX_CONCURRENCY", 5),
            max_rounds: env_parse("MAX_ROUNDS", 10),
        };

        let scoring = ScoringConfig {
            collapse_threshold: env_parse("SCORING_COLLAPSE_THRESHOLD", 0.6),
            severe_threshold: env_parse("SCORING_SEVERE_THRESHOLD", 0.8),
            ..ScoringConfig::default()
        };

        let tasks = TaskConfig {
            decompose: env::var("PIPE_DECOMPOSE")
                .unwrap_or_else(|_| "argument-decompose-v1".to_string()),
            attack: env::var("PIPE_ATTACK").unwrap_or_else(|_| "claim-attack-v1".to_string()),
            defend: env::var("PIPE_DEFEND").unwrap_or_else(|_| "claim-defend-v1".to_string()),
            fallacies: env::var("PIPE_FALLACIES")
                .unwrap_or_else(|_| "fallacy-detect-v1".to_string()),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        Ok(Config {
            gateway,
            request,
            engine,
            scoring,
            tasks,
            logging,
        })
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 5,
            max_rounds: 10,
        }
    }
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            decompose: "argument-decompose-v1".to_string(),
            attack: "claim-attack-v1".to_string(),
            defend: "claim-defend-v1".to_string(),
            fallacies: "fallacy-detect-v1".to_string(),
        }
    }
}
