//! @acp:module "Selection Errors"
//! @acp:summary "Error taxonomy for question selection and its configuration"
//! @acp:domain selection
//! @acp:layer model

use thiserror::Error;

/// Per-request selection failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("explicit topic scope requires at least one topic")]
    ScopeEmpty,

    #[error("question count must be greater than zero")]
    InvalidQuestionCount,

    #[error("insufficient questions available: {available_count} available, {requested_count} requested")]
    InsufficientPool {
        available_count: usize,
        requested_count: usize,
    },
}

/// Start-up configuration failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("adaptive ratios must sum to 100, got {new} + {wrong} + {correct} = {sum}")]
    RatioMisconfiguration {
        new: u32,
        wrong: u32,
        correct: u32,
        sum: u32,
    },

    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
