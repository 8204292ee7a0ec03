use thiserror::Error;

use crate::models::{EntryId, SessionId};
use crate::violation::RuleViolation;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Rule violation: {0}")]
    Rule(#[from] RuleViolation),

    #[error("Unknown session: {0}")]
    UnknownSession(SessionId),

    #[error("Unknown entry {entry} in session {session}")]
    UnknownEntry { session: SessionId, entry: EntryId },

    #[error("Invalid attempt number: {0}. Must be 1-6")]
    InvalidAttempt(u8),

    #[error("Missing coefficient: {section}.{key}")]
    MissingCoefficient { section: &'static str, key: String },

    #[error("Malformed coefficient table: {0}")]
    CoefficientFormat(#[from] serde_json::Error),

    #[error("Session lock poisoned: {0}")]
    LockPoisoned(SessionId),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub fn is_rule_violation(&self) -> bool {
        matches!(self, EngineError::Rule(_))
    }

    pub fn as_rule_violation(&self) -> Option<&RuleViolation> {
        match self {
            EngineError::Rule(violation) => Some(violation),
            _ => None,
        }
    }
}
