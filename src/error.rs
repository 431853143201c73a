//! Error types for Haggle

use thiserror::Error;

/// Main error type for Haggle
#[derive(Error, Debug)]
pub enum HaggleError {
    // Run construction errors
    #[error("Cannot start a negotiation without any selected offers")]
    EmptySelection,

    #[error("At least one negotiation objective must be set")]
    NoObjectives,

    #[error("A negotiation run is already active")]
    RunAlreadyActive,

    #[error("Negotiation run was reset before it completed")]
    RunReset,

    // Selection errors
    #[error("Selection is locked while a negotiation run exists")]
    SelectionLocked,

    #[error("Offer not found: {0}")]
    OfferNotFound(String),

    // Task state machine errors
    #[error("Invalid phase transition: {from} -> {to}")]
    InvalidPhaseTransition { from: String, to: String },

    #[error("Negotiation task already complete: {0}")]
    TaskAlreadyComplete(String),

    // Negotiation backend errors
    #[error("Negotiation backend error: {0}")]
    Backend(String),

    #[error("Negotiation backend timed out: {0}")]
    BackendTimeout(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfig(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl HaggleError {
    /// True for the errors `start_run` uses to reject a request
    pub fn is_invalid_run_request(&self) -> bool {
        matches!(
            self,
            HaggleError::EmptySelection | HaggleError::NoObjectives | HaggleError::RunAlreadyActive
        )
    }
}

/// Result type alias for Haggle operations
pub type Result<T> = std::result::Result<T, HaggleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = HaggleError::OfferNotFound("p1".to_string());
        assert_eq!(err.to_string(), "Offer not found: p1");
    }

    #[test]
    fn test_invalid_phase_transition_message() {
        let err = HaggleError::InvalidPhaseTransition {
            from: "PENDING".to_string(),
            to: "COMPLETE".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid phase transition: PENDING -> COMPLETE");
    }

    #[test]
    fn test_invalid_run_request_classification() {
        assert!(HaggleError::EmptySelection.is_invalid_run_request());
        assert!(HaggleError::NoObjectives.is_invalid_run_request());
        assert!(HaggleError::RunAlreadyActive.is_invalid_run_request());
        assert!(!HaggleError::SelectionLocked.is_invalid_run_request());
        assert!(!HaggleError::Backend("down".to_string()).is_invalid_run_request());
    }

    #[test]
    fn test_error_conversion() {
        fn io_error_function() -> Result<()> {
            std::fs::read_to_string("/nonexistent/haggle.toml")?;
            Ok(())
        }

        let result = io_error_function();
        assert!(matches!(result.unwrap_err(), HaggleError::Io(_)));
    }
}
