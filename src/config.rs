//! Negotiator configuration
//!
//! All sections default to the values the marketplace shipped with, so an
//! empty (or absent) TOML file yields a working configuration.

use crate::error::{HaggleError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Weights of the cost-like offer score (lower is better)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Multiplier on availability minutes
    pub availability: f64,
    /// Multiplier on the numeric price
    pub price: f64,
    /// Multiplier on the rating, subtracted from the score
    pub rating: f64,
    /// Used when an offer has no availability
    pub default_availability_minutes: u32,
    /// Used when an offer's price has no number in it
    pub default_price: f64,
    /// Used when an offer has no rating
    pub default_rating: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            availability: 0.5,
            price: 0.3,
            rating: 20.0,
            default_availability_minutes: 999,
            default_price: 999.0,
            default_rating: 0.0,
        }
    }
}

/// Simulated per-phase latency, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseTiming {
    /// SENT_OFFER -> VENDOR_REVIEWING for the first task
    pub review_delay_ms: u64,
    /// Added per task index to `review_delay_ms`
    pub review_step_ms: u64,
    /// VENDOR_REVIEWING -> COUNTER_OFFERING for the first task
    pub counter_delay_ms: u64,
    /// Added per task index to `counter_delay_ms`
    pub counter_step_ms: u64,
    /// COUNTER_OFFERING -> outcome generator call
    pub closing_delay_ms: u64,
    /// Upper bound on a single outcome generator call
    pub outcome_timeout_ms: u64,
}

impl Default for PhaseTiming {
    fn default() -> Self {
        Self {
            review_delay_ms: 2000,
            review_step_ms: 1500,
            counter_delay_ms: 3000,
            counter_step_ms: 1000,
            closing_delay_ms: 2500,
            outcome_timeout_ms: 30_000,
        }
    }
}

impl PhaseTiming {
    /// Timing with every delay at zero; useful for demos and tests
    pub fn immediate() -> Self {
        Self {
            review_delay_ms: 0,
            review_step_ms: 0,
            counter_delay_ms: 0,
            counter_step_ms: 0,
            closing_delay_ms: 0,
            ..Self::default()
        }
    }

    pub fn review_delay(&self, index: usize) -> Duration {
        Duration::from_millis(staggered(self.review_delay_ms, self.review_step_ms, index))
    }

    pub fn counter_delay(&self, index: usize) -> Duration {
        Duration::from_millis(staggered(self.counter_delay_ms, self.counter_step_ms, index))
    }

    pub fn closing_delay(&self) -> Duration {
        Duration::from_millis(self.closing_delay_ms)
    }

    pub fn outcome_timeout(&self) -> Duration {
        Duration::from_millis(self.outcome_timeout_ms)
    }
}

/// Policy of the simulated outcome generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomePolicy {
    /// Chance a single negotiation succeeds. The default of 1.0 means every
    /// vendor agrees to some improvement.
    pub success_probability: f64,
    /// Inclusive lower bound of the negotiated discount, in whole percent
    pub min_discount_percent: u32,
    /// Exclusive upper bound of the negotiated discount, in whole percent
    pub max_discount_percent: u32,
    /// Earliest arrival window offered when current availability is unknown
    pub min_arrival_minutes: u32,
    pub max_arrival_minutes: u32,
    /// Extras a vendor may throw in
    pub extras: Vec<String>,
    /// Seed for the random source; entropy is used when absent
    pub seed: Option<u64>,
    /// Artificial latency of each generator call
    pub latency_ms: u64,
}

impl Default for OutcomePolicy {
    fn default() -> Self {
        Self {
            success_probability: 1.0,
            min_discount_percent: 5,
            max_discount_percent: 20,
            min_arrival_minutes: 5,
            max_arrival_minutes: 20,
            extras: default_extras(),
            seed: None,
            latency_ms: 0,
        }
    }
}

fn default_extras() -> Vec<String> {
    [
        "Free inspection",
        "Extended warranty",
        "Priority support",
        "Complimentary maintenance check",
        "Free follow-up visit",
        "Discounted parts",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// `base + step * index`, saturating at `u64::MAX` milliseconds
fn staggered(base_ms: u64, step_ms: u64, index: usize) -> u64 {
    let index = u64::try_from(index).unwrap_or(u64::MAX);
    base_ms.saturating_add(step_ms.saturating_mul(index))
}

/// Main negotiator configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiatorConfig {
    pub scoring: ScoringWeights,
    pub timing: PhaseTiming,
    pub outcome: OutcomePolicy,
}

impl NegotiatorConfig {
    /// Load configuration from a TOML file, or the defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    HaggleError::Configuration(format!("{}: {}", path.display(), e))
                })?;
                Self::from_toml(&raw)?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Reject values the negotiator cannot work with
    pub fn validate(&self) -> Result<()> {
        let outcome = &self.outcome;

        if !(0.0..=1.0).contains(&outcome.success_probability) {
            return Err(HaggleError::InvalidConfig(format!(
                "outcome.success_probability must be within [0, 1], got {}",
                outcome.success_probability
            )));
        }

        if outcome.min_discount_percent >= outcome.max_discount_percent
            || outcome.max_discount_percent > 100
        {
            return Err(HaggleError::InvalidConfig(format!(
                "outcome discount range [{}, {}) is empty or exceeds 100%",
                outcome.min_discount_percent, outcome.max_discount_percent
            )));
        }

        if outcome.min_arrival_minutes >= outcome.max_arrival_minutes {
            return Err(HaggleError::InvalidConfig(format!(
                "outcome arrival window [{}, {}) is empty",
                outcome.min_arrival_minutes, outcome.max_arrival_minutes
            )));
        }

        if outcome.extras.is_empty() {
            return Err(HaggleError::InvalidConfig(
                "outcome.extras must list at least one extra service".to_string(),
            ));
        }

        if self.timing.outcome_timeout_ms == 0 {
            return Err(HaggleError::InvalidConfig(
                "timing.outcome_timeout_ms must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = NegotiatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scoring.availability, 0.5);
        assert_eq!(config.scoring.price, 0.3);
        assert_eq!(config.scoring.rating, 20.0);
        assert_eq!(config.outcome.extras.len(), 6);
    }

    #[test]
    fn test_load_without_path_uses_defaults() {
        let config = NegotiatorConfig::load(None).unwrap();
        assert_eq!(config, NegotiatorConfig::default());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = NegotiatorConfig::from_toml(
            r#"
            [scoring]
            price = 0.6

            [outcome]
            success_probability = 0.85
            seed = 42
            "#,
        )
        .unwrap();

        assert_eq!(config.scoring.price, 0.6);
        assert_eq!(config.scoring.availability, 0.5);
        assert_eq!(config.outcome.success_probability, 0.85);
        assert_eq!(config.outcome.seed, Some(42));
        assert_eq!(config.timing, PhaseTiming::default());
    }

    #[test]
    fn test_invalid_probability_rejected() {
        let mut config = NegotiatorConfig::default();
        config.outcome.success_probability = 1.5;
        assert!(matches!(config.validate(), Err(HaggleError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_discount_range_rejected() {
        let mut config = NegotiatorConfig::default();
        config.outcome.min_discount_percent = 20;
        config.outcome.max_discount_percent = 20;
        assert!(matches!(config.validate(), Err(HaggleError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_extras_rejected() {
        let mut config = NegotiatorConfig::default();
        config.outcome.extras.clear();
        assert!(matches!(config.validate(), Err(HaggleError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let result = NegotiatorConfig::from_toml("[scoring\nprice = ");
        assert!(matches!(result, Err(HaggleError::Toml(_))));
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let result = NegotiatorConfig::load(Some(Path::new("/nonexistent/haggle.toml")));
        assert!(matches!(result, Err(HaggleError::Configuration(_))));
    }

    #[test]
    fn test_huge_step_from_toml_saturates() {
        let config = NegotiatorConfig::from_toml(
            r#"
            [timing]
            review_step_ms = 9223372036854775807
            counter_delay_ms = 9223372036854775807
            counter_step_ms = 9223372036854775807
            "#,
        )
        .unwrap();

        assert_eq!(config.timing.review_delay(0), Duration::from_millis(2000));
        assert_eq!(config.timing.review_delay(3), Duration::from_millis(u64::MAX));
        assert_eq!(config.timing.counter_delay(2), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_phase_delays_grow_with_index() {
        let timing = PhaseTiming::default();
        assert_eq!(timing.review_delay(0), Duration::from_millis(2000));
        assert_eq!(timing.review_delay(2), Duration::from_millis(5000));
        assert_eq!(timing.counter_delay(1), Duration::from_millis(4000));
        assert_eq!(timing.closing_delay(), Duration::from_millis(2500));
    }
}
