//! Negotiation types and phase state machine

use crate::types::{OfferId, VendorRef};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::SystemTime;

/// What the user wants out of a run, applied uniformly to every offer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationObjectives {
    pub earlier_availability: bool,
    pub discount: bool,
    pub extra_services: bool,
}

impl NegotiationObjectives {
    pub fn discount_only() -> Self {
        Self {
            discount: true,
            ..Self::default()
        }
    }

    pub fn all() -> Self {
        Self {
            earlier_availability: true,
            discount: true,
            extra_services: true,
        }
    }

    /// A run needs at least one objective
    pub fn any(&self) -> bool {
        self.earlier_availability || self.discount || self.extra_services
    }
}

/// Phase of a single negotiation task. Strictly forward, no skipping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Pending,
    SentOffer,
    VendorReviewing,
    CounterOffering,
    Complete,
}

impl Phase {
    /// The only phase this one may move to
    pub fn next(&self) -> Option<Phase> {
        match self {
            Phase::Pending => Some(Phase::SentOffer),
            Phase::SentOffer => Some(Phase::VendorReviewing),
            Phase::VendorReviewing => Some(Phase::CounterOffering),
            Phase::CounterOffering => Some(Phase::Complete),
            Phase::Complete => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Complete)
    }

    /// Human-readable progress line
    pub fn describe(&self) -> &'static str {
        match self {
            Phase::Pending => "Initiating negotiation...",
            Phase::SentOffer => "Sending initial offer...",
            Phase::VendorReviewing => "Vendor reviewing your offer...",
            Phase::CounterOffering => "Vendor counter-offering...",
            Phase::Complete => "Negotiation complete!",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Pending => "PENDING",
            Phase::SentOffer => "SENT_OFFER",
            Phase::VendorReviewing => "VENDOR_REVIEWING",
            Phase::CounterOffering => "COUNTER_OFFERING",
            Phase::Complete => "COMPLETE",
        };
        write!(f, "{}", name)
    }
}

/// Terminal result of one task. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NegotiationOutcome {
    pub offer_id: OfferId,
    pub vendor: VendorRef,
    pub success: bool,
    pub negotiated_availability: Option<u32>,
    pub negotiated_discount_percent: Option<u32>,
    pub negotiated_extra_services: Vec<String>,
    pub final_price: Option<f64>,
    pub message: String,
    pub completed_at: SystemTime,
}

impl NegotiationOutcome {
    /// A failed negotiation carrying `reason` as its message
    pub fn failure(offer_id: OfferId, vendor: VendorRef, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let message = if reason.is_empty() {
            "Negotiation failed".to_string()
        } else {
            reason
        };

        Self {
            offer_id,
            vendor,
            success: false,
            negotiated_availability: None,
            negotiated_discount_percent: None,
            negotiated_extra_services: Vec::new(),
            final_price: None,
            message,
            completed_at: SystemTime::now(),
        }
    }
}

/// Snapshot emitted after every applied phase transition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub offer_id: OfferId,
    pub phase: Phase,
}

/// Run-level status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// No run exists
    Idle,
    Running,
    AllComplete,
}

/// Terminal value of a run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: u64,
    pub best_outcome: Option<NegotiationOutcome>,
    pub all_outcomes: HashMap<OfferId, NegotiationOutcome>,
}

impl RunResult {
    pub fn any_success(&self) -> bool {
        self.all_outcomes.values().any(|o| o.success)
    }

    pub fn successes(&self) -> usize {
        self.all_outcomes.values().filter(|o| o.success).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objectives_any() {
        assert!(!NegotiationObjectives::default().any());
        assert!(NegotiationObjectives::discount_only().any());
        assert!(NegotiationObjectives::all().any());
    }

    #[test]
    fn test_phase_sequence() {
        let mut phase = Phase::Pending;
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            assert!(next > phase);
            phase = next;
            seen.push(phase);
        }

        assert_eq!(
            seen,
            vec![
                Phase::Pending,
                Phase::SentOffer,
                Phase::VendorReviewing,
                Phase::CounterOffering,
                Phase::Complete
            ]
        );
        assert!(phase.is_terminal());
    }

    #[test]
    fn test_phase_serializes_screaming_case() {
        let json = serde_json::to_string(&Phase::VendorReviewing).unwrap();
        assert_eq!(json, "\"VENDOR_REVIEWING\"");
        assert_eq!(Phase::CounterOffering.to_string(), "COUNTER_OFFERING");
    }

    #[test]
    fn test_failure_outcome_has_message() {
        let outcome = NegotiationOutcome::failure(
            OfferId::from("c"),
            VendorRef::new("c", "Vendor C"),
            "",
        );
        assert!(!outcome.success);
        assert!(!outcome.message.is_empty());
        assert!(outcome.final_price.is_none());
    }
}
