//! Per-offer negotiation task

use crate::error::{HaggleError, Result};
use crate::types::OfferId;
use std::time::SystemTime;

use super::types::{NegotiationOutcome, Phase};

/// One negotiation with one vendor, owned by the active run
#[derive(Clone, Debug)]
pub struct NegotiationTask {
    offer_id: OfferId,
    index: usize,
    phase: Phase,
    started_at: SystemTime,
    outcome: Option<NegotiationOutcome>,
}

impl NegotiationTask {
    /// Create a task in `PENDING`
    pub fn new(offer_id: OfferId, index: usize) -> Self {
        Self {
            offer_id,
            index,
            phase: Phase::Pending,
            started_at: SystemTime::now(),
            outcome: None,
        }
    }

    pub fn offer_id(&self) -> &OfferId {
        &self.offer_id
    }

    /// Position of the offer in the frozen selection
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    /// Set only once the task is `COMPLETE`
    pub fn outcome(&self) -> Option<&NegotiationOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Move to `to`, which must be the immediate successor of the current
    /// phase and must not be `COMPLETE` (use [`NegotiationTask::complete`]).
    pub fn advance(&mut self, to: Phase) -> Result<()> {
        if self.is_complete() {
            return Err(HaggleError::TaskAlreadyComplete(self.offer_id.0.clone()));
        }

        if to.is_terminal() || self.phase.next() != Some(to) {
            return Err(HaggleError::InvalidPhaseTransition {
                from: self.phase.to_string(),
                to: to.to_string(),
            });
        }

        self.phase = to;
        Ok(())
    }

    /// Store the outcome and enter `COMPLETE`
    pub fn complete(&mut self, outcome: NegotiationOutcome) -> Result<()> {
        if self.is_complete() {
            return Err(HaggleError::TaskAlreadyComplete(self.offer_id.0.clone()));
        }

        if self.phase != Phase::CounterOffering {
            return Err(HaggleError::InvalidPhaseTransition {
                from: self.phase.to_string(),
                to: Phase::Complete.to_string(),
            });
        }

        self.outcome = Some(outcome);
        self.phase = Phase::Complete;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VendorRef;

    fn outcome(id: &str) -> NegotiationOutcome {
        NegotiationOutcome::failure(OfferId::from(id), VendorRef::new(id, id), "no deal")
    }

    fn task_at_counter_offer() -> NegotiationTask {
        let mut task = NegotiationTask::new(OfferId::from("p1"), 0);
        task.advance(Phase::SentOffer).unwrap();
        task.advance(Phase::VendorReviewing).unwrap();
        task.advance(Phase::CounterOffering).unwrap();
        task
    }

    #[test]
    fn test_task_creation() {
        let task = NegotiationTask::new(OfferId::from("p1"), 2);
        assert_eq!(task.phase(), Phase::Pending);
        assert_eq!(task.index(), 2);
        assert!(task.outcome().is_none());
        assert!(!task.is_complete());
    }

    #[test]
    fn test_full_forward_sequence() {
        let mut task = task_at_counter_offer();
        task.complete(outcome("p1")).unwrap();

        assert!(task.is_complete());
        assert_eq!(task.outcome().unwrap().offer_id, OfferId::from("p1"));
    }

    #[test]
    fn test_cannot_skip_phase() {
        let mut task = NegotiationTask::new(OfferId::from("p1"), 0);
        let result = task.advance(Phase::VendorReviewing);
        assert!(matches!(result, Err(HaggleError::InvalidPhaseTransition { .. })));
        assert_eq!(task.phase(), Phase::Pending);
    }

    #[test]
    fn test_cannot_reenter_phase() {
        let mut task = NegotiationTask::new(OfferId::from("p1"), 0);
        task.advance(Phase::SentOffer).unwrap();
        assert!(task.advance(Phase::SentOffer).is_err());
        assert!(task.advance(Phase::Pending).is_err());
    }

    #[test]
    fn test_complete_requires_counter_offer() {
        let mut task = NegotiationTask::new(OfferId::from("p1"), 0);
        task.advance(Phase::SentOffer).unwrap();
        assert!(task.complete(outcome("p1")).is_err());
        assert!(task.advance(Phase::Complete).is_err());
    }

    #[test]
    fn test_complete_task_is_immutable() {
        let mut task = task_at_counter_offer();
        task.complete(outcome("p1")).unwrap();

        assert!(matches!(
            task.complete(outcome("p1")),
            Err(HaggleError::TaskAlreadyComplete(_))
        ));
        assert!(matches!(
            task.advance(Phase::SentOffer),
            Err(HaggleError::TaskAlreadyComplete(_))
        ));
    }
}
