//! Outcome generation for a single negotiation
//!
//! The orchestrator only knows the [`OutcomeGenerator`] trait. The bundled
//! [`SimulatedNegotiator`] draws terms from an injected random source so runs
//! are reproducible under a fixed seed; a real vendor backend would implement
//! the same trait.

use crate::config::OutcomePolicy;
use crate::error::{HaggleError, Result};
use crate::types::Offer;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use super::types::{NegotiationObjectives, NegotiationOutcome};

/// Produces the outcome of negotiating one offer.
///
/// Implementations may suspend. An `Err` is reported by the orchestrator as
/// an unsuccessful outcome carrying the error text.
#[async_trait]
pub trait OutcomeGenerator: Send + Sync {
    async fn negotiate(
        &self,
        offer: &Offer,
        objectives: &NegotiationObjectives,
    ) -> Result<NegotiationOutcome>;
}

/// Terms a vendor agreed to
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NegotiatedTerms {
    pub availability_minutes: Option<u32>,
    pub discount_percent: Option<u32>,
    pub extra_services: Vec<String>,
}

/// Turn agreed terms into a successful outcome for `offer`.
///
/// Terms for objectives that were not requested are ignored. The final price
/// is the advertised amount less the discount, rounded to a whole unit.
pub fn settle(
    offer: &Offer,
    objectives: &NegotiationObjectives,
    terms: NegotiatedTerms,
) -> NegotiationOutcome {
    let availability = terms
        .availability_minutes
        .filter(|_| objectives.earlier_availability);
    let discount = terms.discount_percent.filter(|_| objectives.discount);
    let extras = if objectives.extra_services {
        terms.extra_services
    } else {
        Vec::new()
    };

    let final_price = discount.and_then(|d| {
        offer
            .price
            .amount
            .map(|price| (price * (1.0 - d as f64 / 100.0)).round())
    });

    let mut parts = Vec::new();
    if objectives.earlier_availability {
        match availability {
            Some(minutes) => parts.push(format!(
                "I've negotiated priority service - they can arrive in {} minutes",
                minutes
            )),
            None if offer.availability_minutes == Some(0) => parts.push(format!(
                "{} is already available immediately",
                offer.vendor.name
            )),
            None => {}
        }
    }
    if let Some(d) = discount {
        parts.push(format!("Special discount of {}% applied exclusively for you", d));
    }
    if !extras.is_empty() {
        parts.push(format!("Secured complimentary extras: {}", extras.join(", ")));
    }

    let message = if parts.is_empty() {
        "Successfully negotiated a better deal for you!".to_string()
    } else {
        parts.join(". ")
    };

    NegotiationOutcome {
        offer_id: offer.id.clone(),
        vendor: offer.vendor.clone(),
        success: true,
        negotiated_availability: availability,
        negotiated_discount_percent: discount,
        negotiated_extra_services: extras,
        final_price,
        message,
        completed_at: SystemTime::now(),
    }
}

/// Stochastic stand-in for a vendor negotiation backend
pub struct SimulatedNegotiator {
    policy: OutcomePolicy,
    rng: Mutex<StdRng>,
}

impl SimulatedNegotiator {
    /// Seeded from `policy.seed`, or from entropy when no seed is configured
    pub fn new(policy: OutcomePolicy) -> Self {
        let rng = match policy.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(policy, rng)
    }

    /// Use an explicit random source
    pub fn with_rng(policy: OutcomePolicy, rng: StdRng) -> Self {
        Self {
            policy,
            rng: Mutex::new(rng),
        }
    }

    pub fn seeded(policy: OutcomePolicy, seed: u64) -> Self {
        Self::with_rng(policy, StdRng::seed_from_u64(seed))
    }

    pub fn policy(&self) -> &OutcomePolicy {
        &self.policy
    }

    fn draw<R: Rng>(
        &self,
        rng: &mut R,
        offer: &Offer,
        objectives: &NegotiationObjectives,
    ) -> NegotiationOutcome {
        let policy = &self.policy;
        let success_probability = policy.success_probability.clamp(0.0, 1.0);

        if !rng.gen_bool(success_probability) {
            return NegotiationOutcome::failure(
                offer.id.clone(),
                offer.vendor.clone(),
                format!("{} declined to improve on the offer", offer.vendor.name),
            );
        }

        let mut terms = NegotiatedTerms::default();

        if objectives.earlier_availability {
            terms.availability_minutes = match offer.availability_minutes {
                Some(0) => None,
                Some(current) => Some(rng.gen_range(current / 4..current)),
                None => {
                    let low = policy.min_arrival_minutes;
                    let high = policy.max_arrival_minutes.max(low + 1);
                    Some(rng.gen_range(low..high))
                }
            };
        }

        if objectives.discount {
            let low = policy.min_discount_percent;
            let high = policy.max_discount_percent.max(low + 1);
            terms.discount_percent = Some(rng.gen_range(low..high));
        }

        if objectives.extra_services && !policy.extras.is_empty() {
            let count = rng.gen_range(1..=2).min(policy.extras.len());
            terms.extra_services = policy
                .extras
                .choose_multiple(rng, count)
                .cloned()
                .collect();
        }

        settle(offer, objectives, terms)
    }
}

#[async_trait]
impl OutcomeGenerator for SimulatedNegotiator {
    async fn negotiate(
        &self,
        offer: &Offer,
        objectives: &NegotiationObjectives,
    ) -> Result<NegotiationOutcome> {
        if self.policy.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.policy.latency_ms)).await;
        }

        let mut rng = self
            .rng
            .lock()
            .map_err(|_| HaggleError::Backend("random source poisoned".to_string()))?;

        Ok(self.draw(&mut *rng, offer, objectives))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VendorRef;

    fn offer() -> Offer {
        Offer::new("p1", "Rajesh Plumbing", "₹500/hr", VendorRef::new("v1", "Rajesh"))
            .with_availability(45)
            .with_rating(4.7)
    }

    #[test]
    fn test_settle_discount_final_price() {
        let offer = Offer::new("a", "A", "₹1000", VendorRef::new("a", "A"));
        let outcome = settle(
            &offer,
            &NegotiationObjectives::discount_only(),
            NegotiatedTerms {
                discount_percent: Some(10),
                ..NegotiatedTerms::default()
            },
        );

        assert!(outcome.success);
        assert_eq!(outcome.final_price, Some(900.0));
        assert!(outcome.message.contains("10%"));
    }

    #[test]
    fn test_settle_ignores_unrequested_terms() {
        let outcome = settle(
            &offer(),
            &NegotiationObjectives::discount_only(),
            NegotiatedTerms {
                availability_minutes: Some(10),
                discount_percent: Some(5),
                extra_services: vec!["Free inspection".to_string()],
            },
        );

        assert_eq!(outcome.negotiated_availability, None);
        assert!(outcome.negotiated_extra_services.is_empty());
        assert_eq!(outcome.negotiated_discount_percent, Some(5));
    }

    #[test]
    fn test_settle_unparsable_price_has_no_final_price() {
        let offer = Offer::new("x", "X", "on request", VendorRef::new("x", "X"));
        let outcome = settle(
            &offer,
            &NegotiationObjectives::discount_only(),
            NegotiatedTerms {
                discount_percent: Some(15),
                ..NegotiatedTerms::default()
            },
        );
        assert_eq!(outcome.final_price, None);
        assert_eq!(outcome.negotiated_discount_percent, Some(15));
    }

    #[test]
    fn test_settle_message_never_empty() {
        let outcome = settle(&offer(), &NegotiationObjectives::default(), NegotiatedTerms::default());
        assert!(!outcome.message.is_empty());
    }

    #[tokio::test]
    async fn test_simulated_terms_within_bounds() {
        let negotiator = SimulatedNegotiator::seeded(OutcomePolicy::default(), 7);
        let offer = offer();

        for _ in 0..200 {
            let outcome = negotiator
                .negotiate(&offer, &NegotiationObjectives::all())
                .await
                .unwrap();

            assert!(outcome.success);
            let minutes = outcome.negotiated_availability.unwrap();
            assert!(minutes < 45);

            let discount = outcome.negotiated_discount_percent.unwrap();
            assert!((5..20).contains(&discount));
            let expected = (500.0 * (1.0 - discount as f64 / 100.0)).round();
            assert_eq!(outcome.final_price, Some(expected));

            let extras = &outcome.negotiated_extra_services;
            assert!((1..=2).contains(&extras.len()));
            if extras.len() == 2 {
                assert_ne!(extras[0], extras[1]);
            }
            assert!(!outcome.message.is_empty());
        }
    }

    #[tokio::test]
    async fn test_same_seed_same_outcomes() {
        let a = SimulatedNegotiator::seeded(OutcomePolicy::default(), 42);
        let b = SimulatedNegotiator::seeded(OutcomePolicy::default(), 42);
        let offer = offer();

        for _ in 0..20 {
            let x = a.negotiate(&offer, &NegotiationObjectives::all()).await.unwrap();
            let y = b.negotiate(&offer, &NegotiationObjectives::all()).await.unwrap();
            assert_eq!(x.negotiated_availability, y.negotiated_availability);
            assert_eq!(x.negotiated_discount_percent, y.negotiated_discount_percent);
            assert_eq!(x.negotiated_extra_services, y.negotiated_extra_services);
            assert_eq!(x.message, y.message);
        }
    }

    #[tokio::test]
    async fn test_zero_probability_always_fails() {
        let policy = OutcomePolicy {
            success_probability: 0.0,
            ..OutcomePolicy::default()
        };
        let negotiator = SimulatedNegotiator::seeded(policy, 1);

        let outcome = negotiator
            .negotiate(&offer(), &NegotiationObjectives::all())
            .await
            .unwrap();
        assert!(!outcome.success);
        assert!(outcome.message.contains("Rajesh"));
    }

    #[tokio::test]
    async fn test_immediate_availability_cannot_improve() {
        let negotiator = SimulatedNegotiator::seeded(OutcomePolicy::default(), 3);
        let offer = offer().with_availability(0);

        let outcome = negotiator
            .negotiate(
                &offer,
                &NegotiationObjectives {
                    earlier_availability: true,
                    ..NegotiationObjectives::default()
                },
            )
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.negotiated_availability, None);
        assert!(outcome.message.contains("already available"));
    }

    #[tokio::test]
    async fn test_unknown_availability_uses_arrival_window() {
        let negotiator = SimulatedNegotiator::seeded(OutcomePolicy::default(), 11);
        let mut offer = offer();
        offer.availability_minutes = None;

        let outcome = negotiator
            .negotiate(
                &offer,
                &NegotiationObjectives {
                    earlier_availability: true,
                    ..NegotiationObjectives::default()
                },
            )
            .await
            .unwrap();

        let minutes = outcome.negotiated_availability.unwrap();
        assert!((5..20).contains(&minutes));
    }
}
