//! Offer scoring
//!
//! A single cost-like score ranks both search results and negotiated
//! outcomes: `availability * w_a + price * w_p - rating * w_r`, lower is
//! better. Missing or malformed inputs fall back to the configured defaults.

use crate::config::ScoringWeights;
use crate::types::Offer;

/// The three inputs the score is computed from
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreInputs {
    pub availability_minutes: Option<u32>,
    pub price: Option<f64>,
    pub rating: Option<f64>,
}

impl ScoreInputs {
    pub fn from_offer(offer: &Offer) -> Self {
        Self {
            availability_minutes: offer.availability_minutes,
            price: offer.price.amount,
            rating: offer.rating,
        }
    }
}

/// Score raw inputs
pub fn score_inputs(inputs: &ScoreInputs, weights: &ScoringWeights) -> f64 {
    let availability = inputs
        .availability_minutes
        .unwrap_or(weights.default_availability_minutes) as f64;
    let price = inputs
        .price
        .filter(|p| p.is_finite())
        .unwrap_or(weights.default_price);
    let rating = inputs
        .rating
        .filter(|r| r.is_finite())
        .unwrap_or(weights.default_rating);

    weights.availability * availability + weights.price * price - weights.rating * rating
}

/// Score an offer as advertised
pub fn score(offer: &Offer, weights: &ScoringWeights) -> f64 {
    score_inputs(&ScoreInputs::from_offer(offer), weights)
}

/// Sort offers best-first. Equal scores keep their discovery order.
pub fn rank(offers: &mut [Offer], weights: &ScoringWeights) {
    let mut keyed: Vec<(f64, Offer)> = offers
        .iter()
        .map(|offer| (score(offer, weights), offer.clone()))
        .collect();
    // `sort_by` is stable
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

    for (slot, (_, offer)) in offers.iter_mut().zip(keyed) {
        *slot = offer;
    }
}

/// Rank a copy of `offers`, paired with their scores
pub fn ranked(offers: &[Offer], weights: &ScoringWeights) -> Vec<(Offer, f64)> {
    let mut sorted = offers.to_vec();
    rank(&mut sorted, weights);
    sorted
        .into_iter()
        .map(|offer| {
            let s = score(&offer, weights);
            (offer, s)
        })
        .collect()
}
