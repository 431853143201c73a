//! Selection of offers to negotiate over

use crate::error::{HaggleError, Result};
use crate::types::{Offer, OfferId};
use std::collections::HashSet;

/// Drop later duplicates of an offer id; the first occurrence wins
pub fn dedupe(offers: Vec<Offer>) -> Vec<Offer> {
    let mut seen = HashSet::new();
    offers
        .into_iter()
        .filter(|offer| seen.insert(offer.id.clone()))
        .collect()
}

/// The user's chosen offers, unique by id and kept in selection order.
///
/// Locked (read-only) while a negotiation run exists, from start until the
/// run is reset.
#[derive(Clone, Debug, Default)]
pub struct SelectionState {
    offers: Vec<Offer>,
    locked: bool,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    pub fn contains(&self, id: &OfferId) -> bool {
        self.offers.iter().any(|o| &o.id == id)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Add an offer. Adding an already selected id keeps the original entry.
    pub fn add(&mut self, offer: Offer) -> Result<()> {
        self.ensure_unlocked()?;
        if !self.contains(&offer.id) {
            self.offers.push(offer);
        }
        Ok(())
    }

    /// Remove an offer, returning it if it was selected
    pub fn remove(&mut self, id: &OfferId) -> Result<Option<Offer>> {
        self.ensure_unlocked()?;
        let removed = self
            .offers
            .iter()
            .position(|o| &o.id == id)
            .map(|index| self.offers.remove(index));
        Ok(removed)
    }

    /// Select the offer if unselected, deselect it otherwise. Returns whether
    /// the offer is selected afterwards.
    pub fn toggle(&mut self, offer: &Offer) -> Result<bool> {
        if self.remove(&offer.id)?.is_some() {
            Ok(false)
        } else {
            self.add(offer.clone())?;
            Ok(true)
        }
    }

    pub fn clear(&mut self) -> Result<()> {
        self.ensure_unlocked()?;
        self.offers.clear();
        Ok(())
    }

    /// Frozen copy handed to the orchestrator
    pub fn snapshot(&self) -> Vec<Offer> {
        self.offers.clone()
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    fn ensure_unlocked(&self) -> Result<()> {
        if self.locked {
            return Err(HaggleError::SelectionLocked);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VendorRef;

    fn offer(id: &str, price: &str) -> Offer {
        Offer::new(id, id, price, VendorRef::new(id, id))
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let offers = dedupe(vec![
            offer("p1", "₹500"),
            offer("p2", "₹650"),
            offer("p1", "₹999"),
        ]);

        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].price.amount, Some(500.0));
        assert_eq!(offers[1].id, OfferId::from("p2"));
    }

    #[test]
    fn test_add_is_unique_by_id() {
        let mut selection = SelectionState::new();
        selection.add(offer("p1", "₹500")).unwrap();
        selection.add(offer("p1", "₹999")).unwrap();

        assert_eq!(selection.len(), 1);
        assert_eq!(selection.offers()[0].price.amount, Some(500.0));
    }

    #[test]
    fn test_toggle() {
        let mut selection = SelectionState::new();
        let p1 = offer("p1", "₹500");

        assert!(selection.toggle(&p1).unwrap());
        assert!(selection.contains(&p1.id));
        assert!(!selection.toggle(&p1).unwrap());
        assert!(selection.is_empty());
    }

    #[test]
    fn test_remove_missing_is_none() {
        let mut selection = SelectionState::new();
        assert!(selection.remove(&OfferId::from("nope")).unwrap().is_none());
    }

    #[test]
    fn test_locked_selection_rejects_mutation() {
        let mut selection = SelectionState::new();
        selection.add(offer("p1", "₹500")).unwrap();
        selection.lock();

        assert!(matches!(selection.add(offer("p2", "₹1")), Err(HaggleError::SelectionLocked)));
        assert!(matches!(
            selection.remove(&OfferId::from("p1")),
            Err(HaggleError::SelectionLocked)
        ));
        assert!(selection.toggle(&offer("p1", "₹500")).is_err());
        assert!(selection.clear().is_err());
        assert_eq!(selection.len(), 1);

        selection.unlock();
        assert!(selection.clear().is_ok());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut selection = SelectionState::new();
        selection.add(offer("p1", "₹500")).unwrap();
        let frozen = selection.snapshot();
        selection.add(offer("p2", "₹600")).unwrap();

        assert_eq!(frozen.len(), 1);
        assert_eq!(selection.len(), 2);
    }
}
