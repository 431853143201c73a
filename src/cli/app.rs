//! Haggle application wiring search, selection and negotiation together

use crate::config::NegotiatorConfig;
use crate::error::{HaggleError, Result};
use crate::negotiation::{
    NegotiationObjectives, NegotiationOutcome, Orchestrator, OutcomeGenerator, RunHandle,
    RunStatus, SimulatedNegotiator,
};
use crate::scoring;
use crate::search::{search_offers, CatalogProvider, SearchProvider};
use crate::selection::SelectionState;
use crate::types::{Currency, Offer, OfferId, Price};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Presentation-side state: the current results, the user's selection and
/// the negotiation orchestrator
#[derive(Clone)]
pub struct HaggleApp {
    config: NegotiatorConfig,
    provider: Arc<dyn SearchProvider>,
    orchestrator: Orchestrator,
    results: Arc<Mutex<Vec<Offer>>>,
    selection: Arc<Mutex<SelectionState>>,
}

impl HaggleApp {
    /// Application over the built-in catalog and the simulated negotiator
    pub fn new(config: NegotiatorConfig) -> Result<Self> {
        config.validate()?;
        let generator = Arc::new(SimulatedNegotiator::new(config.outcome.clone()));
        Ok(Self::with_parts(config, Arc::new(CatalogProvider::new()), generator))
    }

    pub fn with_parts(
        config: NegotiatorConfig,
        provider: Arc<dyn SearchProvider>,
        generator: Arc<dyn OutcomeGenerator>,
    ) -> Self {
        let orchestrator = Orchestrator::new(generator, &config);
        Self {
            config,
            provider,
            orchestrator,
            results: Arc::new(Mutex::new(Vec::new())),
            selection: Arc::new(Mutex::new(SelectionState::new())),
        }
    }

    pub fn config(&self) -> &NegotiatorConfig {
        &self.config
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Run a new search. Supersedes the current results, selection and run.
    pub async fn search(&self, query: &str) -> Result<Vec<Offer>> {
        let offers = search_offers(self.provider.as_ref(), query, &self.config.scoring).await?;

        self.orchestrator.reset_run().await;
        {
            let mut selection = self.selection.lock().await;
            selection.unlock();
            selection.clear()?;
        }
        *self.results.lock().await = offers.clone();

        tracing::info!("Search '{}' found {} offers", query.trim(), offers.len());
        Ok(offers)
    }

    pub async fn suggestions(&self, query: &str) -> Vec<String> {
        self.provider.suggestions(query).await
    }

    /// Current results with their scores, best first
    pub async fn scored_results(&self) -> Vec<(Offer, f64)> {
        let results = self.results.lock().await;
        results
            .iter()
            .map(|offer| (offer.clone(), scoring::score(offer, &self.config.scoring)))
            .collect()
    }

    /// Toggle selection of one of the current results
    pub async fn toggle(&self, id: &OfferId) -> Result<bool> {
        let offer = self.result_offer(id).await?;
        self.selection.lock().await.toggle(&offer)
    }

    /// Select one of the current results; selecting it again is a no-op
    pub async fn select(&self, id: &OfferId) -> Result<()> {
        let offer = self.result_offer(id).await?;
        self.selection.lock().await.add(offer)
    }

    async fn result_offer(&self, id: &OfferId) -> Result<Offer> {
        self.results
            .lock()
            .await
            .iter()
            .find(|o| &o.id == id)
            .cloned()
            .ok_or_else(|| HaggleError::OfferNotFound(id.0.clone()))
    }

    pub async fn selected(&self) -> Vec<Offer> {
        self.selection.lock().await.snapshot()
    }

    pub async fn selection_locked(&self) -> bool {
        self.selection.lock().await.is_locked()
    }

    /// Freeze the selection and negotiate over it
    pub async fn negotiate(&self, objectives: NegotiationObjectives) -> Result<RunHandle> {
        let offers = {
            let mut selection = self.selection.lock().await;
            if selection.is_locked() {
                return Err(HaggleError::RunAlreadyActive);
            }
            selection.lock();
            selection.snapshot()
        };

        match self.orchestrator.start_run(offers, objectives).await {
            Ok(handle) => Ok(handle),
            Err(e) => {
                self.selection.lock().await.unlock();
                Err(e)
            }
        }
    }

    /// Discard the run and re-enable selection
    pub async fn reset(&self) {
        self.orchestrator.reset_run().await;
        self.selection.lock().await.unlock();
    }

    /// Multi-line summary of the current run
    pub async fn status_report(&self) -> String {
        let status = self.orchestrator.status().await;
        let mut lines = vec![format!("Status: {:?}", status)];

        for event in self.orchestrator.snapshot().await {
            lines.push(format!("  {}: {}", event.offer_id, event.phase.describe()));
        }

        if status == RunStatus::AllComplete {
            let offers = self.orchestrator.run_offers().await;
            match self.orchestrator.result().await.and_then(|r| r.best_outcome) {
                Some(best) => {
                    let currency = offers
                        .iter()
                        .find(|o| o.id == best.offer_id)
                        .and_then(|o| o.price.currency);
                    lines.push(format!("Best deal: {}", describe_outcome(&best, currency)));
                }
                None => lines.push("No vendor agreed to better terms".to_string()),
            }
        }

        lines.join("\n")
    }
}

/// One-line description of an outcome, pricing it in the offer's currency
pub fn describe_outcome(outcome: &NegotiationOutcome, currency: Option<Currency>) -> String {
    let mut line = format!(
        "{} [{}] {}",
        outcome.vendor.name,
        if outcome.success { "Success" } else { "Failed" },
        outcome.message
    );
    if let Some(price) = outcome.final_price {
        line.push_str(&format!(" (final price {})", Price::from_amount(price, currency)));
    }
    line
}
