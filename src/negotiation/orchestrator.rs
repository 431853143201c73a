//! Negotiation orchestrator drives one task per selected offer
//!
//! A run's tasks are polled together inside a single spawned driver, so they
//! interleave at their delay and generator suspension points without running
//! in parallel. Every transition is applied under the run lock and only if
//! the run generation it was scheduled under is still the active one; a
//! reset (or a newer run) turns any late transition into a counted no-op.

use crate::config::{NegotiatorConfig, PhaseTiming, ScoringWeights};
use crate::error::{HaggleError, Result};
use crate::scoring::{score_inputs, ScoreInputs};
use crate::selection::dedupe;
use crate::types::{Offer, OfferId};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};

use super::generator::OutcomeGenerator;
use super::task::NegotiationTask;
use super::types::{
    NegotiationObjectives, NegotiationOutcome, Phase, ProgressEvent, RunResult, RunStatus,
};

/// Caller's side of a started run
#[derive(Debug)]
pub struct RunHandle {
    run_id: u64,
    progress: mpsc::UnboundedReceiver<ProgressEvent>,
    result: oneshot::Receiver<RunResult>,
}

impl RunHandle {
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Next progress event; `None` once the run completed or was reset
    pub async fn next_progress(&mut self) -> Option<ProgressEvent> {
        self.progress.recv().await
    }

    /// Wait for the terminal result, discarding any unread progress
    pub async fn finish(self) -> Result<RunResult> {
        self.result.await.map_err(|_| HaggleError::RunReset)
    }

    /// Drain the progress stream, then wait for the terminal result
    pub async fn collect(mut self) -> Result<(Vec<ProgressEvent>, RunResult)> {
        let mut events = Vec::new();
        while let Some(event) = self.next_progress().await {
            events.push(event);
        }
        let result = self.finish().await?;
        Ok((events, result))
    }
}

/// State of the one run that may exist at a time
struct ActiveRun {
    generation: u64,
    offers: Vec<Offer>,
    objectives: NegotiationObjectives,
    tasks: HashMap<OfferId, NegotiationTask>,
    status: RunStatus,
    best: Option<OfferId>,
    progress_tx: Option<mpsc::UnboundedSender<ProgressEvent>>,
    result_tx: Option<oneshot::Sender<RunResult>>,
}

impl ActiveRun {
    fn emit(&self, offer_id: &OfferId, phase: Phase) {
        if let Some(tx) = &self.progress_tx {
            // The caller may have dropped its handle; the run carries on regardless
            let _ = tx.send(ProgressEvent {
                offer_id: offer_id.clone(),
                phase,
            });
        }
    }

    fn all_complete(&self) -> bool {
        self.tasks.values().all(|t| t.is_complete())
    }

    fn outcomes(&self) -> HashMap<OfferId, NegotiationOutcome> {
        self.tasks
            .iter()
            .filter_map(|(id, task)| task.outcome().map(|o| (id.clone(), o.clone())))
            .collect()
    }
}

#[derive(Default)]
struct RunSlot {
    active: Option<ActiveRun>,
}

/// Concurrent multi-vendor negotiation orchestrator
#[derive(Clone)]
pub struct Orchestrator {
    slot: Arc<Mutex<RunSlot>>,
    generator: Arc<dyn OutcomeGenerator>,
    timing: PhaseTiming,
    weights: ScoringWeights,
    generation: Arc<AtomicU64>,
    dropped: Arc<AtomicU64>,
}

impl Orchestrator {
    /// Create an orchestrator around an outcome generator
    pub fn new(generator: Arc<dyn OutcomeGenerator>, config: &NegotiatorConfig) -> Self {
        Self {
            slot: Arc::new(Mutex::new(RunSlot::default())),
            generator,
            timing: config.timing.clone(),
            weights: config.scoring.clone(),
            generation: Arc::new(AtomicU64::new(0)),
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start negotiating every offer in `offers` at once.
    ///
    /// Rejected without side effects when `offers` is empty, no objective is
    /// set, or a run (running or complete but not yet reset) already exists.
    pub async fn start_run(
        &self,
        offers: Vec<Offer>,
        objectives: NegotiationObjectives,
    ) -> Result<RunHandle> {
        if offers.is_empty() {
            return Err(HaggleError::EmptySelection);
        }
        if !objectives.any() {
            return Err(HaggleError::NoObjectives);
        }

        // One task per id; the frozen list must agree with the task map
        let offers = dedupe(offers);

        let mut slot = self.slot.lock().await;
        if slot.active.is_some() {
            return Err(HaggleError::RunAlreadyActive);
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = oneshot::channel();

        let tasks = offers
            .iter()
            .enumerate()
            .map(|(index, offer)| (offer.id.clone(), NegotiationTask::new(offer.id.clone(), index)))
            .collect();

        slot.active = Some(ActiveRun {
            generation,
            offers: offers.clone(),
            objectives,
            tasks,
            status: RunStatus::Running,
            best: None,
            progress_tx: Some(progress_tx),
            result_tx: Some(result_tx),
        });
        drop(slot);

        tracing::info!(
            "Starting negotiation run {} with {} vendors",
            generation,
            offers.len()
        );

        let driver = self.clone();
        tokio::spawn(async move {
            driver.drive_run(generation, offers, objectives).await;
        });

        Ok(RunHandle {
            run_id: generation,
            progress: progress_rx,
            result: result_rx,
        })
    }

    /// Discard the current run, if any. In-flight work of the discarded run
    /// is ignored when it eventually resumes.
    pub async fn reset_run(&self) {
        let mut slot = self.slot.lock().await;
        if let Some(run) = slot.active.take() {
            // Invalidate the run's generation before anything else can observe it
            self.generation.fetch_add(1, Ordering::SeqCst);
            tracing::info!(
                "Reset negotiation run {} ({:?}, {} tasks)",
                run.generation,
                run.status,
                run.tasks.len()
            );
        }
    }

    pub async fn status(&self) -> RunStatus {
        self.slot
            .lock()
            .await
            .active
            .as_ref()
            .map(|run| run.status)
            .unwrap_or(RunStatus::Idle)
    }

    /// Current phase of every task, in selection order
    pub async fn snapshot(&self) -> Vec<ProgressEvent> {
        let slot = self.slot.lock().await;
        let Some(run) = slot.active.as_ref() else {
            return Vec::new();
        };

        run.offers
            .iter()
            .filter_map(|offer| run.tasks.get(&offer.id))
            .map(|task| ProgressEvent {
                offer_id: task.offer_id().clone(),
                phase: task.phase(),
            })
            .collect()
    }

    /// Offers frozen into the current run
    pub async fn run_offers(&self) -> Vec<Offer> {
        self.slot
            .lock()
            .await
            .active
            .as_ref()
            .map(|run| run.offers.clone())
            .unwrap_or_default()
    }

    pub async fn objectives(&self) -> Option<NegotiationObjectives> {
        self.slot.lock().await.active.as_ref().map(|run| run.objectives)
    }

    /// Result of the current run once every task is complete
    pub async fn result(&self) -> Option<RunResult> {
        let slot = self.slot.lock().await;
        let run = slot.active.as_ref()?;
        if run.status != RunStatus::AllComplete {
            return None;
        }
        Some(self.build_result(run))
    }

    /// Transitions discarded because their run had been reset or superseded
    pub fn dropped_transitions(&self) -> u64 {
        self.dropped.load(Ordering::SeqCst)
    }

    async fn drive_run(&self, generation: u64, offers: Vec<Offer>, objectives: NegotiationObjectives) {
        let tasks = offers
            .iter()
            .enumerate()
            .map(|(index, offer)| self.drive_task(generation, index, offer, &objectives));
        join_all(tasks).await;

        self.finish_run(generation).await;
    }

    async fn drive_task(
        &self,
        generation: u64,
        index: usize,
        offer: &Offer,
        objectives: &NegotiationObjectives,
    ) {
        if !self.advance(generation, &offer.id, Phase::SentOffer).await {
            return;
        }

        tokio::time::sleep(self.timing.review_delay(index)).await;
        if !self.advance(generation, &offer.id, Phase::VendorReviewing).await {
            return;
        }

        tokio::time::sleep(self.timing.counter_delay(index)).await;
        if !self.advance(generation, &offer.id, Phase::CounterOffering).await {
            return;
        }

        tokio::time::sleep(self.timing.closing_delay()).await;
        // A discarded run must not reach the backend
        if !self.is_current(generation) {
            self.record_stale(generation, &offer.id, Phase::Complete);
            return;
        }

        let outcome = self.negotiate_offer(offer, objectives).await;
        self.complete(generation, &offer.id, outcome).await;
    }

    /// Call the generator, folding errors and timeouts into a failed outcome
    async fn negotiate_offer(&self, offer: &Offer, objectives: &NegotiationObjectives) -> NegotiationOutcome {
        let call = self.generator.negotiate(offer, objectives);
        let result = match tokio::time::timeout(self.timing.outcome_timeout(), call).await {
            Ok(result) => result,
            Err(_) => Err(HaggleError::BackendTimeout(format!(
                "no answer from {} within {:?}",
                offer.vendor.name,
                self.timing.outcome_timeout()
            ))),
        };

        match result {
            Ok(mut outcome) => {
                // The outcome belongs to this offer whatever the backend filled in
                outcome.offer_id = offer.id.clone();
                outcome.vendor = offer.vendor.clone();
                if outcome.message.is_empty() {
                    outcome.message = if outcome.success {
                        "Negotiation completed".to_string()
                    } else {
                        "Negotiation failed".to_string()
                    };
                }
                outcome
            }
            Err(e) => {
                tracing::warn!("Negotiation with {} failed: {}", offer.vendor.name, e);
                NegotiationOutcome::failure(offer.id.clone(), offer.vendor.clone(), e.to_string())
            }
        }
    }

    /// Apply a non-terminal phase transition. Returns false when the run is gone.
    async fn advance(&self, generation: u64, offer_id: &OfferId, phase: Phase) -> bool {
        let mut slot = self.slot.lock().await;
        let Some(run) = Self::current(&mut slot, generation) else {
            self.record_stale(generation, offer_id, phase);
            return false;
        };

        let Some(task) = run.tasks.get_mut(offer_id) else {
            tracing::error!("Run {} has no task for offer {}", generation, offer_id);
            return false;
        };

        if let Err(e) = task.advance(phase) {
            tracing::error!("Task {} rejected transition: {}", offer_id, e);
            return false;
        }

        tracing::debug!("Run {}: {} -> {}", generation, offer_id, phase);
        run.emit(offer_id, phase);
        true
    }

    async fn complete(&self, generation: u64, offer_id: &OfferId, outcome: NegotiationOutcome) {
        let mut slot = self.slot.lock().await;
        let Some(run) = Self::current(&mut slot, generation) else {
            self.record_stale(generation, offer_id, Phase::Complete);
            return;
        };

        let Some(task) = run.tasks.get_mut(offer_id) else {
            tracing::error!("Run {} has no task for offer {}", generation, offer_id);
            return;
        };

        let success = outcome.success;
        if let Err(e) = task.complete(outcome) {
            tracing::error!("Task {} rejected completion: {}", offer_id, e);
            return;
        }

        tracing::debug!(
            "Run {}: {} -> {} (success: {})",
            generation,
            offer_id,
            Phase::Complete,
            success
        );
        run.emit(offer_id, Phase::Complete);
    }

    /// Mark the run complete, pick the best outcome and publish the result
    async fn finish_run(&self, generation: u64) {
        let mut slot = self.slot.lock().await;
        let Some(run) = Self::current(&mut slot, generation) else {
            return;
        };

        if !run.all_complete() {
            // Only reachable if a task bailed out on an internal error
            tracing::error!("Run {} finished with incomplete tasks", generation);
            return;
        }

        run.best = self.select_best(run);
        run.status = RunStatus::AllComplete;

        let result = self.build_result(run);
        match &result.best_outcome {
            Some(best) => tracing::info!(
                "Run {} complete: {}/{} succeeded, best deal from {}",
                generation,
                result.successes(),
                result.all_outcomes.len(),
                best.vendor.name
            ),
            None => tracing::info!(
                "Run {} complete: no vendor agreed to better terms",
                generation
            ),
        }

        if let Some(tx) = run.result_tx.take() {
            let _ = tx.send(result);
        }
        // Closing the sender ends the progress stream
        run.progress_tx = None;
    }

    /// Among successful outcomes, the one whose negotiated terms score lowest.
    /// Ties keep selection order.
    fn select_best(&self, run: &ActiveRun) -> Option<OfferId> {
        let mut best: Option<(f64, &OfferId)> = None;

        for offer in &run.offers {
            let Some(outcome) = run.tasks.get(&offer.id).and_then(|t| t.outcome()) else {
                continue;
            };
            if !outcome.success {
                continue;
            }

            let score = score_inputs(&negotiated_inputs(offer, outcome), &self.weights);
            if best.map_or(true, |(current, _)| score < current) {
                best = Some((score, &offer.id));
            }
        }

        best.map(|(_, id)| id.clone())
    }

    fn build_result(&self, run: &ActiveRun) -> RunResult {
        let all_outcomes = run.outcomes();
        let best_outcome = run
            .best
            .as_ref()
            .and_then(|id| all_outcomes.get(id))
            .cloned();

        RunResult {
            run_id: run.generation,
            best_outcome,
            all_outcomes,
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn current(slot: &mut RunSlot, generation: u64) -> Option<&mut ActiveRun> {
        slot.active
            .as_mut()
            .filter(|run| run.generation == generation)
    }

    fn record_stale(&self, generation: u64, offer_id: &OfferId, phase: Phase) {
        self.dropped.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            "Dropped stale transition {} -> {} from run {}",
            offer_id,
            phase,
            generation
        );
    }
}

/// Score inputs after applying negotiated terms over the advertised ones
pub fn negotiated_inputs(offer: &Offer, outcome: &NegotiationOutcome) -> ScoreInputs {
    ScoreInputs {
        availability_minutes: outcome
            .negotiated_availability
            .or(offer.availability_minutes),
        price: outcome.final_price.or(offer.price.amount),
        rating: offer.rating,
    }
}
