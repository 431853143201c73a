//! Haggle
//!
//! Concurrent multi-vendor negotiation for local service offers.
//!
//! - `search`: turns a free-text query into ranked, normalized offers
//! - `scoring`: the weighted offer score used for ranking and best-deal selection
//! - `selection`: the user's locked-during-run offer selection
//! - `negotiation`: the per-offer phase machine and the run orchestrator

pub mod cli;
pub mod config;
pub mod error;
pub mod negotiation;
pub mod scoring;
pub mod search;
pub mod selection;
pub mod types;

pub use config::{NegotiatorConfig, OutcomePolicy, PhaseTiming, ScoringWeights};
pub use error::{HaggleError, Result};
pub use negotiation::{
    NegotiationObjectives, NegotiationOutcome, Orchestrator, OutcomeGenerator, Phase,
    ProgressEvent, RunHandle, RunResult, RunStatus, SimulatedNegotiator,
};
pub use search::{search_offers, CatalogProvider, Listing, SearchProvider};
pub use selection::SelectionState;
pub use types::{Currency, Offer, OfferId, Price, VendorRef};
