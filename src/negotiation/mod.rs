//! Multi-vendor negotiation

pub mod generator;
pub mod orchestrator;
pub mod task;
pub mod types;

pub use generator::{settle, NegotiatedTerms, OutcomeGenerator, SimulatedNegotiator};
pub use orchestrator::{negotiated_inputs, Orchestrator, RunHandle};
pub use task::NegotiationTask;
pub use types::{
    NegotiationObjectives, NegotiationOutcome, Phase, ProgressEvent, RunResult, RunStatus,
};
