//! CLI module for Haggle

pub mod app;
pub mod commands;

pub use app::{describe_outcome, HaggleApp};
pub use commands::{Cli, Commands, ObjectiveArgs};
