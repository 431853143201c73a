//! CLI command definitions

use crate::negotiation::NegotiationObjectives;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "haggle")]
#[command(about = "Haggle - negotiate with several local vendors at once", long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search for offers and list them best first
    Search {
        /// Free-text query (at least 3 characters)
        query: String,
    },

    /// Suggest refinements for a query
    Suggest {
        query: String,
    },

    /// Search, select offers and negotiate with all of them at once
    Negotiate {
        /// Free-text query (at least 3 characters)
        query: String,

        /// Offer ids to negotiate over
        #[arg(short, long = "select", value_delimiter = ',', required = true)]
        select: Vec<String>,

        #[command(flatten)]
        objectives: ObjectiveArgs,

        /// Seed for the simulated negotiation backend
        #[arg(long)]
        seed: Option<u64>,

        /// Print the final result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone, Copy)]
pub struct ObjectiveArgs {
    /// Negotiate for an earlier service time
    #[arg(short, long)]
    pub availability: bool,

    /// Negotiate for a better price
    #[arg(short, long)]
    pub discount: bool,

    /// Ask for complimentary extra services
    #[arg(short, long)]
    pub extras: bool,
}

impl From<ObjectiveArgs> for NegotiationObjectives {
    fn from(args: ObjectiveArgs) -> Self {
        Self {
            earlier_availability: args.availability,
            discount: args.discount,
            extra_services: args.extras,
        }
    }
}
