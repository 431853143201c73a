//! Haggle CLI binary

use anyhow::Context;
use clap::Parser;
use haggle::cli::{describe_outcome, Cli, Commands, HaggleApp};
use haggle::{NegotiationObjectives, NegotiatorConfig, OfferId};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = NegotiatorConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        Commands::Search { query } => {
            let app = HaggleApp::new(config)?;
            app.search(&query).await?;

            let results = app.scored_results().await;
            if results.is_empty() {
                println!("No offers found for '{}'", query.trim());
            }
            for (offer, score) in results {
                println!(
                    "{:<4} {:<40} {:<20} {:>8} score {:.1}",
                    offer.id.as_str(),
                    offer.title,
                    offer.price.label,
                    offer
                        .availability_minutes
                        .map(|m| format!("{} min", m))
                        .unwrap_or_else(|| "-".to_string()),
                    score
                );
            }
        }

        Commands::Suggest { query } => {
            let app = HaggleApp::new(config)?;
            for suggestion in app.suggestions(&query).await {
                println!("{}", suggestion);
            }
        }

        Commands::Negotiate {
            query,
            select,
            objectives,
            seed,
            json,
        } => {
            if seed.is_some() {
                config.outcome.seed = seed;
            }
            let app = HaggleApp::new(config)?;

            let offers = app.search(&query).await?;
            tracing::info!("Found {} offers for '{}'", offers.len(), query.trim());

            for id in &select {
                app.select(&OfferId::new(id.trim()))
                    .await
                    .with_context(|| format!("cannot select offer '{}'", id))?;
            }

            let objectives = NegotiationObjectives::from(objectives);
            let mut handle = app.negotiate(objectives).await?;

            while let Some(event) = handle.next_progress().await {
                if !json {
                    println!("[{}] {}", event.offer_id, event.phase.describe());
                }
            }

            let result = handle.finish().await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            let selected = app.selected().await;
            println!();
            for offer in &selected {
                if let Some(outcome) = result.all_outcomes.get(&offer.id) {
                    println!("{}", describe_outcome(outcome, offer.price.currency));
                }
            }

            println!();
            match &result.best_outcome {
                Some(best) => {
                    let currency = selected
                        .iter()
                        .find(|o| o.id == best.offer_id)
                        .and_then(|o| o.price.currency);
                    println!("Best deal: {}", describe_outcome(best, currency));
                }
                None => println!("No vendor agreed to better terms"),
            }
        }
    }

    Ok(())
}
