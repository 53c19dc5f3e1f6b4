//! Alert evaluation command.

use anyhow::Result;
use clap::Args;
use positioning_core::{AppConfig, MarketId};
use positioning_data::MarketRegistry;
use positioning_signals::AlertEngine;

use super::{find_market, print_report, with_store};

/// Arguments for the evaluate command.
#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Market name or symbol (defaults to every market)
    #[arg(long)]
    pub market: Option<String>,
}

/// Runs the evaluate command.
///
/// # Errors
/// Returns an error if the database is unreachable or the market is unknown.
pub async fn run_evaluate(config: &AppConfig, args: EvaluateArgs) -> Result<()> {
    with_store(config, |store| async move {
        let market_ids: Vec<MarketId> = match &args.market {
            Some(query) => vec![find_market(store.as_ref(), query).await?.id],
            None => store
                .list_markets()
                .await?
                .into_iter()
                .map(|m| m.id)
                .collect(),
        };

        let engine = AlertEngine::new(store, config.alerts.clone());
        let report = engine.evaluate_all(&market_ids).await;
        print_report(&report);
        Ok(())
    })
    .await
}
