//! Read commands: `markets`, `series` and `alerts`.

use anyhow::Result;
use clap::Args;
use positioning_core::AppConfig;
use positioning_data::{Alert, AlertStore, Market, MarketRegistry, SeriesPoint, TimeSeriesStore};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{find_market, with_store};

/// Arguments for the series command.
#[derive(Args, Debug, Clone)]
pub struct SeriesArgs {
    /// Market name or symbol
    #[arg(long)]
    pub market: String,

    /// Only print the most recent N dates
    #[arg(long)]
    pub limit: Option<usize>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the alerts command.
#[derive(Args, Debug, Clone)]
pub struct AlertsArgs {
    /// Market name or symbol
    #[arg(long)]
    pub market: String,

    /// Maximum number of alerts, newest first
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// One row of the merged series as printed.
#[derive(Debug, Serialize)]
struct SeriesRow {
    date: String,
    price: Option<Decimal>,
    large_spec_net: Option<i64>,
    commercial_net: Option<i64>,
    small_spec_net: Option<i64>,
}

impl From<&SeriesPoint> for SeriesRow {
    fn from(point: &SeriesPoint) -> Self {
        Self {
            date: point.date.format("%Y-%m-%d").to_string(),
            price: point.price,
            large_spec_net: point.report.map(|r| r.large_spec_net()),
            commercial_net: point.report.map(|r| r.commercial_net()),
            small_spec_net: point.report.map(|r| r.small_spec_net()),
        }
    }
}

fn format_opt<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn print_markets(markets: &[Market]) {
    println!("{:>5}  {:<8}  {:<14}  NAME", "ID", "SYMBOL", "CLASS");
    for market in markets {
        println!(
            "{:>5}  {:<8}  {:<14}  {}",
            market.id,
            market.symbol,
            market.asset_class.as_deref().unwrap_or("-"),
            market.name
        );
    }
}

fn print_series(market: &Market, rows: &[SeriesRow]) {
    println!("{} ({})", market.name, market.symbol);
    println!(
        "{:<10}  {:>14}  {:>12}  {:>12}  {:>12}",
        "DATE", "PRICE", "LARGE SPEC", "COMMERCIAL", "SMALL SPEC"
    );
    for row in rows {
        println!(
            "{:<10}  {:>14}  {:>12}  {:>12}  {:>12}",
            row.date,
            format_opt(row.price),
            format_opt(row.large_spec_net),
            format_opt(row.commercial_net),
            format_opt(row.small_spec_net)
        );
    }
}

fn print_alerts(market: &Market, alerts: &[Alert]) {
    if alerts.is_empty() {
        println!("No alerts for {}", market.name);
        return;
    }
    for alert in alerts {
        println!(
            "{}  {:<17}  {}",
            alert.timestamp.format("%Y-%m-%d %H:%M"),
            alert.kind.as_str(),
            alert.message
        );
    }
}

/// Lists every market with its symbol and asset class.
///
/// # Errors
/// Returns an error if the database is unreachable.
pub async fn run_markets(config: &AppConfig) -> Result<()> {
    with_store(config, |store| async move {
        let markets = store.list_markets().await?;
        print_markets(&markets);
        Ok(())
    })
    .await
}

/// Prints prices and positioning joined by date.
///
/// # Errors
/// Returns an error if the database is unreachable or the market is unknown.
pub async fn run_series(config: &AppConfig, args: SeriesArgs) -> Result<()> {
    with_store(config, |store| async move {
        let market = find_market(store.as_ref(), &args.market).await?;
        let series = store.merged_series(market.id).await?;
        let skip = args
            .limit
            .map_or(0, |limit| series.len().saturating_sub(limit));
        let rows: Vec<SeriesRow> = series.iter().skip(skip).map(SeriesRow::from).collect();

        if args.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        } else {
            print_series(&market, &rows);
        }
        Ok(())
    })
    .await
}

/// Prints alert history for a market, newest first.
///
/// # Errors
/// Returns an error if the database is unreachable or the market is unknown.
pub async fn run_alerts(config: &AppConfig, args: AlertsArgs) -> Result<()> {
    with_store(config, |store| async move {
        let market = find_market(store.as_ref(), &args.market).await?;
        let alerts = store.alert_history(market.id, args.limit).await?;

        if args.json {
            println!("{}", serde_json::to_string_pretty(&alerts)?);
        } else {
            print_alerts(&market, &alerts);
        }
        Ok(())
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use positioning_data::PositionCounts;
    use rust_decimal_macros::dec;

    #[test]
    fn test_series_row_from_point() {
        let point = SeriesPoint {
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            price: Some(dec!(2126.3)),
            report: Some(PositionCounts {
                commercial_long: 10,
                commercial_short: 30,
                large_spec_long: 50,
                large_spec_short: 20,
                small_spec_long: 5,
                small_spec_short: 15,
            }),
        };

        let row = SeriesRow::from(&point);

        assert_eq!(row.date, "2024-03-05");
        assert_eq!(row.price, Some(dec!(2126.3)));
        assert_eq!(row.large_spec_net, Some(30));
        assert_eq!(row.commercial_net, Some(-20));
        assert_eq!(row.small_spec_net, Some(-10));
    }

    #[test]
    fn test_series_row_without_report() {
        let point = SeriesPoint {
            date: NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(),
            price: Some(dec!(2150)),
            report: None,
        };

        let row = SeriesRow::from(&point);

        assert!(row.large_spec_net.is_none());
        assert_eq!(format_opt(row.large_spec_net), "-");
        assert_eq!(format_opt(row.price), "2150");
    }
}
