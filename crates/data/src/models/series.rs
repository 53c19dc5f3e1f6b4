//! Merged price + positioning series served to the read API.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{PositionCounts, PositioningReport, PricePoint};

/// Price and report for one calendar date. Either side may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub price: Option<Decimal>,
    pub report: Option<PositionCounts>,
}

/// Joins prices and reports on calendar date, ascending.
///
/// When a date has several price points the latest one wins.
#[must_use]
pub fn merge_series(prices: &[PricePoint], reports: &[PositioningReport]) -> Vec<SeriesPoint> {
    let mut by_date: BTreeMap<NaiveDate, SeriesPoint> = BTreeMap::new();

    let mut sorted_prices: Vec<&PricePoint> = prices.iter().collect();
    sorted_prices.sort_by_key(|p| p.timestamp);

    for point in sorted_prices {
        let date = point.date();
        by_date
            .entry(date)
            .or_insert_with(|| SeriesPoint {
                date,
                price: None,
                report: None,
            })
            .price = Some(point.price);
    }

    for report in reports {
        by_date
            .entry(report.report_date)
            .or_insert_with(|| SeriesPoint {
                date: report.report_date,
                price: None,
                report: None,
            })
            .report = Some(report.counts);
    }

    by_date.into_values().collect()
}
