//! COT column normalisation and row parsing.
//!
//! The annual archive uses headers such as `"Commercial Positions-Long (All)"`.
//! Headers are normalised to identifiers (`Commercial_Positions_Long_All`)
//! before any field is read.

use chrono::NaiveDate;
use positioning_core::{PositioningError, RawCotRow, Result};
use positioning_data::PositionCounts;

/// Normalised column names read from the legacy futures-only report.
pub mod columns {
    pub const MARKET_NAME: &str = "Market_and_Exchange_Names";
    pub const CONTRACT_CODE: &str = "CFTC_Contract_Market_Code";
    pub const REPORT_DATE: &str = "As_of_Date_in_Form_YYYY_MM_DD";
    pub const COMMERCIAL_LONG: &str = "Commercial_Positions_Long_All";
    pub const COMMERCIAL_SHORT: &str = "Commercial_Positions_Short_All";
    pub const LARGE_SPEC_LONG: &str = "Noncommercial_Positions_Long_All";
    pub const LARGE_SPEC_SHORT: &str = "Noncommercial_Positions_Short_All";
    pub const SMALL_SPEC_LONG: &str = "Nonreportable_Positions_Long_All";
    pub const SMALL_SPEC_SHORT: &str = "Nonreportable_Positions_Short_All";
}

/// Trims a header, collapses every run of characters other than ASCII
/// alphanumerics and `_` into one `_`, and strips leading and trailing `_`.
#[must_use]
pub fn normalize_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_run = false;

    for c in raw.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }

    out.trim_matches('_').to_string()
}

/// A validated report row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CotRecord {
    /// Verbose market and exchange name, trimmed.
    pub market_name: String,
    pub contract_code: Option<String>,
    pub report_date: NaiveDate,
    pub counts: PositionCounts,
}

impl TryFrom<&RawCotRow> for CotRecord {
    type Error = PositioningError;

    fn try_from(row: &RawCotRow) -> Result<Self> {
        let market_name = required(row, columns::MARKET_NAME)?.to_string();
        let report_date = parse_date(required(row, columns::REPORT_DATE)?)?;

        Ok(Self {
            market_name,
            contract_code: row.get(columns::CONTRACT_CODE).map(str::to_string),
            report_date,
            counts: PositionCounts {
                commercial_long: count(row, columns::COMMERCIAL_LONG)?,
                commercial_short: count(row, columns::COMMERCIAL_SHORT)?,
                large_spec_long: count(row, columns::LARGE_SPEC_LONG)?,
                large_spec_short: count(row, columns::LARGE_SPEC_SHORT)?,
                small_spec_long: count(row, columns::SMALL_SPEC_LONG)?,
                small_spec_short: count(row, columns::SMALL_SPEC_SHORT)?,
            },
        })
    }
}

fn required<'a>(row: &'a RawCotRow, column: &str) -> Result<&'a str> {
    row.get(column)
        .ok_or_else(|| PositioningError::validation(format!("missing {column}")))
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| PositioningError::validation(format!("invalid report date '{value}': {e}")))
}

/// Contract counts are integers, sometimes with thousands separators.
fn count(row: &RawCotRow, column: &str) -> Result<i64> {
    let raw = required(row, column)?;
    raw.replace(',', "")
        .parse::<i64>()
        .map_err(|_| PositioningError::validation(format!("invalid {column} '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gold_row() -> RawCotRow {
        let mut row = RawCotRow::default();
        row.insert(columns::MARKET_NAME, "GOLD - COMMODITY EXCHANGE INC.  ");
        row.insert(columns::CONTRACT_CODE, " 088691");
        row.insert(columns::REPORT_DATE, "2024-03-05");
        row.insert(columns::COMMERCIAL_LONG, "50123");
        row.insert(columns::COMMERCIAL_SHORT, "250,456");
        row.insert(columns::LARGE_SPEC_LONG, "280000");
        row.insert(columns::LARGE_SPEC_SHORT, "60000");
        row.insert(columns::SMALL_SPEC_LONG, "40000");
        row.insert(columns::SMALL_SPEC_SHORT, "59667");
        row
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(
            normalize_header("Market and Exchange Names"),
            "Market_and_Exchange_Names"
        );
        assert_eq!(
            normalize_header("As of Date in Form YYYY-MM-DD"),
            "As_of_Date_in_Form_YYYY_MM_DD"
        );
        assert_eq!(
            normalize_header("  Commercial Positions-Long (All) "),
            "Commercial_Positions_Long_All"
        );
        assert_eq!(
            normalize_header("Noncommercial Positions-Short (All)"),
            "Noncommercial_Positions_Short_All"
        );
        assert_eq!(normalize_header("Already_Clean"), "Already_Clean");
        assert_eq!(normalize_header("%  OI-Long__(All)"), "OI_Long___All");
    }

    #[test]
    fn test_parse_row() {
        let record = CotRecord::try_from(&gold_row()).unwrap();

        assert_eq!(record.market_name, "GOLD - COMMODITY EXCHANGE INC.");
        assert_eq!(record.contract_code.as_deref(), Some("088691"));
        assert_eq!(
            record.report_date,
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        assert_eq!(record.counts.commercial_short, 250_456);
        assert_eq!(record.counts.large_spec_net(), 220_000);
    }

    #[test]
    fn test_missing_field_is_validation_error() {
        let mut row = gold_row();
        row.fields.remove(columns::LARGE_SPEC_SHORT);

        let err = CotRecord::try_from(&row).unwrap_err();
        assert!(matches!(err, PositioningError::Validation(_)));
        assert!(err.to_string().contains(columns::LARGE_SPEC_SHORT));
    }

    #[test]
    fn test_unparseable_date_is_validation_error() {
        let mut row = gold_row();
        row.insert(columns::REPORT_DATE, "03/05/2024");
        assert!(matches!(
            CotRecord::try_from(&row),
            Err(PositioningError::Validation(_))
        ));
    }

    #[test]
    fn test_unparseable_count_is_validation_error() {
        let mut row = gold_row();
        row.insert(columns::COMMERCIAL_LONG, "n/a");
        assert!(matches!(
            CotRecord::try_from(&row),
            Err(PositioningError::Validation(_))
        ));
    }

    #[test]
    fn test_contract_code_is_optional() {
        let mut row = gold_row();
        row.insert(columns::CONTRACT_CODE, "   ");
        let record = CotRecord::try_from(&row).unwrap();
        assert!(record.contract_code.is_none());
    }
}
