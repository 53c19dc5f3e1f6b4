//! Static identifier tables.
//!
//! Maps vendor identifiers (CFTC market-and-exchange names, Yahoo tickers)
//! to canonical symbols, and canonical symbols to display names and asset
//! classes. Identifiers absent from these tables resolve under their raw
//! name.

use positioning_core::Source;

pub const CRYPTO: &str = "crypto";
pub const METALS: &str = "metals";
pub const ENERGY: &str = "energy";
pub const AGRICULTURE: &str = "agriculture";
pub const LIVESTOCK: &str = "livestock";
pub const EQUITY_INDEX: &str = "equity-index";
pub const CURRENCY: &str = "currency";

/// CFTC "Market and Exchange Names" → canonical symbol.
const COT_NAMES: &[(&str, &str)] = &[
    ("BITCOIN - CHICAGO MERCANTILE EXCHANGE", "BTC"),
    ("MICRO BITCOIN - CHICAGO MERCANTILE EXCHANGE", "MBTC"),
    ("Nano Bitcoin - LMX LABS LLC", "NBTC"),
    ("ETHER CASH SETTLED - CHICAGO MERCANTILE EXCHANGE", "ETH"),
    ("MICRO ETHER - CHICAGO MERCANTILE EXCHANGE", "METH"),
    ("NANO ETHER - LMX LABS LLC", "NETH"),
    ("XRP - CHICAGO MERCANTILE EXCHANGE", "XRP"),
    ("GOLD - COMMODITY EXCHANGE INC.", "XAU"),
    ("MICRO GOLD - COMMODITY EXCHANGE INC.", "MGOLD"),
    ("SILVER - COMMODITY EXCHANGE INC.", "XAG"),
    ("PLATINUM - NEW YORK MERCANTILE EXCHANGE", "XPT"),
    ("PALLADIUM - NEW YORK MERCANTILE EXCHANGE", "XPD"),
    ("COPPER- #1 - COMMODITY EXCHANGE INC.", "HG"),
    ("COBALT - COMMODITY EXCHANGE INC.", "CO"),
    ("LITHIUM HYDROXIDE - COMMODITY EXCHANGE INC.", "LI"),
    ("ALUMINUM - COMMODITY EXCHANGE INC.", "AL"),
    ("STEEL-HRC - COMMODITY EXCHANGE INC.", "HRC"),
    ("CRUDE OIL, LIGHT SWEET-WTI - ICE FUTURES EUROPE", "CL"),
    ("BRENT LAST DAY - NEW YORK MERCANTILE EXCHANGE", "BZ"),
    ("NAT GAS NYME - NEW YORK MERCANTILE EXCHANGE", "NG"),
    ("RBOB CALENDAR - NEW YORK MERCANTILE EXCHANGE", "RB"),
    ("NY HARBOR ULSD - NEW YORK MERCANTILE EXCHANGE", "HO"),
    ("CORN - CHICAGO BOARD OF TRADE", "ZC"),
    ("SOYBEANS - CHICAGO BOARD OF TRADE", "ZS"),
    ("WHEAT-HRW - CHICAGO BOARD OF TRADE", "WHRW"),
    ("WHEAT-HRSpring - MINNEAPOLIS GRAIN EXCHANGE", "WHRS"),
    ("OATS - CHICAGO BOARD OF TRADE", "ZO"),
    ("SOYBEAN MEAL - CHICAGO BOARD OF TRADE", "ZM"),
    ("SOYBEAN OIL - CHICAGO BOARD OF TRADE", "ZL"),
    ("ROUGH RICE - CHICAGO BOARD OF TRADE", "ZR"),
    ("COTTON NO. 2 - ICE FUTURES U.S.", "CT"),
    ("COFFEE C - ICE FUTURES U.S.", "KC"),
    ("COCOA - ICE FUTURES U.S.", "CC"),
    ("SUGAR NO. 11 - ICE FUTURES U.S.", "SB"),
    ("CANOLA - ICE FUTURES U.S.", "RS"),
    ("FRZN CONCENTRATED ORANGE JUICE - ICE FUTURES U.S.", "OJ"),
    ("LIVE CATTLE - CHICAGO MERCANTILE EXCHANGE", "LE"),
    ("LEAN HOGS - CHICAGO MERCANTILE EXCHANGE", "HE"),
    ("FEEDER CATTLE - CHICAGO MERCANTILE EXCHANGE", "FC"),
    ("MILK, Class III - CHICAGO MERCANTILE EXCHANGE", "MK3"),
    ("CME MILK IV - CHICAGO MERCANTILE EXCHANGE", "MK4"),
    ("DRY WHEY - CHICAGO MERCANTILE EXCHANGE", "DW"),
    ("CHEESE (CASH-SETTLED) - CHICAGO MERCANTILE EXCHANGE", "CH"),
    ("E-MINI S&P 500 - CHICAGO MERCANTILE EXCHANGE", "ES"),
    ("MICRO E-MINI S&P 500 INDEX - CHICAGO MERCANTILE EXCHANGE", "MES"),
    ("NASDAQ MINI - CHICAGO MERCANTILE EXCHANGE", "NQ"),
    ("MICRO E-MINI NASDAQ-100 INDEX - CHICAGO MERCANTILE EXCHANGE", "MNQ"),
    ("DJIA x $5 - CHICAGO BOARD OF TRADE", "YM"),
    ("MICRO E-MINI DJIA (x$0.5) - CHICAGO BOARD OF TRADE", "MYM"),
    ("RUSSELL E-MINI - CHICAGO MERCANTILE EXCHANGE", "RTY"),
    ("MICRO E-MINI RUSSELL 2000 INDX - CHICAGO MERCANTILE EXCHANGE", "M2K"),
    ("EURO FX - CHICAGO MERCANTILE EXCHANGE", "6E"),
    ("BRITISH POUND - CHICAGO MERCANTILE EXCHANGE", "6B"),
    ("JAPANESE YEN - CHICAGO MERCANTILE EXCHANGE", "6J"),
    ("SWISS FRANC - CHICAGO MERCANTILE EXCHANGE", "6S"),
    ("CANADIAN DOLLAR - CHICAGO MERCANTILE EXCHANGE", "6C"),
    ("AUSTRALIAN DOLLAR - CHICAGO MERCANTILE EXCHANGE", "6A"),
    ("MEXICAN PESO - CHICAGO MERCANTILE EXCHANGE", "6M"),
    ("BRAZILIAN REAL - CHICAGO MERCANTILE EXCHANGE", "6BR"),
    ("NZ DOLLAR - CHICAGO MERCANTILE EXCHANGE", "6N"),
    ("SO AFRICAN RAND - CHICAGO MERCANTILE EXCHANGE", "6Z"),
];

/// Yahoo Finance ticker → canonical symbol.
const YAHOO_TICKERS: &[(&str, &str)] = &[
    ("GC=F", "XAU"),
    ("SI=F", "XAG"),
    ("PL=F", "XPT"),
    ("PA=F", "XPD"),
    ("HG=F", "HG"),
    ("CL=F", "CL"),
    ("BZ=F", "BZ"),
    ("NG=F", "NG"),
    ("HO=F", "HO"),
    ("RB=F", "RB"),
    ("ZC=F", "ZC"),
    ("ZS=F", "ZS"),
    ("ZW=F", "ZW"),
    ("KC=F", "KC"),
    ("CT=F", "CT"),
    ("CC=F", "CC"),
    ("OJ=F", "OJ"),
    ("LE=F", "LE"),
    ("HE=F", "HE"),
    ("ES=F", "ES"),
    ("NQ=F", "NQ"),
    ("YM=F", "YM"),
    ("RTY=F", "RTY"),
    ("6E=F", "6E"),
    ("6B=F", "6B"),
    ("6J=F", "6J"),
    ("6S=F", "6S"),
    ("6C=F", "6C"),
    ("6A=F", "6A"),
    ("BTC-USD", "BTC"),
    ("ETH-USD", "ETH"),
    ("XRP-USD", "XRP"),
];

/// Canonical symbol → (display name, asset class).
const CANONICAL: &[(&str, &str, &str)] = &[
    ("BTC", "Bitcoin Futures (CME)", CRYPTO),
    ("MBTC", "Micro Bitcoin Futures (CME)", CRYPTO),
    ("NBTC", "Nano Bitcoin Futures (LMX)", CRYPTO),
    ("ETH", "Ethereum Futures (CME)", CRYPTO),
    ("METH", "Micro Ether Futures (CME)", CRYPTO),
    ("NETH", "Nano Ether Futures (LMX)", CRYPTO),
    ("XRP", "XRP Futures (CME)", CRYPTO),
    ("XAU", "Gold Futures (COMEX)", METALS),
    ("MGOLD", "Micro Gold Futures (COMEX)", METALS),
    ("XAG", "Silver Futures (COMEX)", METALS),
    ("XPT", "Platinum Futures (NYMEX)", METALS),
    ("XPD", "Palladium Futures (NYMEX)", METALS),
    ("HG", "Copper Futures (COMEX)", METALS),
    ("CO", "Cobalt Futures (COMEX)", METALS),
    ("LI", "Lithium Hydroxide Futures (COMEX)", METALS),
    ("AL", "Aluminum Futures (COMEX)", METALS),
    ("HRC", "Steel HRC Futures (COMEX)", METALS),
    ("CL", "Crude Oil Futures (NYMEX)", ENERGY),
    ("BZ", "Brent Crude Futures (ICE)", ENERGY),
    ("NG", "Natural Gas Futures (NYMEX)", ENERGY),
    ("HO", "Heating Oil Futures (NYMEX)", ENERGY),
    ("RB", "RBOB Gasoline Futures (NYMEX)", ENERGY),
    ("ZC", "Corn Futures (CBOT)", AGRICULTURE),
    ("ZS", "Soybean Futures (CBOT)", AGRICULTURE),
    ("ZW", "Wheat Futures (CBOT)", AGRICULTURE),
    ("WHRW", "Hard Red Winter Wheat Futures (CBOT)", AGRICULTURE),
    ("WHRS", "Hard Red Spring Wheat Futures (MGEX)", AGRICULTURE),
    ("ZO", "Oat Futures (CBOT)", AGRICULTURE),
    ("ZM", "Soybean Meal Futures (CBOT)", AGRICULTURE),
    ("ZL", "Soybean Oil Futures (CBOT)", AGRICULTURE),
    ("ZR", "Rough Rice Futures (CBOT)", AGRICULTURE),
    ("KC", "Coffee Futures (ICE)", AGRICULTURE),
    ("CT", "Cotton Futures (ICE)", AGRICULTURE),
    ("CC", "Cocoa Futures (ICE)", AGRICULTURE),
    ("SB", "Sugar No. 11 Futures (ICE)", AGRICULTURE),
    ("RS", "Canola Futures (ICE)", AGRICULTURE),
    ("OJ", "Orange Juice Futures (ICE)", AGRICULTURE),
    ("LE", "Live Cattle Futures (CME)", LIVESTOCK),
    ("HE", "Lean Hogs Futures (CME)", LIVESTOCK),
    ("FC", "Feeder Cattle Futures (CME)", LIVESTOCK),
    ("MK3", "Class III Milk Futures (CME)", LIVESTOCK),
    ("MK4", "Class IV Milk Futures (CME)", LIVESTOCK),
    ("DW", "Dry Whey Futures (CME)", LIVESTOCK),
    ("CH", "Cheese Futures (CME)", LIVESTOCK),
    ("ES", "S&P 500 Futures (CME)", EQUITY_INDEX),
    ("MES", "Micro S&P 500 Futures (CME)", EQUITY_INDEX),
    ("NQ", "Nasdaq 100 Futures (CME)", EQUITY_INDEX),
    ("MNQ", "Micro Nasdaq 100 Futures (CME)", EQUITY_INDEX),
    ("YM", "Dow Jones Futures (CBOT)", EQUITY_INDEX),
    ("MYM", "Micro Dow Jones Futures (CBOT)", EQUITY_INDEX),
    ("RTY", "Russell 2000 Futures (CME)", EQUITY_INDEX),
    ("M2K", "Micro Russell 2000 Futures (CME)", EQUITY_INDEX),
    ("6E", "Euro FX Futures (CME)", CURRENCY),
    ("6B", "British Pound Futures (CME)", CURRENCY),
    ("6J", "Japanese Yen Futures (CME)", CURRENCY),
    ("6S", "Swiss Franc Futures (CME)", CURRENCY),
    ("6C", "Canadian Dollar Futures (CME)", CURRENCY),
    ("6A", "Australian Dollar Futures (CME)", CURRENCY),
    ("6M", "Mexican Peso Futures (CME)", CURRENCY),
    ("6BR", "Brazilian Real Futures (CME)", CURRENCY),
    ("6N", "New Zealand Dollar Futures (CME)", CURRENCY),
    ("6Z", "South African Rand Futures (CME)", CURRENCY),
];

fn lookup<'a>(table: &'a [(&'a str, &'a str)], key: &str) -> Option<&'a str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Canonical symbol for a source identifier, if the identifier is known.
#[must_use]
pub fn canonical_symbol(source: Source, source_identifier: &str) -> Option<&'static str> {
    let key = source_identifier.trim();
    match source {
        Source::PositioningReport => lookup(COT_NAMES, key),
        Source::PriceVendor => lookup(YAHOO_TICKERS, key),
        Source::Internal => CANONICAL
            .iter()
            .find(|(symbol, _, _)| *symbol == key)
            .map(|(symbol, _, _)| *symbol),
    }
}

/// Human-readable name for a canonical symbol.
#[must_use]
pub fn display_name(symbol: &str) -> Option<&'static str> {
    CANONICAL
        .iter()
        .find(|(s, _, _)| *s == symbol)
        .map(|(_, name, _)| *name)
}

/// Asset class tag for a canonical symbol.
#[must_use]
pub fn asset_class(symbol: &str) -> Option<&'static str> {
    CANONICAL
        .iter()
        .find(|(s, _, _)| *s == symbol)
        .map(|(_, _, class)| *class)
}

/// Canonical symbols that have a CFTC report mapping, in table order.
pub fn reported_symbols() -> impl Iterator<Item = &'static str> {
    COT_NAMES.iter().map(|(_, symbol)| *symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cot_and_yahoo_identifiers_share_canonical_symbol() {
        let from_cot = canonical_symbol(Source::PositioningReport, "GOLD - COMMODITY EXCHANGE INC.");
        let from_yahoo = canonical_symbol(Source::PriceVendor, "GC=F");
        assert_eq!(from_cot, Some("XAU"));
        assert_eq!(from_cot, from_yahoo);
    }

    #[test]
    fn test_lookup_trims_identifier() {
        assert_eq!(
            canonical_symbol(Source::PositioningReport, " BITCOIN - CHICAGO MERCANTILE EXCHANGE "),
            Some("BTC")
        );
    }

    #[test]
    fn test_unknown_identifier() {
        assert_eq!(canonical_symbol(Source::PriceVendor, "AAPL"), None);
    }

    #[test]
    fn test_every_mapped_symbol_has_a_display_name_and_class() {
        for (_, symbol) in COT_NAMES.iter().chain(YAHOO_TICKERS.iter()) {
            assert!(display_name(symbol).is_some(), "missing display name for {symbol}");
            assert!(asset_class(symbol).is_some(), "missing asset class for {symbol}");
        }
    }

    #[test]
    fn test_internal_source_accepts_canonical_symbols() {
        assert_eq!(canonical_symbol(Source::Internal, "6E"), Some("6E"));
        assert_eq!(asset_class("6E"), Some(CURRENCY));
    }
}
