//! Normalisation of raw broker payloads into the engine's fixed types.
//!
//! Brokers disagree on field names (`symbol` vs `ticker`, `qty` vs `quantity`, ...) and
//! on whether numbers arrive as strings. All of that variability is resolved here so the
//! rest of the engine only ever sees [`Position`] and [`PriceBar`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::EngineError;
use crate::models::market::PriceBar;
use crate::models::portfolio::Position;

const TICKER_KEYS: &[&str] = &["ticker", "symbol", "code"];
const QUANTITY_KEYS: &[&str] = &["quantity", "qty", "amount", "volume"];
const AVG_PRICE_KEYS: &[&str] = &["avg_price", "average_price", "purchase_price", "book_price", "price"];
const ENTRY_DATE_KEYS: &[&str] = &["buy_date", "purchase_date", "entry_date"];

const BAR_TIME_KEYS: &[&str] = &["timestamp", "date", "time", "datetime"];
const BAR_OPEN_KEYS: &[&str] = &["open", "o"];
const BAR_HIGH_KEYS: &[&str] = &["high", "h"];
const BAR_LOW_KEYS: &[&str] = &["low", "l"];
const BAR_CLOSE_KEYS: &[&str] = &["close", "c", "price"];
const BAR_VOLUME_KEYS: &[&str] = &["volume", "v"];

/// First key present with a non-null value.
fn first_present<'a>(row: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| row.get(*k))
        .find(|v| !v.is_null())
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_ascii_uppercase()),
        _ => None,
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y%m%d"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let secs = n.as_i64()?;
            // Millisecond epochs are 13 digits.
            if secs > 100_000_000_000 {
                DateTime::from_timestamp_millis(secs)
            } else {
                DateTime::from_timestamp(secs, 0)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt.and_utc());
            }
            parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)).map(|dt| dt.and_utc())
        }
        _ => None,
    }
}

/// Rows from either an array of objects or an object keyed by ticker.
fn rows(payload: &Value) -> Result<Vec<(Option<String>, &Map<String, Value>)>, EngineError> {
    match payload {
        Value::Array(items) => Ok(items
            .iter()
            .filter_map(|item| item.as_object().map(|obj| (None, obj)))
            .collect()),
        Value::Object(map) => Ok(map
            .iter()
            .filter_map(|(key, item)| item.as_object().map(|obj| (Some(key.clone()), obj)))
            .collect()),
        other => Err(EngineError::Connectivity(format!(
            "unexpected broker payload: expected array or object, got {}",
            type_name(other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Translate a raw holdings payload into positions.
///
/// Rows without a ticker or with a non-positive quantity are dropped; a missing entry
/// date defaults to `today`.
pub fn normalize_holdings(payload: &Value, today: NaiveDate) -> Result<Vec<Position>, EngineError> {
    let mut positions = Vec::new();

    for (key, row) in rows(payload)? {
        let ticker = first_present(row, TICKER_KEYS)
            .and_then(as_string)
            .or_else(|| key.map(|k| k.trim().to_ascii_uppercase()).filter(|k| !k.is_empty()));
        let Some(ticker) = ticker else {
            warn!("BrokerAdapter: skipping holding without a ticker");
            continue;
        };

        let quantity = first_present(row, QUANTITY_KEYS).and_then(as_f64).unwrap_or(0.0);
        if !(quantity >= 1.0) {
            warn!(ticker = %ticker, quantity, "BrokerAdapter: skipping {} with no shares", ticker);
            continue;
        }

        let average_price = first_present(row, AVG_PRICE_KEYS).and_then(as_f64).unwrap_or(0.0);
        let entry_date = first_present(row, ENTRY_DATE_KEYS)
            .and_then(Value::as_str)
            .and_then(parse_date)
            .unwrap_or(today);

        positions.push(Position::new(ticker, quantity.floor() as u64, average_price, entry_date));
    }

    Ok(positions)
}

/// Translate a raw bar payload into price bars sorted by time.
///
/// Bars missing a timestamp or a close are dropped; missing open/high/low fall back to the close.
pub fn normalize_price_bars(payload: &Value) -> Result<Vec<PriceBar>, EngineError> {
    let mut bars = Vec::new();

    for (_, row) in rows(payload)? {
        let timestamp = first_present(row, BAR_TIME_KEYS).and_then(parse_timestamp);
        let close = first_present(row, BAR_CLOSE_KEYS).and_then(as_f64);
        let (Some(timestamp), Some(close)) = (timestamp, close) else {
            continue;
        };
        let open = first_present(row, BAR_OPEN_KEYS).and_then(as_f64).unwrap_or(close);
        let high = first_present(row, BAR_HIGH_KEYS).and_then(as_f64).unwrap_or(close);
        let low = first_present(row, BAR_LOW_KEYS).and_then(as_f64).unwrap_or(close);
        let volume = first_present(row, BAR_VOLUME_KEYS).and_then(as_f64).unwrap_or(0.0);
        bars.push(PriceBar::new(open, high, low, close, volume, timestamp));
    }

    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}
