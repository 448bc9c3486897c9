//! US equity market session helpers (America/New_York, DST aware).

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::America::New_York;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Seconds after midnight, Eastern time.
const PRE_MARKET_START: u32 = 8 * 3600 + 30 * 60;
const OPEN: u32 = 9 * 3600 + 30 * 60;
const CLOSE: u32 = 16 * 3600;

pub fn to_eastern(now: DateTime<Utc>) -> DateTime<Tz> {
    New_York.from_utc_datetime(&now.naive_utc())
}

pub fn us_eastern_now() -> DateTime<Tz> {
    to_eastern(Utc::now())
}

fn weekday_seconds(now: DateTime<Utc>) -> Option<u32> {
    let et = to_eastern(now);
    match et.weekday() {
        Weekday::Sat | Weekday::Sun => None,
        _ => Some(et.num_seconds_from_midnight()),
    }
}

/// Weekday and within the hour before the 09:30 ET open.
pub fn is_pre_market(now: DateTime<Utc>) -> bool {
    weekday_seconds(now).is_some_and(|s| (PRE_MARKET_START..OPEN).contains(&s))
}

/// Weekday between 09:30 and 16:00 ET. Exchange holidays are not modelled.
pub fn is_regular_session(now: DateTime<Utc>) -> bool {
    weekday_seconds(now).is_some_and(|s| (OPEN..CLOSE).contains(&s))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketPhase {
    PreMarket,
    Regular,
    Closed,
}

pub fn market_phase(now: DateTime<Utc>) -> MarketPhase {
    if is_pre_market(now) {
        MarketPhase::PreMarket
    } else if is_regular_session(now) {
        MarketPhase::Regular
    } else {
        MarketPhase::Closed
    }
}
