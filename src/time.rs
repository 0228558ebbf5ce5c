//! Time related utils.

use chrono::NaiveDateTime;
use chrono::Utc;

use crate::{Error, Result};

/// DateTime in UTC, the only zone signing cares about.
pub type DateTime = chrono::DateTime<Utc>;

/// Date format used in credential scope: "20220313".
const DATE: &str = "%Y%m%d";

/// ISO 8601 basic format used in `x-amz-date`: "20220313T072004Z".
const ISO8601: &str = "%Y%m%dT%H%M%SZ";

/// Take the current time in UTC.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format a datetime into the scope date: "20220313".
pub fn format_date(t: DateTime) -> String {
    t.format(DATE).to_string()
}

/// Format a datetime into ISO 8601 basic: "20220313T072004Z".
pub fn format_iso8601(t: DateTime) -> String {
    t.format(ISO8601).to_string()
}

/// Parse an ISO 8601 basic timestamp like "20220313T072004Z".
///
/// Handy for injecting a fixed signing time in tests.
pub fn parse_iso8601(s: &str) -> Result<DateTime> {
    let naive = NaiveDateTime::parse_from_str(s, ISO8601)
        .map_err(|e| Error::encoding_invalid(format!("invalid timestamp {s}")).with_source(e))?;
    Ok(naive.and_utc())
}
