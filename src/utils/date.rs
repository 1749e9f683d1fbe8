use chrono::NaiveDate;

use crate::consts::DATE_FORMAT;

/// Parse a stored date key; keys that don't parse are skipped by callers
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, DATE_FORMAT).ok()
}
