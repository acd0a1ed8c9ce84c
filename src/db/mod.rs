pub mod schema;
pub mod user_repo;
pub mod contact_repo;
pub mod address_repo;
pub mod account_repo;
pub mod opportunity_repo;
pub mod lead_repo;
pub mod permission_repo;
pub mod task_repo;
pub mod comment_repo;

use chrono::{NaiveDate, NaiveDateTime, Timelike, Utc};

use crate::error::{CrmError, CrmResult};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current UTC time, truncated to the microsecond precision we store.
pub fn now() -> NaiveDateTime {
    let ts = Utc::now().naive_utc();
    ts.with_nanosecond(ts.nanosecond() / 1_000 * 1_000).unwrap_or(ts)
}

pub(crate) fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn parse_timestamp(value: Option<String>) -> CrmResult<Option<NaiveDateTime>> {
    value
        .map(|s| {
            NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT)
                .map_err(|e| CrmError::Other(format!("Invalid timestamp '{}': {}", s, e)))
        })
        .transpose()
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_date(value: Option<String>) -> CrmResult<Option<NaiveDate>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(&s, DATE_FORMAT)
                .map_err(|e| CrmError::Other(format!("Invalid date '{}': {}", s, e)))
        })
        .transpose()
}
