use anyhow::{anyhow, Result};
use chrono::NaiveDateTime;

/// Canonical timestamp form for every datetime column.
pub const DATE_FMT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_datetime(value: NaiveDateTime) -> String {
    value.format(DATE_FMT).to_string()
}

pub fn parse_datetime(value: &str, field: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATE_FMT)
        .map_err(|err| anyhow!("failed to parse {field} '{value}': {err}"))
}
