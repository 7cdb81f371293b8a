use chrono::{Local, NaiveDate};
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("'{0}' is not a valid YYYY-MM-DD date")]
    Invalid(String),
}

/// Parse a calendar day. Anything carrying a time component is rejected so a
/// timestamp can never land in the wrong day's bucket.
pub fn parse_date(s: &str) -> Result<NaiveDate, DateError> {
    let trimmed = s.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| DateError::Invalid(trimmed.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Today in the local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
