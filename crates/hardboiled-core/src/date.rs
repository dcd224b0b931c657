//! Date helpers for templates.

use chrono::{
    format::{Item, StrftimeItems},
    Datelike, Local, NaiveDateTime,
};

use crate::error::{CoreError, Result};

/// Default date format, `2024-06-15`.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a date with a strftime-style format string.
pub fn format_date(dt: &NaiveDateTime, fmt: &str) -> Result<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(fmt).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(CoreError::DateFormat(fmt.to_string()));
    }
    Ok(dt.format_with_items(items.iter()).to_string())
}

/// The current local calendar year.
#[must_use]
pub fn current_year() -> i32 {
    Local::now().year()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn sample() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .and_then(|d| d.and_hms_opt(12, 30, 0))
            .expect("valid date")
    }

    #[test]
    fn test_format_date_default() {
        assert_eq!(format_date(&sample(), DEFAULT_DATE_FORMAT).unwrap(), "2024-06-15");
    }

    #[test]
    fn test_format_date_custom() {
        assert_eq!(format_date(&sample(), "%B %d, %Y").unwrap(), "June 15, 2024");
        assert_eq!(format_date(&sample(), "%H:%M").unwrap(), "12:30");
    }

    #[test]
    fn test_format_date_invalid() {
        let err = format_date(&sample(), "%Q").unwrap_err();
        assert!(matches!(err, CoreError::DateFormat(_)));
    }

    #[test]
    fn test_current_year() {
        assert_eq!(current_year(), Local::now().year());
    }
}
