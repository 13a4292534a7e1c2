//! Field checks applied before any insert or update. The persistence layer
//! calls these so invalid values never reach SQLite regardless of which
//! front-end submitted them. Helpers return the normalized (trimmed) value so
//! the caller stores exactly what was validated.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};

const MAX_TEXT_LEN: usize = 255;
const MAX_CAPACITY: i64 = 100_000;
const EARLIEST_YEAR: i32 = 1000;

/// Names of actors, authors, and directors: 3 to 255 characters of letters,
/// spaces, hyphens, dots, and commas.
pub fn full_name(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < 3 || len > MAX_TEXT_LEN {
        return Err(Error::invalid(field, "must be between 3 and 255 characters"));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_alphabetic() || c.is_whitespace() || matches!(c, '-' | '.' | ','))
    {
        return Err(Error::invalid(
            field,
            "may only contain letters, spaces, hyphens, dots and commas",
        ));
    }
    Ok(trimmed.to_string())
}

/// Titles, theatre names, and hall names: 2 to 255 characters.
pub fn title(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < 2 || len > MAX_TEXT_LEN {
        return Err(Error::invalid(field, "must be between 2 and 255 characters"));
    }
    Ok(trimmed.to_string())
}

/// Year a play was written: not before 1000 and at most ten years ahead.
pub fn year_written(year: Option<i32>) -> Result<Option<i32>> {
    let Some(year) = year else {
        return Ok(None);
    };
    let latest = Local::now().year() + 10;
    if !(EARLIEST_YEAR..=latest).contains(&year) {
        return Err(Error::invalid(
            "year_written",
            format!("must be between {EARLIEST_YEAR} and {latest}"),
        ));
    }
    Ok(Some(year))
}

pub fn capacity(capacity: Option<i64>) -> Result<Option<i64>> {
    match capacity {
        Some(value) if !(1..=MAX_CAPACITY).contains(&value) => Err(Error::invalid(
            "capacity",
            format!("must be between 1 and {MAX_CAPACITY}"),
        )),
        other => Ok(other),
    }
}

pub fn production_date(date: Option<NaiveDate>) -> Result<Option<NaiveDate>> {
    let Some(date) = date else {
        return Ok(None);
    };
    if !(1900..=2100).contains(&date.year()) {
        return Err(Error::invalid(
            "production_date",
            "must be between 1900-01-01 and 2100-12-31",
        ));
    }
    Ok(Some(date))
}

pub fn event_datetime(datetime: NaiveDateTime) -> Result<NaiveDateTime> {
    if !(1900..=2100).contains(&datetime.year()) {
        return Err(Error::invalid(
            "datetime",
            "must be between 1900-01-01 00:00:00 and 2100-12-31 23:59:59",
        ));
    }
    Ok(datetime)
}

/// Collapse blank optional text to `None` and trim the rest.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_is_trimmed_and_checked() {
        assert_eq!(full_name("full_name", "  Ellen Terry ").unwrap(), "Ellen Terry");
        assert!(full_name("full_name", "Al").is_err());
        assert!(full_name("full_name", "R2-D2 Droid").is_err());
        assert_eq!(
            full_name("full_name", "Станиславский К. С.").unwrap(),
            "Станиславский К. С."
        );
    }

    #[test]
    fn title_length_bounds() {
        assert!(title("title", " A ").is_err());
        assert_eq!(title("title", "Up").unwrap(), "Up");
        assert!(title("title", &"x".repeat(256)).is_err());
    }

    #[test]
    fn numeric_ranges() {
        assert!(year_written(Some(999)).is_err());
        assert_eq!(year_written(Some(1603)).unwrap(), Some(1603));
        assert_eq!(year_written(None).unwrap(), None);
        assert!(capacity(Some(0)).is_err());
        assert!(capacity(Some(100_001)).is_err());
        assert_eq!(capacity(Some(350)).unwrap(), Some(350));
    }

    #[test]
    fn blank_optional_text_becomes_none() {
        assert_eq!(optional_text(Some("   ")), None);
        assert_eq!(optional_text(Some(" Tragedy ")), Some("Tragedy".to_string()));
        assert_eq!(optional_text(None), None);
    }
}
