//! Date handling: the injectable "today" source and the fixed `uk-UA` date format.

use chrono::{Local, NaiveDate};
use log::warn;

/// Format used for every date printed in a document (`15.06.2024`).
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Format of dates submitted through the form (`2024-06-15`).
pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Supplies the date embedded into rendered documents.
pub trait Clock {
    /// Returns the current calendar date.
    fn today(&self) -> NaiveDate;
}

/// Reads today's date from the local system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Formats `date` the way documents print it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Reformats an ISO input date for printing.
///
/// Values that do not parse as `YYYY-MM-DD` are returned unchanged.
pub fn format_input_date(value: &str) -> String {
    let value = value.trim();
    match NaiveDate::parse_from_str(value, INPUT_DATE_FORMAT) {
        Ok(date) => format_date(date),
        Err(err) => {
            warn!("Keeping unparsable date '{}' as entered: {}", value, err);
            value.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_iso_input() {
        assert_eq!(format_input_date("2024-06-15"), "15.06.2024");
        assert_eq!(format_input_date(" 1990-05-01 "), "01.05.1990");
    }

    #[test]
    fn keeps_unparsable_input() {
        assert_eq!(format_input_date("next Tuesday"), "next Tuesday");
    }

    #[test]
    fn fixed_clock_reports_its_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid date");
        assert_eq!(format_date(FixedClock(date).today()), "02.01.2024");
    }
}
