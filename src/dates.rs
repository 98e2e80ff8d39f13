//! Parsing for the three date shapes the CTIS feed mixes freely.

use chrono::{NaiveDate, NaiveDateTime};

/// Parse a CTIS timestamp down to its date part.
///
/// The feed emits `YYYY-MM-DDTHH:MM:SS` with or without a fractional-second
/// suffix (3 or 6 digits), so both forms are accepted.
pub fn timestamp_date(value: &str) -> Option<NaiveDate> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|dt| dt.date())
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Parse the `DD/MM/YYYY` form the search endpoint uses for `lastUpdated`.
pub fn day_month_year(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%d/%m/%Y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_date_with_millis() {
        let date = timestamp_date("2023-01-17T14:02:11.123").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2023, 1, 17).unwrap());
    }

    #[test]
    fn timestamp_date_with_micros() {
        let date = timestamp_date("2023-01-17T14:02:11.123456").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2023, 1, 17).unwrap());
    }

    #[test]
    fn timestamp_date_without_fraction() {
        let date = timestamp_date("2022-05-30T09:00:00").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2022, 5, 30).unwrap());
    }

    #[test]
    fn timestamp_date_rejects_bare_date() {
        assert!(timestamp_date("2022-05-30").is_none());
    }

    #[test]
    fn timestamp_date_rejects_garbage() {
        assert!(timestamp_date("not a timestamp").is_none());
    }

    #[test]
    fn iso_date_valid() {
        let date = iso_date("2024-02-29").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn iso_date_rejects_impossible_day() {
        assert!(iso_date("2023-02-29").is_none());
    }

    #[test]
    fn day_month_year_valid() {
        let date = day_month_year("17/01/2023").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2023, 1, 17).unwrap());
    }

    #[test]
    fn day_month_year_rejects_iso_ordering() {
        // 2023/01/17 would need day 2023
        assert!(day_month_year("2023/01/17").is_none());
    }
}
