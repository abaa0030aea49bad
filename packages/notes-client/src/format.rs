//! Display formatting for note timestamps.

use chrono::{DateTime, Locale, TimeZone, Utc};
use std::fmt;

use crate::types::Note;

/// Long date with hours and minutes, e.g. `23 de septiembre de 2024, 18:30`.
const DATE_FORMAT: &str = "%-d de %B de %Y, %H:%M";

/// Format a timestamp as a long Mexican-Spanish date in the given zone.
pub fn format_timestamp<Tz>(ts: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    ts.with_timezone(tz)
        .format_localized(DATE_FORMAT, Locale::es_MX)
        .to_string()
}

/// Creation date of a note, or an empty string when the API sent none.
pub fn format_created_at<Tz>(note: &Note, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    note.created_at
        .as_ref()
        .map(|ts| format_timestamp(ts, tz))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn note(created_at: Option<DateTime<Utc>>) -> Note {
        Note {
            id: "n1".into(),
            title: "Compras".into(),
            content: "Leche".into(),
            created_at,
        }
    }

    #[test]
    fn test_format_in_utc() {
        let ts = Utc.with_ymd_and_hms(2024, 9, 23, 18, 30, 0).unwrap();
        assert_eq!(format_timestamp(&ts, &Utc), "23 de septiembre de 2024, 18:30");
    }

    #[test]
    fn test_format_shifts_to_zone() {
        // 2024-01-01 03:05 UTC is still New Year's Eve in Mexico City.
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 3, 5, 0).unwrap();
        let cdmx = FixedOffset::west_opt(6 * 3600).unwrap();
        assert_eq!(format_timestamp(&ts, &cdmx), "31 de diciembre de 2023, 21:05");
    }

    #[test]
    fn test_missing_created_at_is_empty() {
        assert_eq!(format_created_at(&note(None), &Utc), "");
        let ts = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap();
        assert_eq!(format_created_at(&note(Some(ts)), &Utc), "2 de mayo de 2024, 09:00");
    }
}
