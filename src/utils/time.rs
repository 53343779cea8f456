//! Display-time formatting for optimistically synthesized items.
//!
//! Synthesized posts and messages carry locally formatted timestamp strings
//! matching what the server renders, so the optimistic item is
//! indistinguishable from the reconciled one until the refetch replaces it.

use jiff::{Timestamp, Zoned};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn month_abbrev(month: i8) -> &'static str {
    MONTHS[(month as usize).saturating_sub(1).min(11)]
}

/// Temporary id for an optimistic item: current epoch milliseconds. Unique
/// enough until the invalidation refetch swaps in the server-assigned id.
pub fn temp_id() -> i64 {
    Timestamp::now().as_millisecond()
}

/// Short post date, e.g. `4 Mar`.
pub fn post_date(at: &Zoned) -> String {
    format!("{} {}", at.day(), month_abbrev(at.month()))
}

/// Full message timestamp, e.g. `Mar 4, 2026, 2:05 PM`.
pub fn message_timestamp(at: &Zoned) -> String {
    let hour = at.hour();
    let (hour12, meridiem) = match hour {
        0 => (12, "AM"),
        1..=11 => (hour, "AM"),
        12 => (12, "PM"),
        _ => (hour - 12, "PM"),
    };
    format!(
        "{} {}, {}, {}:{:02} {}",
        month_abbrev(at.month()),
        at.day(),
        at.year(),
        hour12,
        at.minute(),
        meridiem
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    fn zoned(y: i16, m: i8, d: i8, h: i8, min: i8) -> Zoned {
        date(y, m, d)
            .at(h, min, 0, 0)
            .to_zoned(jiff::tz::TimeZone::UTC)
            .unwrap()
    }

    #[test]
    fn test_post_date() {
        assert_eq!(post_date(&zoned(2026, 3, 4, 10, 0)), "4 Mar");
        assert_eq!(post_date(&zoned(2026, 12, 25, 0, 0)), "25 Dec");
    }

    #[test]
    fn test_message_timestamp_afternoon() {
        assert_eq!(
            message_timestamp(&zoned(2026, 3, 4, 14, 5)),
            "Mar 4, 2026, 2:05 PM"
        );
    }

    #[test]
    fn test_message_timestamp_midnight_and_noon() {
        assert_eq!(
            message_timestamp(&zoned(2026, 1, 1, 0, 7)),
            "Jan 1, 2026, 12:07 AM"
        );
        assert_eq!(
            message_timestamp(&zoned(2026, 1, 1, 12, 0)),
            "Jan 1, 2026, 12:00 PM"
        );
    }

    #[test]
    fn test_temp_ids_are_positive() {
        assert!(temp_id() > 0);
    }
}
