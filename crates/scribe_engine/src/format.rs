//! Shared text formatting for prompts and fallback documents.

use chrono::NaiveDate;
use scribe_core::{or_not_specified, Coordinator, NOT_SPECIFIED};

pub const DATE_FORMAT: &str = "%B %-d, %Y";

/// "January 10, 2024"
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// "January 10, 2024" or "January 10, 2024 to January 11, 2024".
pub fn date_range(start: NaiveDate, end: NaiveDate) -> String {
    if start == end {
        format_date(start)
    } else {
        format!("{} to {}", format_date(start), format_date(end))
    }
}

/// "Dr. Rao (Professor), Dr. Iyer (HOD)"
pub fn coordinators_line(coordinators: &[Coordinator]) -> String {
    if coordinators.is_empty() {
        return NOT_SPECIFIED.to_string();
    }
    coordinators
        .iter()
        .map(|c| match c.designation.trim() {
            "" => or_not_specified(&c.name).to_string(),
            designation => format!("{} ({})", or_not_specified(&c.name), designation),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(date(5)), "January 5, 2024");
    }

    #[test]
    fn test_date_range() {
        assert_eq!(date_range(date(10), date(10)), "January 10, 2024");
        assert_eq!(
            date_range(date(10), date(11)),
            "January 10, 2024 to January 11, 2024"
        );
    }

    #[test]
    fn test_coordinators_line() {
        assert_eq!(coordinators_line(&[]), NOT_SPECIFIED);
        let list = vec![
            Coordinator::new("Dr. Rao", "Professor"),
            Coordinator::new("Ms. Sen", ""),
        ];
        assert_eq!(coordinators_line(&list), "Dr. Rao (Professor), Ms. Sen");
    }
}
