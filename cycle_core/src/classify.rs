//! Point-in-time date classification.
//!
//! Answers the per-day questions the calendar view asks: is a date inside a
//! logged period, inside the predicted fertile window, or the predicted
//! ovulation day.

use crate::stats::{boundary_dates, first_end_on_or_after};
use crate::{CycleEvent, CycleStatistics, DayStatus, EventKind};
use chrono::NaiveDate;

/// Whether `date` falls inside a logged period
///
/// Each start is paired with the first end on or after it in chronological
/// order, which may be a distant end when an earlier one was never logged.
/// A start with no end at all is treated as an ongoing period, so every date
/// from the start onward counts as in-period until an end is logged.
pub fn is_in_period(events: &[CycleEvent], date: NaiveDate) -> bool {
    let (starts, ends) = boundary_dates(events);

    starts.iter().any(|&start| match first_end_on_or_after(&ends, start) {
        Some(end) => start <= date && date <= end,
        None => date >= start,
    })
}

/// Whether `date` falls inside the inclusive fertile window
pub fn is_in_fertile_window(
    date: NaiveDate,
    window_start: Option<NaiveDate>,
    window_end: Option<NaiveDate>,
) -> bool {
    match (window_start, window_end) {
        (Some(start), Some(end)) => start <= date && date <= end,
        _ => false,
    }
}

/// Whether `date` is the predicted ovulation day
pub fn is_ovulation_day(date: NaiveDate, ovulation: Option<NaiveDate>) -> bool {
    ovulation == Some(date)
}

/// Events logged on exactly `date`, in input order
pub fn events_for_date(events: &[CycleEvent], date: NaiveDate) -> Vec<&CycleEvent> {
    events.iter().filter(|e| e.date == date).collect()
}

/// Everything the calendar needs to render one day
pub fn day_status(events: &[CycleEvent], stats: &CycleStatistics, date: NaiveDate) -> DayStatus {
    let day_events = events_for_date(events, date);

    DayStatus {
        is_period: is_in_period(events, date),
        has_start: day_events.iter().any(|e| e.kind == EventKind::PeriodStart),
        has_end: day_events.iter().any(|e| e.kind == EventKind::PeriodEnd),
        has_notes: day_events
            .iter()
            .any(|e| e.notes.as_deref().is_some_and(|n| !n.is_empty())),
        is_fertile: is_in_fertile_window(
            date,
            stats.fertile_window_start,
            stats.fertile_window_end,
        ),
        is_ovulation: is_ovulation_day(date, stats.predicted_ovulation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::calculate_cycle_statistics;
    use chrono::Duration;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_in_period_inclusive_range() {
        let start = date("2024-03-10");
        let end = date("2024-03-14");
        let events = vec![CycleEvent::period_start(start), CycleEvent::period_end(end)];

        let mut day = start;
        while day <= end {
            assert!(is_in_period(&events, day), "{} should be in period", day);
            day += Duration::days(1);
        }

        assert!(!is_in_period(&events, start - Duration::days(1)));
        assert!(!is_in_period(&events, end + Duration::days(1)));
    }

    #[test]
    fn test_open_period_extends_forward() {
        let events = vec![CycleEvent::period_start(date("2024-03-10"))];

        assert!(!is_in_period(&events, date("2024-03-09")));
        assert!(is_in_period(&events, date("2024-03-10")));
        assert!(is_in_period(&events, date("2025-12-31")));
    }

    #[test]
    fn test_missing_end_pairs_with_later_end() {
        // The January start has no end of its own and borrows February's
        let events = vec![
            CycleEvent::period_start(date("2024-01-01")),
            CycleEvent::period_start(date("2024-02-01")),
            CycleEvent::period_end(date("2024-02-05")),
        ];

        assert!(is_in_period(&events, date("2024-01-20")));
        assert!(!is_in_period(&events, date("2024-02-06")));
    }

    #[test]
    fn test_no_events_is_never_in_period() {
        assert!(!is_in_period(&[], date("2024-01-01")));
    }

    #[test]
    fn test_fertile_window_bounds() {
        let start = Some(date("2024-03-06"));
        let end = Some(date("2024-03-11"));

        assert!(is_in_fertile_window(date("2024-03-06"), start, end));
        assert!(is_in_fertile_window(date("2024-03-08"), start, end));
        assert!(is_in_fertile_window(date("2024-03-11"), start, end));
        assert!(!is_in_fertile_window(date("2024-03-05"), start, end));
        assert!(!is_in_fertile_window(date("2024-03-12"), start, end));
    }

    #[test]
    fn test_fertile_window_requires_both_bounds() {
        let d = date("2024-03-08");
        assert!(!is_in_fertile_window(d, None, Some(d)));
        assert!(!is_in_fertile_window(d, Some(d), None));
        assert!(!is_in_fertile_window(d, None, None));
    }

    #[test]
    fn test_ovulation_day() {
        let d = date("2024-03-11");
        assert!(is_ovulation_day(d, Some(d)));
        assert!(!is_ovulation_day(d + Duration::days(1), Some(d)));
        assert!(!is_ovulation_day(d - Duration::days(1), Some(d)));
        assert!(!is_ovulation_day(d, None));
    }

    #[test]
    fn test_events_for_date() {
        let events = vec![
            CycleEvent::period_start(date("2024-03-10")),
            CycleEvent::new(date("2024-03-10"), EventKind::PeriodStart, Some("dup".into())),
            CycleEvent::period_end(date("2024-03-14")),
        ];

        let found = events_for_date(&events, date("2024-03-10"));
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].notes.as_deref(), Some("dup"));
        assert!(events_for_date(&events, date("2024-03-11")).is_empty());
    }

    #[test]
    fn test_day_status() {
        let events = vec![
            CycleEvent::period_start(date("2024-01-01")),
            CycleEvent::period_end(date("2024-01-05")),
            CycleEvent::period_start(date("2024-01-29")),
            CycleEvent::new(
                date("2024-02-02"),
                EventKind::PeriodEnd,
                Some("light".into()),
            ),
        ];
        let stats = calculate_cycle_statistics(&events);

        let status = day_status(&events, &stats, date("2024-02-02"));
        assert!(status.is_period);
        assert!(status.has_end);
        assert!(!status.has_start);
        assert!(status.has_notes);

        // Next period 2024-02-26, ovulation 2024-02-12
        let status = day_status(&events, &stats, date("2024-02-12"));
        assert!(status.is_ovulation);
        assert!(status.is_fertile);
        assert!(!status.is_period);

        let status = day_status(&events, &stats, date("2024-02-07"));
        assert!(status.is_fertile);
        assert!(!status.is_ovulation);
    }
}
