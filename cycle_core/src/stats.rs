//! Cycle statistics inferred from period boundary events.
//!
//! Statistics are recomputed in full from the raw events on every call:
//! - Average cycle length from the gaps between recent period starts
//! - Average period duration from start/end pairs
//! - Next period, ovulation and fertile window predictions

use crate::config::PredictionConfig;
use crate::{CycleEvent, CycleStatistics, EventKind};
use chrono::{Duration, NaiveDate};

/// Compute cycle statistics using the default prediction parameters
pub fn calculate_cycle_statistics(events: &[CycleEvent]) -> CycleStatistics {
    calculate_cycle_statistics_with(events, &PredictionConfig::default())
}

/// Compute cycle statistics with explicit prediction parameters
///
/// ## Algorithm
///
/// 1. **Cycle length**: gaps between consecutive starts among the last
///    `recent_starts` starts, keeping only gaps in `(0, max_cycle_gap_days)`
/// 2. **Period duration**: each start is paired with the earliest end on or
///    after it and within `end_match_window_days`; the last
///    `recent_durations` inclusive durations are averaged
/// 3. **Next period**: last start + cycle length
/// 4. **Ovulation**: next period - `luteal_phase_days`
/// 5. **Fertile window**: `[ovulation - fertile_lead_days, ovulation]`
///
/// Missing history never fails; it leaves the affected fields as `None`.
pub fn calculate_cycle_statistics_with(
    events: &[CycleEvent],
    config: &PredictionConfig,
) -> CycleStatistics {
    let (starts, ends) = boundary_dates(events);

    let average_cycle_length = average_cycle_length(&starts, config);
    let average_period_duration = average_period_duration(&starts, &ends, config);

    let mut stats = CycleStatistics {
        average_cycle_length,
        average_period_duration,
        ..CycleStatistics::default()
    };

    if let (Some(&last_start), Some(cycle_length)) = (starts.last(), average_cycle_length) {
        let next_period = last_start + Duration::days(cycle_length);
        let ovulation = next_period - Duration::days(config.luteal_phase_days);

        stats.predicted_next_period = Some(next_period);
        stats.predicted_ovulation = Some(ovulation);
        stats.fertile_window_start = Some(ovulation - Duration::days(config.fertile_lead_days));
        stats.fertile_window_end = Some(ovulation);

        tracing::debug!(
            "Predicted next period {} (ovulation {}) from last start {}",
            next_period,
            ovulation,
            last_start
        );
    }

    stats
}

/// Split events into period start and end dates, each sorted ascending
pub(crate) fn boundary_dates(events: &[CycleEvent]) -> (Vec<NaiveDate>, Vec<NaiveDate>) {
    let mut starts = Vec::new();
    let mut ends = Vec::new();

    for event in events {
        match event.kind {
            EventKind::PeriodStart => starts.push(event.date),
            EventKind::PeriodEnd => ends.push(event.date),
        }
    }

    starts.sort();
    ends.sort();
    (starts, ends)
}

/// Whole days from `from` to `to` (negative when `to` is earlier)
pub(crate) fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// First end on or after `start`, searching ends in chronological order
pub(crate) fn first_end_on_or_after(ends: &[NaiveDate], start: NaiveDate) -> Option<NaiveDate> {
    ends.iter().copied().find(|end| *end >= start)
}

fn average_cycle_length(starts: &[NaiveDate], config: &PredictionConfig) -> Option<i64> {
    if starts.len() < 2 {
        return None;
    }

    let recent = &starts[starts.len().saturating_sub(config.recent_starts)..];
    let lengths: Vec<i64> = recent
        .windows(2)
        .map(|pair| days_between(pair[0], pair[1]))
        .filter(|&days| days > 0 && days < config.max_cycle_gap_days)
        .collect();

    if lengths.len() + 1 < recent.len() {
        tracing::debug!(
            "Discarded {} implausible cycle gaps",
            recent.len() - 1 - lengths.len()
        );
    }

    rounded_mean(&lengths)
}

fn average_period_duration(
    starts: &[NaiveDate],
    ends: &[NaiveDate],
    config: &PredictionConfig,
) -> Option<i64> {
    // Greedy: an end may be claimed by more than one start
    let durations: Vec<i64> = starts
        .iter()
        .filter_map(|&start| {
            ends.iter()
                .copied()
                .find(|&end| end >= start && days_between(start, end) <= config.end_match_window_days)
                .map(|end| days_between(start, end) + 1)
        })
        .collect();

    let recent = &durations[durations.len().saturating_sub(config.recent_durations)..];
    rounded_mean(recent)
}

fn rounded_mean(values: &[i64]) -> Option<i64> {
    if values.is_empty() {
        return None;
    }
    let sum: i64 = values.iter().sum();
    Some((sum as f64 / values.len() as f64).round() as i64)
}
