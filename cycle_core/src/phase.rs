//! Current cycle phase classification.
//!
//! "Today" is always supplied by the caller; nothing in this module reads
//! the wall clock.

use crate::config::PredictionConfig;
use crate::stats::{boundary_dates, days_between};
use crate::{CycleEvent, CyclePhase, CyclePhaseInfo, CycleStatistics};
use chrono::NaiveDate;

/// Classify `today` within the current cycle using default parameters
pub fn current_phase(
    events: &[CycleEvent],
    stats: &CycleStatistics,
    today: NaiveDate,
) -> CyclePhaseInfo {
    current_phase_with(events, stats, today, &PredictionConfig::default())
}

/// Classify `today` within the current cycle
///
/// Day 1 is the most recent period start. The day count is not clamped, so
/// an overdue period yields a day past the cycle length (classified as
/// luteal) and a negative `days_until_next_period`.
pub fn current_phase_with(
    events: &[CycleEvent],
    stats: &CycleStatistics,
    today: NaiveDate,
    config: &PredictionConfig,
) -> CyclePhaseInfo {
    let (starts, _) = boundary_dates(events);

    let (Some(&last_start), Some(cycle_length)) = (starts.last(), stats.average_cycle_length)
    else {
        return CyclePhaseInfo::unknown();
    };

    let day_of_cycle = days_between(last_start, today) + 1;
    let days_until_next_period = stats
        .predicted_next_period
        .map(|next| days_between(today, next));

    let period_duration = stats
        .average_period_duration
        .unwrap_or(config.default_period_duration);

    let phase = classify_day(day_of_cycle, cycle_length, period_duration, config);

    tracing::debug!(
        "Cycle day {} of {} classified as {:?}",
        day_of_cycle,
        cycle_length,
        phase
    );

    CyclePhaseInfo {
        phase,
        day_of_cycle: Some(day_of_cycle),
        days_until_next_period,
    }
}

/// Map a 1-indexed cycle day onto a phase; first matching band wins
pub fn classify_day(
    day_of_cycle: i64,
    cycle_length: i64,
    period_duration: i64,
    config: &PredictionConfig,
) -> CyclePhase {
    let ovulation_day = cycle_length - config.luteal_phase_days;

    if day_of_cycle <= period_duration {
        CyclePhase::Menstrual
    } else if day_of_cycle <= ovulation_day - config.fertile_lead_days {
        CyclePhase::Follicular
    } else if day_of_cycle <= ovulation_day + 1 {
        CyclePhase::Ovulation
    } else {
        CyclePhase::Luteal
    }
}

impl CyclePhaseInfo {
    /// One-line summary such as "Day 12 of your cycle • 17 days until next period"
    pub fn insight(&self) -> String {
        if self.phase == CyclePhase::Unknown {
            return "Start tracking your cycle to get personalized insights.".to_string();
        }

        let mut parts = Vec::new();

        if let Some(day) = self.day_of_cycle {
            parts.push(format!("Day {} of your cycle", day));
        }

        match self.days_until_next_period {
            Some(days) if days > 0 => parts.push(format!("{} days until next period", days)),
            Some(0) => parts.push("Period expected today".to_string()),
            Some(days) => parts.push(format!("Period is {} days late", days.abs())),
            None => {}
        }

        parts.join(" • ")
    }
}
