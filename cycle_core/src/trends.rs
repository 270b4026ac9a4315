//! Wellbeing trends over trailing windows of daily logs.
//!
//! Windows are inclusive calendar ranges `[today - N days, today]`.

use crate::config::TrendConfig;
use crate::{DailyLog, MoodTrend, SymptomCount, TrendSummary, WellbeingField};
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

/// Minimum number of logs before a mood trend is reported
const MIN_LOGS_FOR_TREND: usize = 4;

/// Averages further apart than this count as a change in direction
const TREND_THRESHOLD: f64 = 0.5;

/// Summarize trends using the default windows
pub fn summarize_trends(logs: &[DailyLog], today: NaiveDate) -> TrendSummary {
    summarize_trends_with(logs, today, &TrendConfig::default())
}

/// Summarize trends: short-window mood/energy averages, plus top symptoms
/// and mood direction over the long window
pub fn summarize_trends_with(
    logs: &[DailyLog],
    today: NaiveDate,
    config: &TrendConfig,
) -> TrendSummary {
    let short = logs_within(logs, today, config.short_window_days);
    let long = logs_within(logs, today, config.long_window_days);

    tracing::debug!(
        "Summarizing trends over {} short-window and {} long-window logs",
        short.len(),
        long.len()
    );

    TrendSummary {
        avg_mood_7d: average_for(&short, WellbeingField::Mood),
        avg_energy_7d: average_for(&short, WellbeingField::Energy),
        top_symptoms: top_symptoms(&long, config.top_symptom_limit),
        mood_trend: mood_trend(&long),
    }
}

/// Logs dated within `[today - days, today]`
///
/// A window reaching past the earliest representable date covers everything
/// up to `today`.
pub fn logs_within(logs: &[DailyLog], today: NaiveDate, days: i64) -> Vec<DailyLog> {
    let from = Duration::try_days(days)
        .and_then(|window| today.checked_sub_signed(window))
        .unwrap_or(NaiveDate::MIN);
    logs.iter()
        .filter(|log| log.date >= from && log.date <= today)
        .cloned()
        .collect()
}

/// Mean of the present values of `field`, rounded to one decimal place
pub fn average_for(logs: &[DailyLog], field: WellbeingField) -> Option<f64> {
    let values: Vec<f64> = logs
        .iter()
        .filter_map(|log| log.value(field))
        .map(f64::from)
        .collect();

    if values.is_empty() {
        return None;
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}

/// Most frequent symptom tags, most common first
///
/// Ties keep the order in which tags were first seen.
pub fn top_symptoms(logs: &[DailyLog], limit: usize) -> Vec<SymptomCount> {
    let mut counts: Vec<SymptomCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for symptom in logs.iter().flat_map(|log| log.symptoms.iter()) {
        match index.get(symptom.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(symptom.as_str(), counts.len());
                counts.push(SymptomCount {
                    symptom: symptom.clone(),
                    count: 1,
                });
            }
        }
    }

    // Stable sort preserves first-seen order among equal counts
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

/// Compare mood between the older and newer half of the logs
///
/// The newer half takes the extra log when the count is odd. Returns `None`
/// with fewer than four logs or when either half has no mood values.
pub fn mood_trend(logs: &[DailyLog]) -> Option<MoodTrend> {
    if logs.len() < MIN_LOGS_FOR_TREND {
        return None;
    }

    let mut sorted = logs.to_vec();
    sorted.sort_by_key(|log| log.date);

    let (first_half, second_half) = sorted.split_at(sorted.len() / 2);
    let first = average_for(first_half, WellbeingField::Mood)?;
    let second = average_for(second_half, WellbeingField::Mood)?;

    let diff = second - first;
    let trend = if diff > TREND_THRESHOLD {
        MoodTrend::Up
    } else if diff < -TREND_THRESHOLD {
        MoodTrend::Down
    } else {
        MoodTrend::Stable
    };
    Some(trend)
}

/// The short-window logs in date order, at most one week's worth
pub fn recent_series(logs: &[DailyLog], today: NaiveDate, days: i64) -> Vec<DailyLog> {
    let mut recent = logs_within(logs, today, days);
    recent.sort_by_key(|log| log.date);
    let skip = recent.len().saturating_sub(7);
    recent.split_off(skip)
}
