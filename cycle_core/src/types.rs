//! Core domain types for the Ebb cycle tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Period boundary events and daily wellbeing logs (raw input)
//! - Cycle statistics and phase information (derived, recomputed per call)
//! - Trend summaries over daily logs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Raw Input Types
// ============================================================================

/// Kind of period boundary event
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PeriodStart,
    PeriodEnd,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::PeriodStart => "period_start",
            EventKind::PeriodEnd => "period_end",
        }
    }
}

/// A user-logged marker that a period started or ended on a given date
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleEvent {
    pub id: Uuid,
    pub date: NaiveDate,
    pub kind: EventKind,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CycleEvent {
    /// Create a new event with a fresh id
    pub fn new(date: NaiveDate, kind: EventKind, notes: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            kind,
            notes,
        }
    }

    pub fn period_start(date: NaiveDate) -> Self {
        Self::new(date, EventKind::PeriodStart, None)
    }

    pub fn period_end(date: NaiveDate) -> Self {
        Self::new(date, EventKind::PeriodEnd, None)
    }
}

/// A date-keyed wellbeing record (one per date, enforced by the store)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyLog {
    pub date: NaiveDate,
    #[serde(default)]
    pub mood: Option<u8>,
    #[serde(default)]
    pub energy: Option<u8>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl DailyLog {
    /// Empty log for a date
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            mood: None,
            energy: None,
            symptoms: Vec::new(),
            notes: None,
        }
    }

    /// Add a trimmed symptom tag, ignoring blanks and duplicates
    pub fn add_symptom(&mut self, symptom: impl Into<String>) {
        let symptom = symptom.into();
        let symptom = symptom.trim();
        if symptom.is_empty() || self.symptoms.iter().any(|s| s == symptom) {
            return;
        }
        self.symptoms.push(symptom.to_string());
    }

    /// Read a numeric wellbeing field
    pub fn value(&self, field: WellbeingField) -> Option<u8> {
        match field {
            WellbeingField::Mood => self.mood,
            WellbeingField::Energy => self.energy,
        }
    }
}

/// Numeric fields of a daily log that can be averaged
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WellbeingField {
    Mood,
    Energy,
}

// ============================================================================
// Derived Types
// ============================================================================

/// Aggregate statistics inferred from period boundary events
///
/// The four date fields are either all `None` or all present.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleStatistics {
    pub average_cycle_length: Option<i64>,
    pub average_period_duration: Option<i64>,
    pub predicted_next_period: Option<NaiveDate>,
    pub predicted_ovulation: Option<NaiveDate>,
    pub fertile_window_start: Option<NaiveDate>,
    pub fertile_window_end: Option<NaiveDate>,
}

/// Phase of the menstrual cycle
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    Menstrual,
    Follicular,
    Ovulation,
    Luteal,
    Unknown,
}

impl CyclePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CyclePhase::Menstrual => "menstrual",
            CyclePhase::Follicular => "follicular",
            CyclePhase::Ovulation => "ovulation",
            CyclePhase::Luteal => "luteal",
            CyclePhase::Unknown => "unknown",
        }
    }
}

/// Where "today" sits in the current cycle
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CyclePhaseInfo {
    pub phase: CyclePhase,
    /// 1-indexed; not clamped to the cycle length
    pub day_of_cycle: Option<i64>,
    /// Negative when the period is overdue
    pub days_until_next_period: Option<i64>,
}

impl CyclePhaseInfo {
    pub fn unknown() -> Self {
        Self {
            phase: CyclePhase::Unknown,
            day_of_cycle: None,
            days_until_next_period: None,
        }
    }
}

/// Calendar status of a single date
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DayStatus {
    pub is_period: bool,
    pub has_start: bool,
    pub has_end: bool,
    pub has_notes: bool,
    pub is_fertile: bool,
    pub is_ovulation: bool,
}

// ============================================================================
// Trend Types
// ============================================================================

/// Direction of mood over the trailing window
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MoodTrend {
    Up,
    Down,
    Stable,
}

/// Occurrence count of one symptom tag
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymptomCount {
    pub symptom: String,
    pub count: usize,
}

/// Wellbeing trends relative to "today"
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TrendSummary {
    pub avg_mood_7d: Option<f64>,
    pub avg_energy_7d: Option<f64>,
    pub top_symptoms: Vec<SymptomCount>,
    pub mood_trend: Option<MoodTrend>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_symptom_trims_and_skips_blanks() {
        let mut log = DailyLog::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        log.add_symptom("  Cramps ");
        log.add_symptom("Cramps");
        log.add_symptom(" ");
        log.add_symptom("");

        assert_eq!(log.symptoms, vec!["Cramps".to_string()]);
    }
}
