//! Built-in per-phase health tips and the quick-pick symptom list.

use crate::CyclePhase;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Title and tips shown for a cycle phase
#[derive(Clone, Debug)]
pub struct PhaseTips {
    pub title: &'static str,
    pub tips: Vec<&'static str>,
}

/// Symptom tags offered for quick selection when logging a day
pub const COMMON_SYMPTOMS: &[&str] = &[
    "Cramps",
    "Headache",
    "Bloating",
    "Fatigue",
    "Backache",
    "Breast tenderness",
    "Acne",
    "Cravings",
    "Insomnia",
    "Anxiety",
    "Irritability",
    "Nausea",
];

/// Cached tip table, built once on first use
static PHASE_TIPS: Lazy<HashMap<CyclePhase, PhaseTips>> = Lazy::new(build_phase_tips);

/// Tips for the given phase
pub fn phase_tips(phase: CyclePhase) -> &'static PhaseTips {
    // Every phase is inserted by build_phase_tips
    &PHASE_TIPS[&phase]
}

/// Whether a symptom tag is one of the quick-pick tags (case-insensitive)
pub fn is_common_symptom(symptom: &str) -> bool {
    COMMON_SYMPTOMS
        .iter()
        .any(|s| s.eq_ignore_ascii_case(symptom.trim()))
}

fn build_phase_tips() -> HashMap<CyclePhase, PhaseTips> {
    let mut tips = HashMap::new();

    tips.insert(
        CyclePhase::Menstrual,
        PhaseTips {
            title: "Menstrual Phase",
            tips: vec![
                "Rest when you need to and keep exercise gentle",
                "Iron-rich foods like leafy greens and legumes help replace losses",
                "A heat pack can ease cramps",
                "Stay hydrated to reduce bloating",
            ],
        },
    );

    tips.insert(
        CyclePhase::Follicular,
        PhaseTips {
            title: "Follicular Phase",
            tips: vec![
                "Energy tends to rise, a good time for harder workouts",
                "Try something new while motivation is high",
                "Fresh vegetables and lean protein support the rebuild",
            ],
        },
    );

    tips.insert(
        CyclePhase::Ovulation,
        PhaseTips {
            title: "Ovulation Phase",
            tips: vec![
                "This is your most fertile window",
                "Social energy often peaks, plan time with friends",
                "Keep up fibre and fluids",
            ],
        },
    );

    tips.insert(
        CyclePhase::Luteal,
        PhaseTips {
            title: "Luteal Phase",
            tips: vec![
                "Cravings are common; complex carbs help keep blood sugar steady",
                "Prioritize sleep as your period approaches",
                "Magnesium-rich foods may ease mood swings",
                "Lower-intensity exercise like yoga or walking can feel better now",
            ],
        },
    );

    tips.insert(
        CyclePhase::Unknown,
        PhaseTips {
            title: "Track Your Cycle",
            tips: vec![
                "Log the first day of your period to get started",
                "Log when your period ends to learn your typical duration",
                "After two cycles you will see predictions",
            ],
        },
    );

    tips
}
