//! Rule-based urgency for a symptom entry.

use serde::Serialize;

use crate::models::{SymptomEntry, Zone};

pub const RATING_MAX: i32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Triage {
    /// Green, Yellow or Red. Never Unknown.
    pub urgency: Zone,
    pub message: &'static str,
    pub actions: Vec<&'static str>,
}

/// Check every present rating lies within `0..=10`.
pub fn validate(entry: &SymptomEntry) -> Result<(), String> {
    let ratings = [
        ("wheeze_rating", entry.wheeze_rating),
        ("cough_rating", entry.cough_rating),
        ("dyspnea_rating", entry.dyspnea_rating),
        ("night_symptoms_rating", entry.night_symptoms_rating),
    ];
    for (field, value) in ratings {
        if let Some(v) = value {
            if !(0..=RATING_MAX).contains(&v) {
                return Err(format!("{field} must be between 0 and {RATING_MAX}, got {v}"));
            }
        }
    }
    if let Some(d) = entry.duration {
        if d < 0 {
            return Err(format!("duration must not be negative, got {d}"));
        }
    }
    Ok(())
}

/// Assess urgency. Missing ratings count as zero.
pub fn assess(entry: &SymptomEntry) -> Triage {
    let wheeze = entry.wheeze_rating.unwrap_or(0);
    let cough = entry.cough_rating.unwrap_or(0);
    let dyspnea = entry.dyspnea_rating.unwrap_or(0);
    let night = entry.night_symptoms_rating.unwrap_or(0);
    let total = wheeze + cough + dyspnea + night;

    if dyspnea >= 4 || wheeze >= 4 || total >= 15 {
        Triage {
            urgency: Zone::Red,
            message: "Severe symptoms. Use your reliever inhaler now and seek medical help \
                      immediately.",
            actions: vec![
                "Use your reliever inhaler immediately",
                "Contact your doctor or emergency services",
                "Notify an emergency contact",
            ],
        }
    } else if dyspnea >= 3
        || wheeze >= 3
        || night >= 3
        || total >= 8
        || entry.dust_exposure
        || entry.smoke_exposure
    {
        Triage {
            urgency: Zone::Yellow,
            message: "Moderate symptoms. Follow the Yellow Zone steps of your asthma action plan.",
            actions: vec![
                "Use your reliever inhaler",
                "Avoid known triggers such as dust and smoke",
                "Record a peak flow reading",
            ],
        }
    } else {
        Triage {
            urgency: Zone::Green,
            message: "Mild or no symptoms. Continue with your regular treatment plan.",
            actions: vec!["Keep taking your controller medication as prescribed"],
        }
    }
}
