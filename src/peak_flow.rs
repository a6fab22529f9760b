//! Peak-flow zone classification and trend.
//!
//! Pure functions: no I/O, no clock. The recording service feeds them the
//! baseline and the previous reading and persists the result.

use serde::Serialize;

use crate::models::{PefrRecord, Trend, Zone};

pub const GREEN_THRESHOLD: f64 = 80.0;
pub const YELLOW_THRESHOLD: f64 = 50.0;

pub const GUIDANCE_UNKNOWN: &str = "Please set your baseline PEFR in your profile.";
pub const GUIDANCE_GREEN: &str =
    "You are in the Green Zone. Continue with your regular treatment plan.";
pub const GUIDANCE_YELLOW: &str = "You are in the Yellow Zone. Use your reliever inhaler. \
     Follow your asthma action plan for the Yellow Zone.";
pub const GUIDANCE_RED: &str = "You are in the Red Zone. This is a medical emergency. \
     Use your reliever inhaler immediately and seek medical help.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub zone: Zone,
    pub guidance: &'static str,
    pub percentage: f64,
}

/// Classify a reading against the patient's baseline.
///
/// No baseline (or a zero baseline) yields `Unknown` at 0%. Otherwise
/// `>= 80%` is Green, `>= 50%` Yellow, anything lower Red.
pub fn classify(baseline: Option<u32>, reading: i64) -> Classification {
    let baseline = match baseline {
        Some(b) if b > 0 => b,
        _ => {
            return Classification {
                zone: Zone::Unknown,
                guidance: GUIDANCE_UNKNOWN,
                percentage: 0.0,
            }
        }
    };

    let percentage = reading as f64 * 100.0 / f64::from(baseline);
    let zone = if percentage >= GREEN_THRESHOLD {
        Zone::Green
    } else if percentage >= YELLOW_THRESHOLD {
        Zone::Yellow
    } else {
        Zone::Red
    };

    Classification {
        zone,
        guidance: guidance(zone),
        percentage,
    }
}

pub fn guidance(zone: Zone) -> &'static str {
    match zone {
        Zone::Unknown => GUIDANCE_UNKNOWN,
        Zone::Green => GUIDANCE_GREEN,
        Zone::Yellow => GUIDANCE_YELLOW,
        Zone::Red => GUIDANCE_RED,
    }
}

/// Single-step comparison of a new value against the previous reading.
pub fn trend(previous: Option<i64>, new_value: i64) -> Trend {
    match previous {
        None => Trend::Stable,
        Some(prev) if new_value > prev => Trend::Improving,
        Some(prev) if new_value < prev => Trend::Worsening,
        Some(_) => Trend::Stable,
    }
}

/// The most recent reading in an unordered history: latest `recorded_at`,
/// equal timestamps resolved to the highest id.
pub fn most_recent(history: &[PefrRecord]) -> Option<&PefrRecord> {
    history
        .iter()
        .max_by(|a, b| a.recorded_at.cmp(&b.recorded_at).then(a.id.cmp(&b.id)))
}

/// Trend of `new_value` relative to an unordered reading history.
pub fn trend_from_history(history: &[PefrRecord], new_value: i64) -> Trend {
    trend(most_recent(history).map(|r| r.pefr_value), new_value)
}
