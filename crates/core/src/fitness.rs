//! Goal progress and coaching copy for fitness stats.

use serde::Serialize;

use crate::model::StatKind;

const HEALTHY_HEART_MIN: f64 = 60.0;
const HEALTHY_HEART_MAX: f64 = 100.0;
/// Beats above the healthy range at which heart progress reaches zero.
const HEART_FALLOFF: f64 = 20.0;

/// How close `value` is to the goal, 0–100.
///
/// Heart rate scores the distance from the 60–100 bpm band instead of a goal.
#[must_use]
pub fn progress_percentage(kind: StatKind, value: f64, goal: f64) -> f64 {
    match kind {
        StatKind::Heart => {
            if (HEALTHY_HEART_MIN..=HEALTHY_HEART_MAX).contains(&value) {
                100.0
            } else if value < HEALTHY_HEART_MIN {
                value / HEALTHY_HEART_MIN * 100.0
            } else {
                (100.0 - (value - HEALTHY_HEART_MAX) / HEART_FALLOFF * 100.0).max(0.0)
            }
        }
        _ if goal <= 0.0 => 100.0,
        _ => (value / goal * 100.0).min(100.0),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressMessage {
    pub message: String,
    pub subtext: String,
}

impl ProgressMessage {
    fn new(message: &str, subtext: impl Into<String>) -> Self {
        Self {
            message: message.to_owned(),
            subtext: subtext.into(),
        }
    }
}

/// Headline and detail line shown on a stat's page.
#[must_use]
pub fn progress_message(kind: StatKind, value: f64, goal: f64) -> ProgressMessage {
    let progress = if goal > 0.0 { value / goal * 100.0 } else { 100.0 };
    let short = goal - value;
    match kind {
        StatKind::Sleep if progress >= 100.0 => ProgressMessage::new(
            "Perfect Sleep Schedule!",
            format!("Keep maintaining {goal} hours of sleep"),
        ),
        StatKind::Sleep if progress >= 90.0 => {
            ProgressMessage::new("Almost There!", "Just a few more minutes of sleep")
        }
        StatKind::Sleep => ProgressMessage::new(
            "Room for Improvement",
            format!("{short:.1} more hours for ideal sleep"),
        ),
        StatKind::Steps if progress >= 100.0 => {
            ProgressMessage::new("Goal Achieved!", "You've hit your daily step goal")
        }
        StatKind::Steps if progress >= 75.0 => {
            ProgressMessage::new("Keep Going!", format!("{short:.0} steps to go"))
        }
        StatKind::Steps => {
            ProgressMessage::new("Time to Move", format!("{short:.0} steps remaining today"))
        }
        StatKind::Water if progress >= 100.0 => {
            ProgressMessage::new("Well Hydrated!", "You've met your water intake goal")
        }
        StatKind::Water if progress >= 75.0 => {
            ProgressMessage::new("Almost There!", format!("{short:.1}L more to go"))
        }
        StatKind::Water => {
            ProgressMessage::new("Stay Hydrated", format!("{short:.1}L remaining today"))
        }
        StatKind::Heart if (HEALTHY_HEART_MIN..=HEALTHY_HEART_MAX).contains(&value) => {
            ProgressMessage::new("Healthy Heart Rate", "Your heart rate is in the normal range")
        }
        StatKind::Heart if value < HEALTHY_HEART_MIN => {
            ProgressMessage::new("Athletic Heart Rate", "Your heart rate is lower than average")
        }
        StatKind::Heart => {
            ProgressMessage::new("Elevated Heart Rate", "Consider some relaxation techniques")
        }
    }
}

/// Dashboard steps ring fill. Not capped, so 12k of 10k steps is 120.
#[must_use]
pub fn steps_ring_percent(steps: f64, goal: f64) -> u32 {
    if goal <= 0.0 {
        return 0;
    }
    // non-negative and far below u32::MAX for any real step count
    (steps / goal * 100.0).round().max(0.0) as u32
}
