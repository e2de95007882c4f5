use crate::attempt::Attempt;
use crate::util::mean;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Difficulty tier partitioning the word bank
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tier {
    Easy,
    Medium,
    Hard,
}

/// Attempts needed before the estimate means anything
const MIN_SIGNAL: usize = 3;
/// How many trailing attempts the estimate looks at
const WINDOW: usize = 5;

const HARD_MIN_ACCURACY: f64 = 0.8;
const HARD_MAX_AVG_TIME_MS: f64 = 5000.0;
const HARD_MAX_AVG_HESITATIONS: f64 = 2.0;
const EASY_MAX_ACCURACY: f64 = 0.5;
const EASY_MIN_AVG_HESITATIONS: f64 = 3.0;
const EASY_MIN_AVG_TIME_MS: f64 = 8000.0;

/// Map a short window of recent attempts to a difficulty tier.
///
/// Fewer than three attempts is not enough signal and always yields Medium.
pub fn estimate(history: &[Attempt]) -> Tier {
    if history.len() < MIN_SIGNAL {
        return Tier::Medium;
    }

    let window = &history[history.len().saturating_sub(WINDOW)..];
    let correct = window.iter().filter(|a| a.correct).count();
    let accuracy = correct as f64 / window.len() as f64;
    let avg_time_ms = mean(
        &window
            .iter()
            .map(|a| a.time_spent_ms as f64)
            .collect::<Vec<_>>(),
    )
    .unwrap_or(0.0);
    let avg_hesitations = mean(
        &window
            .iter()
            .map(|a| f64::from(a.hesitations))
            .collect::<Vec<_>>(),
    )
    .unwrap_or(0.0);

    if accuracy >= HARD_MIN_ACCURACY
        && avg_time_ms < HARD_MAX_AVG_TIME_MS
        && avg_hesitations < HARD_MAX_AVG_HESITATIONS
    {
        Tier::Hard
    } else if accuracy < EASY_MAX_ACCURACY
        || avg_hesitations > EASY_MIN_AVG_HESITATIONS
        || avg_time_ms > EASY_MIN_AVG_TIME_MS
    {
        Tier::Easy
    } else {
        Tier::Medium
    }
}
