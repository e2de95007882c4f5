use crate::attempt::{aligned_chars, Attempt};
use crate::encouragement;
use crate::util::{mean, round1};
use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;

/// Trailing attempts used for the recent-accuracy trend
const RECENT_WINDOW: usize = 5;
/// Trouble letters named in the practice recommendation
const RECOMMENDED_LETTER_LIMIT: usize = 5;
/// Confusion pairs named in the mix-up recommendation
const RECOMMENDED_CONFUSION_LIMIT: usize = 3;
/// Mistaken-for letters kept per target letter
const CONFUSIONS_PER_LETTER: usize = 2;

const HESITATION_THRESHOLD: f64 = 2.5;
const SLOW_TIME_THRESHOLD_MS: f64 = 7000.0;
const FAST_TIME_THRESHOLD_MS: f64 = 3000.0;

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmotionalState {
    Excelling,
    Confident,
    Challenged,
    Struggling,
    Frustrated,
}

impl EmotionalState {
    /// Parse a stored label, treating anything unrecognized as Confident
    pub fn from_label(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "excelling" => EmotionalState::Excelling,
            "challenged" => EmotionalState::Challenged,
            "struggling" => EmotionalState::Struggling,
            "frustrated" => EmotionalState::Frustrated,
            _ => EmotionalState::Confident,
        }
    }
}

/// A letter and how often it was mistyped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterErrors {
    pub letter: char,
    pub errors: u32,
}

/// A letter and how often it was typed correctly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterStrength {
    pub letter: char,
    pub ok: u32,
}

/// A target letter and what it keeps being replaced with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionPattern {
    pub confuses: char,
    pub with: char,
    pub frequency: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub avg_time_spent_ms: f64,
    pub total_hesitations: u32,
    pub avg_hesitations: f64,
    pub recent_accuracy: u32,
    pub improving: bool,
}

/// Everything derived from one pass over an attempt list. Recomputable at
/// any time; given the same attempts and rng, identical apart from the
/// randomly drawn encouragement line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub overall_accuracy: u32,
    pub problematic_letters: Vec<LetterErrors>,
    pub strengths: Vec<LetterStrength>,
    pub confusion_patterns: Vec<ConfusionPattern>,
    pub severity: Severity,
    pub emotional_state: EmotionalState,
    pub recommendations: Vec<String>,
    pub encouragement: String,
    #[serde(rename = "performanceMetrics")]
    pub metrics: PerformanceMetrics,
}

pub fn analyze(attempts: &[Attempt]) -> AnalysisResult {
    analyze_with_rng(attempts, &mut rand::thread_rng())
}

pub fn analyze_with_rng(attempts: &[Attempt], rng: &mut impl Rng) -> AnalysisResult {
    if attempts.is_empty() {
        return neutral_result(rng);
    }

    let total = attempts.len();
    let correct = attempts.iter().filter(|a| a.correct).count();
    let overall_accuracy = percentage(correct, total);

    let (tallies, seen_order, error_order) = tally_letters(attempts);

    let problematic_letters: Vec<LetterErrors> = error_order
        .iter()
        .map(|&letter| LetterErrors {
            letter,
            errors: tallies[&letter].errors,
        })
        .sorted_by_key(|le| Reverse(le.errors))
        .collect();

    let strengths: Vec<LetterStrength> = seen_order
        .iter()
        .copied()
        .filter(|letter| {
            let tally = &tallies[letter];
            tally.ok >= tally.errors
        })
        .map(|letter| LetterStrength {
            letter,
            ok: tallies[&letter].ok,
        })
        .sorted_by_key(|ls| Reverse(ls.ok))
        .collect();

    let confusion_patterns: Vec<ConfusionPattern> = error_order
        .iter()
        .flat_map(|&letter| {
            tallies[&letter]
                .confusions
                .iter()
                .sorted_by_key(|(_, count)| Reverse(*count))
                .take(CONFUSIONS_PER_LETTER)
                .map(move |&(with, frequency)| ConfusionPattern {
                    confuses: letter,
                    with,
                    frequency,
                })
        })
        .collect();

    let times: Vec<f64> = attempts.iter().map(|a| a.time_spent_ms as f64).collect();
    let avg_time_spent_ms = mean(&times).unwrap_or(0.0);
    let total_hesitations: u32 = attempts.iter().map(|a| a.hesitations).sum();
    let avg_hesitations = f64::from(total_hesitations) / total as f64;

    let recent = &attempts[total.saturating_sub(RECENT_WINDOW)..];
    let recent_correct = recent.iter().filter(|a| a.correct).count();
    let recent_accuracy = percentage(recent_correct, recent.len());

    let severity = if overall_accuracy < 60 {
        Severity::Severe
    } else if overall_accuracy < 80 {
        Severity::Moderate
    } else {
        Severity::Mild
    };

    let mut emotional_state = if overall_accuracy < 60 {
        EmotionalState::Struggling
    } else if overall_accuracy < 80 {
        EmotionalState::Challenged
    } else if overall_accuracy >= 90 {
        EmotionalState::Excelling
    } else {
        EmotionalState::Confident
    };
    // The override runs after the accuracy tiers and can replace any of
    // them, an excelling run included.
    if avg_hesitations > HESITATION_THRESHOLD || avg_time_spent_ms > SLOW_TIME_THRESHOLD_MS {
        emotional_state = EmotionalState::Frustrated;
    }

    let recommendations = build_recommendations(
        &problematic_letters,
        &confusion_patterns,
        avg_hesitations,
        overall_accuracy,
        avg_time_spent_ms,
    );

    AnalysisResult {
        overall_accuracy,
        problematic_letters,
        strengths,
        confusion_patterns,
        severity,
        emotional_state,
        recommendations,
        encouragement: encouragement::pick(emotional_state, rng),
        metrics: PerformanceMetrics {
            avg_time_spent_ms,
            total_hesitations,
            avg_hesitations: round1(avg_hesitations),
            recent_accuracy,
            improving: recent_accuracy > overall_accuracy,
        },
    }
}

#[derive(Default)]
struct LetterTally {
    ok: u32,
    errors: u32,
    // mistaken-for letters with counts, in first-seen order
    confusions: Vec<(char, u32)>,
}

type TallyOutput = (HashMap<char, LetterTally>, Vec<char>, Vec<char>);

/// Walk every attempt (correct or not) and tally per-letter hits, misses and
/// confusion pairs. Returns the tallies plus the order letters were first
/// seen at all and first seen as errors, for stable ranking.
fn tally_letters(attempts: &[Attempt]) -> TallyOutput {
    let mut tallies: HashMap<char, LetterTally> = HashMap::new();
    let mut seen_order: Vec<char> = Vec::new();
    let mut error_order: Vec<char> = Vec::new();

    for attempt in attempts {
        for (target, typed) in aligned_chars(&attempt.word, &attempt.input) {
            let Some(target) = target else { continue };
            if !tallies.contains_key(&target) {
                seen_order.push(target);
            }
            let tally = tallies.entry(target).or_default();

            if typed == Some(target) {
                tally.ok += 1;
                continue;
            }

            if tally.errors == 0 {
                error_order.push(target);
            }
            tally.errors += 1;

            if let Some(typed) = typed {
                match tally.confusions.iter_mut().find(|(c, _)| *c == typed) {
                    Some((_, count)) => *count += 1,
                    None => tally.confusions.push((typed, 1)),
                }
            }
        }
    }

    (tallies, seen_order, error_order)
}

fn build_recommendations(
    problematic: &[LetterErrors],
    confusions: &[ConfusionPattern],
    avg_hesitations: f64,
    accuracy: u32,
    avg_time_ms: f64,
) -> Vec<String> {
    let mut recs = Vec::new();

    if !problematic.is_empty() {
        let letters = problematic
            .iter()
            .take(RECOMMENDED_LETTER_LIMIT)
            .map(|le| le.letter.to_ascii_uppercase().to_string())
            .join(", ");
        recs.push(format!("Focus on practicing these letters: {letters}"));
    }
    if !confusions.is_empty() {
        let pairs = confusions
            .iter()
            .take(RECOMMENDED_CONFUSION_LIMIT)
            .map(|c| {
                format!(
                    "{} typed as {}",
                    c.confuses.to_ascii_uppercase(),
                    c.with.to_ascii_uppercase()
                )
            })
            .join(", ");
        recs.push(format!("Watch for letter mix-ups: {pairs}"));
    }
    if avg_hesitations > HESITATION_THRESHOLD {
        recs.push(
            "Frequent pauses suggest uncertainty. Revisit familiar words to build confidence."
                .to_string(),
        );
    }
    if accuracy >= 90 {
        recs.push("Excellent accuracy! Ready to try harder words.".to_string());
    }
    if accuracy < 70 {
        recs.push("Accuracy is low. Repeat familiar words before introducing new ones.".to_string());
    }
    if avg_time_ms > SLOW_TIME_THRESHOLD_MS {
        recs.push("Words are taking a long time. Shorter practice rounds may help.".to_string());
    }
    if avg_time_ms < FAST_TIME_THRESHOLD_MS {
        recs.push("Quick responses! Longer words could add a healthy challenge.".to_string());
    }

    recs
}

fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

fn neutral_result(rng: &mut impl Rng) -> AnalysisResult {
    AnalysisResult {
        overall_accuracy: 0,
        problematic_letters: Vec::new(),
        strengths: Vec::new(),
        confusion_patterns: Vec::new(),
        severity: Severity::Mild,
        emotional_state: EmotionalState::Confident,
        recommendations: Vec::new(),
        encouragement: encouragement::pick(EmotionalState::Confident, rng),
        metrics: PerformanceMetrics {
            avg_time_spent_ms: 0.0,
            total_hesitations: 0,
            avg_hesitations: 0.0,
            recent_accuracy: 0,
            improving: false,
        },
    }
}
