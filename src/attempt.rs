use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of trailing attempts whose mistakes count double when ranking
/// trouble letters
pub const RECENCY_WINDOW: usize = 3;

/// One recorded word-typing trial. Immutable once recorded; sessions only
/// ever append these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub word: String,
    pub input: String,
    pub correct: bool,
    #[serde(default)]
    pub time_spent_ms: u64,
    #[serde(default)]
    pub hesitations: u32,
    pub completed_at: DateTime<Local>,
}

impl Attempt {
    /// Record a trial, judging correctness case-insensitively
    pub fn new(word: &str, input: &str, time_spent_ms: u64, hesitations: u32) -> Self {
        Self {
            word: word.to_string(),
            input: input.to_string(),
            correct: word.trim().eq_ignore_ascii_case(input.trim()),
            time_spent_ms,
            hesitations,
            completed_at: Local::now(),
        }
    }
}

/// Align target and typed strings position by position up to the longer
/// length. Out-of-range positions yield None on that side. Characters are
/// lowercased so letter tallies ignore case.
pub fn aligned_chars(target: &str, typed: &str) -> Vec<(Option<char>, Option<char>)> {
    let target_chars: Vec<char> = target.to_lowercase().chars().collect();
    let typed_chars: Vec<char> = typed.to_lowercase().chars().collect();
    let len = target_chars.len().max(typed_chars.len());

    (0..len)
        .map(|i| (target_chars.get(i).copied(), typed_chars.get(i).copied()))
        .collect()
}

/// Per-letter error scores over the incorrect attempts in `history`.
/// A mismatched target letter scores 2 if the attempt is among the last
/// `RECENCY_WINDOW` attempts, 1 otherwise. Excess typed characters beyond
/// the target length are not scored.
pub fn letter_error_scores(history: &[Attempt]) -> HashMap<char, u32> {
    let (scores, _) = letter_error_scores_ordered(history);
    scores
}

/// Trouble letters ranked by descending error score. Ties keep the order in
/// which the letters were first mistyped.
pub fn ranked_problem_letters(history: &[Attempt]) -> Vec<char> {
    let (scores, first_seen) = letter_error_scores_ordered(history);

    let mut letters = first_seen;
    letters.sort_by_key(|letter| std::cmp::Reverse(scores[letter]));
    letters
}

fn letter_error_scores_ordered(history: &[Attempt]) -> (HashMap<char, u32>, Vec<char>) {
    let recent_start = history.len().saturating_sub(RECENCY_WINDOW);
    let mut scores: HashMap<char, u32> = HashMap::new();
    let mut first_seen: Vec<char> = Vec::new();

    for (idx, attempt) in history.iter().enumerate() {
        if attempt.correct {
            continue;
        }
        let weight = if idx >= recent_start { 2 } else { 1 };

        for (target, typed) in aligned_chars(&attempt.word, &attempt.input) {
            let Some(target) = target else { continue };
            if typed == Some(target) {
                continue;
            }
            if !scores.contains_key(&target) {
                first_seen.push(target);
            }
            *scores.entry(target).or_insert(0) += weight;
        }
    }

    (scores, first_seen)
}
