use super::core::WordBank;
use crate::attempt::{ranked_problem_letters, Attempt};
use crate::difficulty::{self, Tier};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// How many of the highest-scoring problem letters get a shot at narrowing
/// the candidate pool
const PROBLEM_LETTER_LIMIT: usize = 3;

/// Outcome of a word selection
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub word: String,
    pub difficulty: Tier,
    /// The trouble letter the pick was narrowed to, when one applied
    pub targeted_letter: Option<char>,
}

/// Pick the next practice word.
///
/// The candidate pool is the requested (or estimated) tier minus the words
/// already used this session. An exhausted tier falls back to the whole
/// deduplicated bank minus used words, then to the whole bank unfiltered,
/// at which point repetition is unavoidable. The pool is narrowed to words
/// containing the child's highest-scoring trouble letter that still leaves
/// candidates; the final pick within the pool is uniformly random.
pub fn select(
    bank: &WordBank,
    history: &[Attempt],
    used_words: &[String],
    requested: Option<Tier>,
    rng: &mut impl Rng,
) -> Selection {
    let tier = requested.unwrap_or_else(|| difficulty::estimate(history));
    let used: HashSet<String> = used_words.iter().map(|w| w.to_lowercase()).collect();

    let mut pool: Vec<String> = bank
        .tier(tier)
        .iter()
        .filter(|w| !used.contains(&w.to_lowercase()))
        .cloned()
        .collect();
    if pool.is_empty() {
        pool = bank
            .all_words()
            .into_iter()
            .filter(|w| !used.contains(&w.to_lowercase()))
            .collect();
    }
    if pool.is_empty() {
        pool = bank.all_words();
    }

    for letter in ranked_problem_letters(history)
        .into_iter()
        .take(PROBLEM_LETTER_LIMIT)
    {
        let narrowed: Vec<&String> = pool
            .iter()
            .filter(|w| w.to_lowercase().contains(letter))
            .collect();
        if let Some(word) = narrowed.choose(rng) {
            return Selection {
                word: (*word).clone(),
                difficulty: tier,
                targeted_letter: Some(letter),
            };
        }
    }

    let word = pool
        .choose(rng)
        .cloned()
        .expect("word bank tiers are never empty");
    Selection {
        word,
        difficulty: tier,
        targeted_letter: None,
    }
}
