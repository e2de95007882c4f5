use crate::analysis::{self, AnalysisResult, EmotionalState};
use crate::attempt::Attempt;
use crate::difficulty::{self, Tier};
use crate::encouragement;
use crate::wordbank::{self, WordBank};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Accuracy below which real-time feedback flags the child for support
const SUPPORT_ACCURACY_THRESHOLD: u32 = 50;

/// The next word handed to the client, with the difficulty it came from and
/// a line the therapist view can show about why it was picked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextWord {
    pub word: String,
    pub difficulty: Tier,
    pub insight: String,
}

/// Lightweight read-only feedback over an in-progress attempt list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub accuracy: u32,
    pub emotional_state: EmotionalState,
    pub encouragement: String,
    pub needs_support: bool,
    pub suggested_difficulty: Tier,
}

/// First word of a session: always drawn from the medium tier
pub fn generate_initial_word(bank: &WordBank, rng: &mut impl Rng) -> String {
    bank.tier(Tier::Medium)
        .choose(rng)
        .cloned()
        .expect("medium tier is never empty")
}

/// Next practice word given the session so far
pub fn generate_next_word(
    bank: &WordBank,
    history: &[Attempt],
    used_words: &[String],
    difficulty_override: Option<Tier>,
    rng: &mut impl Rng,
) -> NextWord {
    let selection = wordbank::select(bank, history, used_words, difficulty_override, rng);

    let insight = match selection.targeted_letter {
        Some(letter) => format!(
            "Practicing the letter {} with a {} word",
            letter.to_ascii_uppercase(),
            selection.difficulty
        ),
        None => format!("Keeping a steady mix of {} words", selection.difficulty),
    };

    NextWord {
        word: selection.word,
        difficulty: selection.difficulty,
        insight,
    }
}

/// A fixed-length practice list for a session. Each word is selected the
/// same way single picks are and fed back into the used list, so the
/// exercise never repeats itself before the bank runs out.
pub fn generate_exercise(
    bank: &WordBank,
    history: &[Attempt],
    used_words: &[String],
    difficulty_override: Option<Tier>,
    count: usize,
    rng: &mut impl Rng,
) -> Vec<String> {
    let mut used = used_words.to_vec();
    let mut words = Vec::with_capacity(count);

    for _ in 0..count {
        let selection = wordbank::select(bank, history, &used, difficulty_override, rng);
        used.push(selection.word.clone());
        words.push(selection.word);
    }

    words
}

/// Full analysis over a session's attempt list. Also run automatically
/// after every attempt-save by the session store.
pub fn analyze_session(history: &[Attempt]) -> AnalysisResult {
    analysis::analyze(history)
}

pub fn real_time_feedback(partial_history: &[Attempt], rng: &mut impl Rng) -> Feedback {
    let analysis = analysis::analyze_with_rng(partial_history, rng);

    let needs_support = analysis.overall_accuracy < SUPPORT_ACCURACY_THRESHOLD
        || matches!(
            analysis.emotional_state,
            EmotionalState::Struggling | EmotionalState::Frustrated
        );

    Feedback {
        accuracy: analysis.overall_accuracy,
        emotional_state: analysis.emotional_state,
        encouragement: encouragement::pick(analysis.emotional_state, rng),
        needs_support,
        suggested_difficulty: difficulty::estimate(partial_history),
    }
}
