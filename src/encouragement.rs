use crate::analysis::EmotionalState;
use rand::seq::SliceRandom;
use rand::Rng;

const EXCELLING: &[&str] = &[
    "Wow! You're a typing superstar!",
    "Incredible work! Those fingers are flying!",
    "Amazing! You got almost every word right!",
    "Fantastic typing! Keep shining!",
];

const CONFIDENT: &[&str] = &[
    "Great job! You're getting better every day!",
    "Nice typing! You should be proud!",
    "Well done! Your hard work is paying off!",
    "Keep it up! You're doing really well!",
];

const CHALLENGED: &[&str] = &[
    "Good effort! Tricky words make us stronger!",
    "You're working hard and it shows!",
    "Nice try! Every practice makes you better!",
    "Keep going! You're learning so much!",
];

const STRUGGLING: &[&str] = &[
    "It's okay! Everyone learns at their own pace!",
    "Don't give up! You're braver than you think!",
    "Nice effort! Let's try some easier words together!",
    "You showed up and practiced, and that's what counts!",
];

const FRUSTRATED: &[&str] = &[
    "Let's take a deep breath! You're doing fine!",
    "It's okay to find this hard. A little break can help!",
    "You're trying so hard! Let's slow down together!",
    "No rush! One letter at a time!",
];

fn pool_for(state: EmotionalState) -> &'static [&'static str] {
    match state {
        EmotionalState::Excelling => EXCELLING,
        EmotionalState::Confident => CONFIDENT,
        EmotionalState::Challenged => CHALLENGED,
        EmotionalState::Struggling => STRUGGLING,
        EmotionalState::Frustrated => FRUSTRATED,
    }
}

/// One encouragement line drawn uniformly from the pool for the given
/// emotional state
pub fn pick(state: EmotionalState, rng: &mut impl Rng) -> String {
    pool_for(state)
        .choose(rng)
        .copied()
        .unwrap_or("Keep it up! You're doing really well!")
        .to_string()
}

/// Pick from a stored label; unrecognized labels fall back to the confident
/// pool
pub fn pick_for_label(label: &str, rng: &mut impl Rng) -> String {
    pick(EmotionalState::from_label(label), rng)
}
