use crate::difficulty::Tier;
use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;
use std::collections::HashSet;
use std::error::Error;

static WORDS_DIR: Dir = include_dir!("src/words");

/// One tier's vocabulary list as stored on disk
#[derive(Deserialize, Clone, Debug)]
pub struct TierWords {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

/// The static, tiered practice vocabulary. Immutable for the lifetime of the
/// process; the tiers are disjoint.
#[derive(Clone, Debug)]
pub struct WordBank {
    easy: TierWords,
    medium: TierWords,
    hard: TierWords,
}

impl WordBank {
    pub fn load() -> Self {
        Self {
            easy: read_tier_from_file("easy.json").unwrap(),
            medium: read_tier_from_file("medium.json").unwrap(),
            hard: read_tier_from_file("hard.json").unwrap(),
        }
    }

    pub fn tier(&self, tier: Tier) -> &[String] {
        match tier {
            Tier::Easy => &self.easy.words,
            Tier::Medium => &self.medium.words,
            Tier::Hard => &self.hard.words,
        }
    }

    /// Flattened view of every word across tiers, deduplicated
    /// case-insensitively, first occurrence wins.
    pub fn all_words(&self) -> Vec<String> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut all = Vec::new();
        for tier in [Tier::Easy, Tier::Medium, Tier::Hard] {
            for word in self.tier(tier) {
                if seen.insert(word.to_lowercase()) {
                    all.push(word.clone());
                }
            }
        }
        all
    }
}

impl Default for WordBank {
    fn default() -> Self {
        Self::load()
    }
}

fn read_tier_from_file(file_name: &str) -> Result<TierWords, Box<dyn Error>> {
    let file = WORDS_DIR.get_file(file_name).expect("Word file not found");

    let file_as_str = file
        .contents_utf8()
        .expect("Unable to interpret file as a string");

    let tier = from_str(file_as_str).expect("Unable to deserialize word bank json");

    Ok(tier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_bank() {
        let bank = WordBank::load();

        assert_eq!(bank.easy.name, "easy");
        assert_eq!(bank.medium.name, "medium");
        assert_eq!(bank.hard.name, "hard");
        assert!(!bank.tier(Tier::Easy).is_empty());
        assert!(!bank.tier(Tier::Medium).is_empty());
        assert!(!bank.tier(Tier::Hard).is_empty());
    }

    #[test]
    fn test_tiers_are_disjoint() {
        let bank = WordBank::load();
        let easy: HashSet<&String> = bank.tier(Tier::Easy).iter().collect();
        let medium: HashSet<&String> = bank.tier(Tier::Medium).iter().collect();
        let hard: HashSet<&String> = bank.tier(Tier::Hard).iter().collect();

        assert!(easy.is_disjoint(&medium));
        assert!(easy.is_disjoint(&hard));
        assert!(medium.is_disjoint(&hard));
    }

    #[test]
    fn test_all_words_deduplicates() {
        let bank = WordBank::load();
        let all = bank.all_words();
        let unique: HashSet<String> = all.iter().map(|w| w.to_lowercase()).collect();

        assert_eq!(all.len(), unique.len());
        let tier_total = bank.tier(Tier::Easy).len()
            + bank.tier(Tier::Medium).len()
            + bank.tier(Tier::Hard).len();
        assert!(all.len() <= tier_total);
    }

    #[test]
    fn test_sizes_match_word_counts() {
        let bank = WordBank::load();
        assert_eq!(bank.easy.size as usize, bank.easy.words.len());
        assert_eq!(bank.medium.size as usize, bank.medium.words.len());
        assert_eq!(bank.hard.size as usize, bank.hard.words.len());
    }

    #[test]
    fn test_tier_words_deserialization() {
        let json_data = r#"
        {
            "name": "test",
            "size": 2,
            "words": ["hello", "world"]
        }
        "#;

        let tier: TierWords = from_str(json_data).expect("Failed to deserialize tier");

        assert_eq!(tier.name, "test");
        assert_eq!(tier.size, 2);
        assert_eq!(tier.words.len(), 2);
    }

    #[test]
    #[should_panic(expected = "Word file not found")]
    fn test_read_nonexistent_word_file() {
        let _result = read_tier_from_file("nonexistent.json");
    }
}
