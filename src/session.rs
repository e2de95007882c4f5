use crate::analysis::{self, AnalysisResult};
use crate::attempt::Attempt;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A finished puzzle round, carried in the session document for reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleCompletion {
    pub puzzle_name: String,
    pub pieces: u32,
    pub solved: bool,
    #[serde(default)]
    pub time_spent_ms: u64,
    pub completed_at: DateTime<Local>,
}

/// One traced letter and how well it matched the stroke template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracingAttempt {
    pub letter: char,
    pub score: f64,
    pub completed_at: DateTime<Local>,
}

/// Metadata for a reading recording; the audio itself lives elsewhere
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    pub story_title: String,
    #[serde(default)]
    pub duration_ms: u64,
    pub recorded_at: DateTime<Local>,
}

/// The cached typing analysis, stamped with when it was computed and the
/// attempt counts it saw. Refreshed from the full attempt list on every
/// save, never patched incrementally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSnapshot {
    pub analysis: AnalysisResult,
    pub computed_at: DateTime<Local>,
    pub attempt_count: usize,
    pub correct_count: usize,
}

/// One continuous play period for a child. Append-only: attempts, theme
/// switches and emotion tags are logged in order and never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub started_at: DateTime<Local>,
    #[serde(default)]
    pub assigned_themes: Vec<String>,
    #[serde(default)]
    pub themes_changed: Vec<String>,
    #[serde(default)]
    pub emotions_of_child: Vec<String>,
    #[serde(default)]
    pub played_puzzles: Vec<PuzzleCompletion>,
    #[serde(default)]
    pub typing_results: Vec<Attempt>,
    #[serde(default)]
    pub typing_results_map: HashMap<String, String>,
    #[serde(default)]
    pub typing_analysis: Option<AnalysisSnapshot>,
    #[serde(default)]
    pub tracing_results: Vec<TracingAttempt>,
    #[serde(default)]
    pub reading_recordings: Vec<Recording>,
    #[serde(default)]
    pub preferred_game: Option<String>,
}

impl Session {
    pub fn new(session_id: String, assigned_themes: Vec<String>) -> Self {
        Self {
            session_id,
            started_at: Local::now(),
            assigned_themes,
            themes_changed: Vec::new(),
            emotions_of_child: Vec::new(),
            played_puzzles: Vec::new(),
            typing_results: Vec::new(),
            typing_results_map: HashMap::new(),
            typing_analysis: None,
            tracing_results: Vec::new(),
            reading_recordings: Vec::new(),
            preferred_game: None,
        }
    }

    /// Append one attempt and keep the last-input-per-word index current.
    /// A later attempt on the same word overwrites the indexed input.
    pub fn append_attempt(&mut self, attempt: Attempt) {
        self.typing_results_map
            .insert(attempt.word.clone(), attempt.input.clone());
        self.typing_results.push(attempt);
    }

    pub fn correct_count(&self) -> usize {
        self.typing_results.iter().filter(|a| a.correct).count()
    }

    /// Words already practiced this session, for selection filtering
    pub fn used_words(&self) -> Vec<String> {
        self.typing_results.iter().map(|a| a.word.clone()).collect()
    }

    /// Recompute the cached analysis over the full attempt list and stamp it
    pub fn refresh_analysis(&mut self) {
        self.typing_analysis = Some(AnalysisSnapshot {
            analysis: analysis::analyze(&self.typing_results),
            computed_at: Local::now(),
            attempt_count: self.typing_results.len(),
            correct_count: self.correct_count(),
        });
    }
}

/// A child's roster entry: long-lived preferences that seed each new
/// session, plus the sessions themselves in chronological order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub username: String,
    #[serde(default)]
    pub current_assigned_themes: Vec<String>,
    #[serde(default)]
    pub assigned_games: Vec<String>,
    #[serde(default)]
    pub completed_games: Vec<String>,
    #[serde(default)]
    pub preferred_story: Option<String>,
    #[serde(default)]
    pub sessions: Vec<Session>,
}

impl Child {
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            current_assigned_themes: Vec::new(),
            assigned_games: Vec::new(),
            completed_games: Vec::new(),
            preferred_story: None,
            sessions: Vec::new(),
        }
    }

    /// Open a new session seeded from the child's current theme assignments
    pub fn start_session(&mut self, session_id: String) -> &mut Session {
        let session = Session::new(session_id, self.current_assigned_themes.clone());
        self.sessions.push(session);
        self.sessions.last_mut().expect("session just pushed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new("abc123".to_string(), vec!["space".to_string()])
    }

    #[test]
    fn test_new_session_is_empty() {
        let s = session();
        assert_eq!(s.session_id, "abc123");
        assert_eq!(s.assigned_themes, vec!["space".to_string()]);
        assert!(s.typing_results.is_empty());
        assert!(s.typing_analysis.is_none());
        assert!(s.preferred_game.is_none());
    }

    #[test]
    fn test_append_attempt_updates_map_with_latest_input() {
        let mut s = session();
        s.append_attempt(Attempt::new("cat", "bat", 1000, 0));
        s.append_attempt(Attempt::new("cat", "cat", 1000, 0));
        s.append_attempt(Attempt::new("dog", "dog", 1000, 0));

        assert_eq!(s.typing_results.len(), 3);
        // the index keeps the most recent input, not the most accurate one
        assert_eq!(s.typing_results_map["cat"], "cat");
        assert_eq!(s.typing_results_map["dog"], "dog");

        s.append_attempt(Attempt::new("cat", "kat", 1000, 0));
        assert_eq!(s.typing_results_map["cat"], "kat");
        assert_eq!(s.typing_results.len(), 4);
    }

    #[test]
    fn test_refresh_analysis_stamps_counts() {
        let mut s = session();
        s.append_attempt(Attempt::new("cat", "cat", 1000, 0));
        s.append_attempt(Attempt::new("cat", "bat", 1000, 0));
        s.refresh_analysis();

        let snapshot = s.typing_analysis.as_ref().unwrap();
        assert_eq!(snapshot.attempt_count, 2);
        assert_eq!(snapshot.correct_count, 1);
        assert_eq!(snapshot.analysis.overall_accuracy, 50);
    }

    #[test]
    fn test_used_words_in_order() {
        let mut s = session();
        s.append_attempt(Attempt::new("cat", "cat", 1000, 0));
        s.append_attempt(Attempt::new("dog", "dig", 1000, 0));
        assert_eq!(s.used_words(), vec!["cat".to_string(), "dog".to_string()]);
    }

    #[test]
    fn test_child_seeds_session_from_current_themes() {
        let mut child = Child::new("mila");
        child.current_assigned_themes = vec!["ocean".to_string(), "space".to_string()];

        let session = child.start_session("s1".to_string());
        assert_eq!(
            session.assigned_themes,
            vec!["ocean".to_string(), "space".to_string()]
        );
        assert_eq!(child.sessions.len(), 1);
    }

    #[test]
    fn test_sessions_keep_insertion_order() {
        let mut child = Child::new("mila");
        child.start_session("first".to_string());
        child.start_session("second".to_string());

        let ids: Vec<&str> = child
            .sessions
            .iter()
            .map(|s| s.session_id.as_str())
            .collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn test_session_document_roundtrip() {
        let mut s = session();
        s.append_attempt(Attempt::new("cat", "bat", 1200, 1));
        s.themes_changed.push("ocean".to_string());
        s.emotions_of_child.push("happy".to_string());
        s.refresh_analysis();

        let json = serde_json::to_string(&s).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }

    #[test]
    fn test_document_uses_platform_field_names() {
        let s = session();
        let json = serde_json::to_value(&s).unwrap();

        assert!(json.get("sessionId").is_some());
        assert!(json.get("typingResults").is_some());
        assert!(json.get("typingResultsMap").is_some());
        assert!(json.get("emotionsOfChild").is_some());
    }

    #[test]
    fn test_missing_numeric_fields_default_to_zero() {
        let json = r#"{
            "word": "cat",
            "input": "cat",
            "correct": true,
            "completedAt": "2026-01-10T10:00:00+00:00"
        }"#;
        let attempt: Attempt = serde_json::from_str(json).unwrap();
        assert_eq!(attempt.time_spent_ms, 0);
        assert_eq!(attempt.hesitations, 0);
    }
}
