use crate::attempt::Attempt;
use crate::session::{PuzzleCompletion, Recording, Session, TracingAttempt};
use crate::util::std_dev;
use chrono::Local;
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension, Result};
use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};

/// Document store for session progress, keyed by the
/// (therapist code, child username, session id) triple.
///
/// Writes follow a read-modify-write discipline with no optimistic locking:
/// two concurrent saves for the same session can race and the last writer
/// wins. Sessions are bounded to tens of attempts, so every save recomputes
/// the cached analysis from the full attempt list.
#[derive(Debug)]
pub struct SessionStore {
    conn: Connection,
}

impl SessionStore {
    /// Open (or create) the store at the default location
    pub fn open_default() -> Result<Self> {
        let db_path = Self::default_db_path().unwrap_or_else(|| PathBuf::from("typeling.db"));
        Self::open(&db_path)
    }

    /// Open (or create) the store at an explicit path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(SessionStore { conn })
    }

    /// In-memory store, used by tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(SessionStore { conn })
    }

    /// Database file under $HOME/.local/state/typeling
    fn default_db_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("typeling");
            Some(state_dir.join("sessions.db"))
        } else if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "typeling") {
            Some(proj_dirs.data_local_dir().join("sessions.db"))
        } else {
            None
        }
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                therapist_code TEXT NOT NULL,
                child_username TEXT NOT NULL,
                session_id TEXT NOT NULL UNIQUE,
                document TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sessions_roster ON sessions(therapist_code, child_username)",
            [],
        )?;

        Ok(())
    }

    /// Start a new session for a child, seeded with the given themes.
    /// The generated id is opaque and unique across the store.
    pub fn create_session(
        &self,
        therapist_code: &str,
        child_username: &str,
        assigned_themes: &[String],
    ) -> Result<Session> {
        let session = Session::new(generate_session_id(), assigned_themes.to_vec());

        let document = to_document(&session)?;
        self.conn.execute(
            r#"
            INSERT INTO sessions (therapist_code, child_username, session_id, document, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                therapist_code,
                child_username,
                session.session_id,
                document,
                Local::now().to_rfc3339(),
            ],
        )?;

        Ok(session)
    }

    pub fn load_session(
        &self,
        therapist_code: &str,
        child_username: &str,
        session_id: &str,
    ) -> Result<Option<Session>> {
        let document: Option<String> = self
            .conn
            .query_row(
                r#"
                SELECT document FROM sessions
                WHERE therapist_code = ?1 AND child_username = ?2 AND session_id = ?3
                "#,
                params![therapist_code, child_username, session_id],
                |row| row.get(0),
            )
            .optional()?;

        document.map(|doc| from_document(&doc)).transpose()
    }

    /// Persist the full session document, replacing what was stored
    pub fn save_session(
        &self,
        therapist_code: &str,
        child_username: &str,
        session: &Session,
    ) -> Result<()> {
        let document = to_document(session)?;
        self.conn.execute(
            r#"
            UPDATE sessions SET document = ?4, updated_at = ?5
            WHERE therapist_code = ?1 AND child_username = ?2 AND session_id = ?3
            "#,
            params![
                therapist_code,
                child_username,
                session.session_id,
                document,
                Local::now().to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Append attempts to a session, recompute its analysis over the FULL
    /// updated attempt list and persist the result. Returns the saved
    /// session.
    pub fn record_attempts(
        &self,
        therapist_code: &str,
        child_username: &str,
        session_id: &str,
        attempts: Vec<Attempt>,
    ) -> Result<Session> {
        self.update_session(therapist_code, child_username, session_id, |session| {
            for attempt in attempts {
                session.append_attempt(attempt);
            }
            session.refresh_analysis();
        })
    }

    /// Log a theme switch; repeats are recorded too
    pub fn log_theme_change(
        &self,
        therapist_code: &str,
        child_username: &str,
        session_id: &str,
        theme: &str,
    ) -> Result<Session> {
        self.update_session(therapist_code, child_username, session_id, |session| {
            session.themes_changed.push(theme.to_string());
        })
    }

    /// Append an emotion tag to the session's own log. Emotion readings are
    /// per-session state, never shared across children.
    pub fn log_emotion(
        &self,
        therapist_code: &str,
        child_username: &str,
        session_id: &str,
        emotion: &str,
    ) -> Result<Session> {
        self.update_session(therapist_code, child_username, session_id, |session| {
            session.emotions_of_child.push(emotion.to_string());
        })
    }

    pub fn record_puzzle(
        &self,
        therapist_code: &str,
        child_username: &str,
        session_id: &str,
        puzzle: PuzzleCompletion,
    ) -> Result<Session> {
        self.update_session(therapist_code, child_username, session_id, |session| {
            session.played_puzzles.push(puzzle);
        })
    }

    pub fn record_tracing(
        &self,
        therapist_code: &str,
        child_username: &str,
        session_id: &str,
        tracing: TracingAttempt,
    ) -> Result<Session> {
        self.update_session(therapist_code, child_username, session_id, |session| {
            session.tracing_results.push(tracing);
        })
    }

    pub fn record_recording(
        &self,
        therapist_code: &str,
        child_username: &str,
        session_id: &str,
        recording: Recording,
    ) -> Result<Session> {
        self.update_session(therapist_code, child_username, session_id, |session| {
            session.reading_recordings.push(recording);
        })
    }

    pub fn set_preferred_game(
        &self,
        therapist_code: &str,
        child_username: &str,
        session_id: &str,
        game: &str,
    ) -> Result<Session> {
        self.update_session(therapist_code, child_username, session_id, |session| {
            session.preferred_game = Some(game.to_string());
        })
    }

    /// All of a child's sessions in insertion (chronological) order
    pub fn sessions_for_child(
        &self,
        therapist_code: &str,
        child_username: &str,
    ) -> Result<Vec<Session>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT document FROM sessions
            WHERE therapist_code = ?1 AND child_username = ?2
            ORDER BY id
            "#,
        )?;

        let documents = stmt.query_map(params![therapist_code, child_username], |row| {
            row.get::<_, String>(0)
        })?;

        let mut sessions = Vec::new();
        for document in documents {
            sessions.push(from_document(&document?)?);
        }

        Ok(sessions)
    }

    /// Write a per-session progress summary for a child as CSV
    pub fn export_progress_csv<W: io::Write>(
        &self,
        therapist_code: &str,
        child_username: &str,
        writer: W,
    ) -> std::result::Result<(), Box<dyn Error>> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record([
            "session_id",
            "started_at",
            "attempts",
            "correct",
            "accuracy",
            "avg_time_ms",
            "avg_hesitations",
            "time_std_dev_ms",
            "emotional_state",
        ])?;

        for session in self.sessions_for_child(therapist_code, child_username)? {
            let analysis = match &session.typing_analysis {
                Some(snapshot) => snapshot.analysis.clone(),
                None => crate::analysis::analyze(&session.typing_results),
            };
            let times: Vec<f64> = session
                .typing_results
                .iter()
                .map(|a| a.time_spent_ms as f64)
                .collect();

            csv_writer.write_record([
                session.session_id.clone(),
                session.started_at.to_rfc3339(),
                session.typing_results.len().to_string(),
                session.correct_count().to_string(),
                analysis.overall_accuracy.to_string(),
                format!("{:.0}", analysis.metrics.avg_time_spent_ms),
                format!("{:.1}", analysis.metrics.avg_hesitations),
                format!("{:.0}", std_dev(&times).unwrap_or(0.0)),
                analysis.emotional_state.to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    fn update_session<F: FnOnce(&mut Session)>(
        &self,
        therapist_code: &str,
        child_username: &str,
        session_id: &str,
        mutate: F,
    ) -> Result<Session> {
        let mut session = self
            .load_session(therapist_code, child_username, session_id)?
            .ok_or(rusqlite::Error::QueryReturnedNoRows)?;

        mutate(&mut session);
        self.save_session(therapist_code, child_username, &session)?;
        Ok(session)
    }
}

/// Opaque, globally unique session id
fn generate_session_id() -> String {
    format!("{:032x}", rand::thread_rng().gen::<u128>())
}

fn to_document(session: &Session) -> Result<String> {
    serde_json::to_string(session).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn from_document(document: &str) -> Result<Session> {
    serde_json::from_str(document).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}
