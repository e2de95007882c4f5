use clap::{Parser, Subcommand};
use std::error::Error;
use std::fs::File;
use std::io;
use std::path::PathBuf;

use typeling::attempt::Attempt;
use typeling::config::{ConfigStore, FileConfigStore};
use typeling::difficulty::Tier;
use typeling::encouragement;
use typeling::engine::{self, NextWord};
use typeling::store::SessionStore;
use typeling::wordbank::WordBank;

/// adaptive typing practice for pediatric therapy sessions
#[derive(Parser, Debug)]
#[clap(
    version,
    about,
    long_about = "Adaptive typing-practice engine: picks practice words that target a child's trouble letters, analyzes per-letter error patterns, and tracks progress per session."
)]
struct Cli {
    /// path to the session database (defaults to the user state directory)
    #[clap(long, global = true)]
    db: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a new session for a child and print its id
    Start {
        #[clap(short, long)]
        child: String,
        /// theme to seed the session with, repeatable
        #[clap(short, long)]
        theme: Vec<String>,
    },
    /// Pick the next practice word for a session
    Word {
        #[clap(short, long)]
        child: String,
        #[clap(short, long)]
        session: String,
        /// difficulty override instead of the estimated tier
        #[clap(short, long, value_enum)]
        difficulty: Option<Tier>,
    },
    /// Print a practice word list for a session, one word per line
    Exercise {
        #[clap(short, long)]
        child: String,
        #[clap(short, long)]
        session: String,
        /// number of words, defaults to the configured exercise length
        #[clap(short = 'n', long)]
        count: Option<usize>,
        /// difficulty override instead of the estimated tier
        #[clap(short, long, value_enum)]
        difficulty: Option<Tier>,
    },
    /// Record a typed attempt and refresh the session analysis
    Attempt {
        #[clap(short, long)]
        child: String,
        #[clap(short, long)]
        session: String,
        word: String,
        input: String,
        #[clap(long, default_value_t = 0)]
        time_ms: u64,
        #[clap(long, default_value_t = 0)]
        hesitations: u32,
    },
    /// Print the full analysis of a session's attempts
    Analyze {
        #[clap(short, long)]
        child: String,
        #[clap(short, long)]
        session: String,
    },
    /// Quick feedback over the session so far
    Feedback {
        #[clap(short, long)]
        child: String,
        #[clap(short, long)]
        session: String,
    },
    /// Log an emotion reading for a session
    Emotion {
        #[clap(short, long)]
        child: String,
        #[clap(short, long)]
        session: String,
        emotion: String,
    },
    /// Log a theme switch for a session
    Theme {
        #[clap(short, long)]
        child: String,
        #[clap(short, long)]
        session: String,
        theme: String,
    },
    /// Export a per-session progress report as CSV
    Report {
        #[clap(short, long)]
        child: String,
        /// output file, stdout when omitted
        #[clap(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = FileConfigStore::new().load();
    let therapist = config.therapist_code.clone();

    let store = match &cli.db {
        Some(path) => SessionStore::open(path)?,
        None => SessionStore::open_default()?,
    };
    let mut rng = rand::thread_rng();

    match cli.command {
        Command::Start { child, theme } => {
            let session = store.create_session(&therapist, &child, &theme)?;
            println!("{}", session.session_id);
        }
        Command::Word {
            child,
            session,
            difficulty,
        } => {
            let session = store
                .load_session(&therapist, &child, &session)?
                .ok_or("session not found")?;
            let bank = WordBank::load();

            let next = if session.typing_results.is_empty() && difficulty.is_none() {
                // first word of a session always comes from the medium tier
                NextWord {
                    word: engine::generate_initial_word(&bank, &mut rng),
                    difficulty: Tier::Medium,
                    insight: "Starting out with a medium word".to_string(),
                }
            } else {
                engine::generate_next_word(
                    &bank,
                    &session.typing_results,
                    &session.used_words(),
                    difficulty.or(config.default_difficulty),
                    &mut rng,
                )
            };
            println!("{}", serde_json::to_string_pretty(&next)?);
        }
        Command::Exercise {
            child,
            session,
            count,
            difficulty,
        } => {
            let session = store
                .load_session(&therapist, &child, &session)?
                .ok_or("session not found")?;
            let bank = WordBank::load();

            let words = engine::generate_exercise(
                &bank,
                &session.typing_results,
                &session.used_words(),
                difficulty.or(config.default_difficulty),
                count.unwrap_or(config.words_per_exercise),
                &mut rng,
            );
            for word in words {
                println!("{word}");
            }
        }
        Command::Attempt {
            child,
            session,
            word,
            input,
            time_ms,
            hesitations,
        } => {
            let attempt = Attempt::new(&word, &input, time_ms, hesitations);
            let saved = store.record_attempts(&therapist, &child, &session, vec![attempt])?;
            let snapshot = saved
                .typing_analysis
                .as_ref()
                .expect("analysis refreshed on save");
            println!(
                "recorded attempt {} of {}: accuracy {}%, {}",
                snapshot.attempt_count,
                saved.session_id,
                snapshot.analysis.overall_accuracy,
                snapshot.analysis.encouragement
            );
        }
        Command::Analyze { child, session } => {
            let session = store
                .load_session(&therapist, &child, &session)?
                .ok_or("session not found")?;
            let analysis = engine::analyze_session(&session.typing_results);
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        Command::Feedback { child, session } => {
            let session = store
                .load_session(&therapist, &child, &session)?
                .ok_or("session not found")?;
            let feedback = engine::real_time_feedback(&session.typing_results, &mut rng);
            println!("{}", serde_json::to_string_pretty(&feedback)?);
        }
        Command::Emotion {
            child,
            session,
            emotion,
        } => {
            let saved = store.log_emotion(&therapist, &child, &session, &emotion)?;
            println!(
                "logged emotion '{}' ({} so far): {}",
                emotion,
                saved.emotions_of_child.len(),
                encouragement::pick_for_label(&emotion, &mut rng)
            );
        }
        Command::Theme {
            child,
            session,
            theme,
        } => {
            let saved = store.log_theme_change(&therapist, &child, &session, &theme)?;
            println!(
                "switched theme to '{}' ({} switches so far)",
                theme,
                saved.themes_changed.len()
            );
        }
        Command::Report { child, out } => match out {
            Some(path) => {
                store.export_progress_csv(&therapist, &child, File::create(path)?)?;
            }
            None => {
                store.export_progress_csv(&therapist, &child, io::stdout().lock())?;
            }
        },
    }

    Ok(())
}
