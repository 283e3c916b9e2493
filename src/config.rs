//! Application-level configuration loading, including the question bank and
//! the round timing constants.

use std::{env, fs, io::ErrorKind, path::PathBuf, sync::Arc};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::round::Question;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TRIVIA_ROUNDS_BACK_CONFIG_PATH";

/// Seconds the join window stays open.
const DEFAULT_JOIN_WINDOW_SECS: u32 = 60;
/// Seconds each question stays active.
const DEFAULT_QUESTION_SECS: u32 = 10;
/// Question slots per round.
const DEFAULT_QUESTIONS_PER_ROUND: u32 = 1;
/// Seconds the final leaderboard stays on display.
const DEFAULT_LEADERBOARD_SECS: u32 = 10;
/// Seconds between the leaderboard clearing and the next join window.
const DEFAULT_INTERMISSION_SECS: u32 = 5;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
///
/// All values are fixed at startup; nothing here is mutable at runtime.
pub struct GameConfig {
    /// Seconds the join window stays open (`J`).
    pub join_window_secs: u32,
    /// Seconds each question stays active (`Q`).
    pub question_secs: u32,
    /// Number of question slots per round (`N`).
    pub questions_per_round: u32,
    /// Seconds the final leaderboard stays on display (`D`).
    pub leaderboard_secs: u32,
    /// Seconds of pause between rounds (`P`).
    pub intermission_secs: u32,
    /// Static question bank rounds draw from; never empty.
    pub questions: Arc<[Question]>,
}

impl GameConfig {
    /// Load the configuration from disk, falling back to the built-in
    /// defaults when the file is missing or unusable.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match parse_config(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        questions = config.questions.len(),
                        "loaded game configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        if (config.questions.len() as u32) < config.questions_per_round {
            warn!(
                bank = config.questions.len(),
                per_round = config.questions_per_round,
                "question bank smaller than questions per round; questions will repeat"
            );
        }

        config
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            join_window_secs: DEFAULT_JOIN_WINDOW_SECS,
            question_secs: DEFAULT_QUESTION_SECS,
            questions_per_round: DEFAULT_QUESTIONS_PER_ROUND,
            leaderboard_secs: DEFAULT_LEADERBOARD_SECS,
            intermission_secs: DEFAULT_INTERMISSION_SECS,
            questions: default_questions().into(),
        }
    }
}

/// Parse configuration file contents into a sanitized [`GameConfig`].
fn parse_config(contents: &str) -> serde_json::Result<GameConfig> {
    let raw: RawConfig = serde_json::from_str(contents)?;
    Ok(raw.into())
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    join_window_secs: Option<u32>,
    question_secs: Option<u32>,
    questions_per_round: Option<u32>,
    leaderboard_secs: Option<u32>,
    intermission_secs: Option<u32>,
    #[serde(default)]
    questions: Vec<RawQuestion>,
}

#[derive(Debug, Deserialize)]
/// JSON representation of a single question bank entry.
struct RawQuestion {
    text: String,
    options: Vec<String>,
    correct_index: usize,
}

impl From<RawConfig> for GameConfig {
    fn from(raw: RawConfig) -> Self {
        let mut questions = Vec::with_capacity(raw.questions.len());
        for entry in raw.questions {
            match validate_question(entry) {
                Ok(question) => questions.push(question),
                Err(reason) => warn!(%reason, "skipping invalid question bank entry"),
            }
        }

        if questions.is_empty() {
            warn!("configured question bank is empty; using built-in questions");
            questions = default_questions();
        }

        Self {
            join_window_secs: positive_or_default(
                raw.join_window_secs,
                DEFAULT_JOIN_WINDOW_SECS,
                "join_window_secs",
            ),
            question_secs: positive_or_default(
                raw.question_secs,
                DEFAULT_QUESTION_SECS,
                "question_secs",
            ),
            questions_per_round: positive_or_default(
                raw.questions_per_round,
                DEFAULT_QUESTIONS_PER_ROUND,
                "questions_per_round",
            ),
            leaderboard_secs: positive_or_default(
                raw.leaderboard_secs,
                DEFAULT_LEADERBOARD_SECS,
                "leaderboard_secs",
            ),
            intermission_secs: positive_or_default(
                raw.intermission_secs,
                DEFAULT_INTERMISSION_SECS,
                "intermission_secs",
            ),
            questions: questions.into(),
        }
    }
}

/// Check one bank entry, returning why it was rejected when invalid.
fn validate_question(raw: RawQuestion) -> Result<Question, String> {
    if raw.text.trim().is_empty() {
        return Err("question text must not be empty".into());
    }
    if raw.options.len() < 2 {
        return Err(format!("question `{}` needs at least two options", raw.text));
    }
    if raw.correct_index >= raw.options.len() {
        return Err(format!(
            "question `{}` has correct_index {} but only {} options",
            raw.text,
            raw.correct_index,
            raw.options.len()
        ));
    }

    Ok(Question {
        text: raw.text,
        options: raw.options,
        correct_index: raw.correct_index,
    })
}

/// Use the configured value unless it is absent or zero.
fn positive_or_default(value: Option<u32>, default: u32, field: &str) -> u32 {
    match value {
        Some(0) => {
            warn!(
                field,
                default, "configured value must be positive; using default"
            );
            default
        }
        Some(value) => value,
        None => default,
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in question bank shipped with the binary.
fn default_questions() -> Vec<Question> {
    let entries: [(&str, [&str; 4], usize); 5] = [
        ("What is 1 + 1?", ["1", "2", "3", "4"], 1),
        ("What is 5 - 3?", ["1", "2", "3", "4"], 1),
        ("What is 2 × 3?", ["4", "5", "6", "7"], 2),
        ("What is 8 ÷ 2?", ["2", "3", "4", "5"], 2),
        ("What is 10 - 7?", ["2", "3", "4", "5"], 1),
    ];

    entries
        .into_iter()
        .map(|(text, options, correct_index)| Question {
            text: text.to_string(),
            options: options.into_iter().map(str::to_string).collect(),
            correct_index,
        })
        .collect()
}
