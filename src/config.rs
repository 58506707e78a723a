//! Application configuration.
//!
//! Every setting resolves with priority: config.toml > environment (.env) > default.

use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::paths;
use crate::session::{SessionOptions, DEFAULT_CANDIDATE_POOL_SIZE};
use crate::tips::DEFAULT_ROTATION_INTERVAL;

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 3000;

// ==================== Study Configuration ====================

/// Pause between hiding the answer and drawing the next card
pub const DEFAULT_TRANSITION_DELAY_MS: u64 = 200;

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct AppConfig {
    database: Option<DatabaseConfig>,
    server: Option<ServerConfig>,
    study: Option<StudyConfig>,
    tips: Option<TipsConfig>,
    storage: Option<StorageConfig>,
    speech: Option<SpeechConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabaseConfig {
    path: Option<String>,
    seed_cards: Option<String>,
    seed_tips: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerConfig {
    addr: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct StudyConfig {
    transition_delay_ms: Option<u64>,
    server_candidates: Option<bool>,
    candidate_pool_size: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct TipsConfig {
    rotation_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct StorageConfig {
    path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SpeechConfig {
    command: Option<String>,
}

/// Resolved settings for one server run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_path: PathBuf,
    /// JSON deck imported into an empty database
    pub seed_cards: Option<PathBuf>,
    pub seed_tips: Option<PathBuf>,
    pub server_addr: String,
    pub server_port: u16,
    pub transition_delay: Duration,
    pub server_candidates: bool,
    pub candidate_pool_size: usize,
    pub tip_rotation: Duration,
    /// Key/value file holding the viewed-card history
    pub storage_path: PathBuf,
    /// External synthesizer command line; the log speaker alone when unset
    pub speech_command: Option<String>,
}

impl Settings {
    /// Load from ./config.toml and the process environment
    pub fn load() -> Self {
        // Load .env file if present
        let _ = dotenvy::dotenv();
        let contents = std::fs::read_to_string("config.toml").ok();
        Self::resolve(contents.as_deref(), |key| std::env::var(key).ok())
    }

    /// Resolve from optional config.toml contents and an environment lookup
    pub fn resolve(config_toml: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Self {
        let config = config_toml
            .and_then(|contents| match toml::from_str::<AppConfig>(contents) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!("Ignoring invalid config.toml: {}", e);
                    None
                }
            })
            .unwrap_or_default();

        let database = config.database.unwrap_or_default();
        let server = config.server.unwrap_or_default();
        let study = config.study.unwrap_or_default();
        let tips = config.tips.unwrap_or_default();
        let storage = config.storage.unwrap_or_default();
        let speech = config.speech.unwrap_or_default();

        let database_path = database
            .path
            .or_else(|| env("DATABASE_PATH"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(paths::db_path()));
        tracing::info!("Using database: {}", database_path.display());

        Self {
            database_path,
            seed_cards: database.seed_cards.or_else(|| env("SEED_CARDS")).map(PathBuf::from),
            seed_tips: database.seed_tips.or_else(|| env("SEED_TIPS")).map(PathBuf::from),
            server_addr: server
                .addr
                .or_else(|| env("SERVER_ADDR"))
                .unwrap_or_else(|| SERVER_ADDR.to_string()),
            server_port: server.port.or_else(|| parse_env(&env, "PORT")).unwrap_or(SERVER_PORT),
            transition_delay: Duration::from_millis(
                study
                    .transition_delay_ms
                    .or_else(|| parse_env(&env, "TRANSITION_DELAY_MS"))
                    .unwrap_or(DEFAULT_TRANSITION_DELAY_MS),
            ),
            server_candidates: study
                .server_candidates
                .or_else(|| parse_env(&env, "SERVER_CANDIDATES"))
                .unwrap_or(false),
            candidate_pool_size: study
                .candidate_pool_size
                .or_else(|| parse_env(&env, "CANDIDATE_POOL_SIZE"))
                .unwrap_or(DEFAULT_CANDIDATE_POOL_SIZE)
                .max(1),
            tip_rotation: tips
                .rotation_secs
                .or_else(|| parse_env(&env, "TIP_ROTATION_SECS"))
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_ROTATION_INTERVAL),
            storage_path: storage
                .path
                .or_else(|| env("STORAGE_PATH"))
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(paths::storage_path())),
            speech_command: speech
                .command
                .or_else(|| env("SPEECH_COMMAND"))
                .filter(|c| !c.trim().is_empty()),
        }
    }

    /// Get the full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_addr, self.server_port)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            server_candidates: self.server_candidates,
            candidate_pool_size: self.candidate_pool_size,
        }
    }
}

fn parse_env<T: FromStr>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    env(key).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(None, env_of(&[]));
        assert!(settings.database_path.ends_with("flashcards.db"));
        assert!(settings.storage_path.ends_with("local_storage.json"));
        assert_eq!(settings.bind_addr(), "0.0.0.0:3000");
        assert_eq!(settings.transition_delay, Duration::from_millis(200));
        assert_eq!(settings.tip_rotation, Duration::from_secs(300));
        assert!(!settings.server_candidates);
        assert_eq!(settings.candidate_pool_size, 20);
        assert_eq!(settings.seed_cards, None);
        assert_eq!(settings.speech_command, None);
    }

    #[test]
    fn test_env_overrides_defaults() {
        let env = env_of(&[
            ("DATABASE_PATH", "/tmp/cards.db"),
            ("PORT", "8080"),
            ("SERVER_CANDIDATES", "true"),
            ("SEED_CARDS", "deck.json"),
            ("TIP_ROTATION_SECS", "60"),
            ("SPEECH_COMMAND", "espeak-ng -v vi"),
        ]);
        let settings = Settings::resolve(None, env);
        assert_eq!(settings.database_path, PathBuf::from("/tmp/cards.db"));
        assert_eq!(settings.server_port, 8080);
        assert!(settings.server_candidates);
        assert_eq!(settings.seed_cards, Some(PathBuf::from("deck.json")));
        assert_eq!(settings.tip_rotation, Duration::from_secs(60));
        assert_eq!(settings.speech_command.as_deref(), Some("espeak-ng -v vi"));
    }

    #[test]
    fn test_config_file_beats_env() {
        let toml = r#"
            [database]
            path = "from_config.db"

            [server]
            port = 4000

            [study]
            transition_delay_ms = 0
            candidate_pool_size = 5

            [speech]
            command = "say -v Linh"
        "#;
        let env = env_of(&[
            ("DATABASE_PATH", "from_env.db"),
            ("PORT", "8080"),
            ("SPEECH_COMMAND", "espeak-ng"),
        ]);
        let settings = Settings::resolve(Some(toml), env);
        assert_eq!(settings.database_path, PathBuf::from("from_config.db"));
        assert_eq!(settings.server_port, 4000);
        assert_eq!(settings.transition_delay, Duration::ZERO);
        assert_eq!(settings.session_options().candidate_pool_size, 5);
        assert_eq!(settings.speech_command.as_deref(), Some("say -v Linh"));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let env = env_of(&[("PORT", "not a port"), ("CANDIDATE_POOL_SIZE", "0")]);
        let settings = Settings::resolve(Some("this is [not toml"), env);
        assert_eq!(settings.server_port, SERVER_PORT);
        assert_eq!(settings.candidate_pool_size, 1);
    }
}
