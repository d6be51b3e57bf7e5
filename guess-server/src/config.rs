use std::env;
use std::fmt::Display;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use guess_core::{CODE_LENGTH_RANGE, DialogueBook, EngineConfig};
use guess_types::GameMode;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_attempts: u32,
    pub base_range: u32,
    pub range_increment: u32,
    pub code_length: usize,
    pub session_timeout_minutes: u64,
    /// JSON dialogue book; the built-in one is used when unset.
    pub dialogue_file: Option<String>,
    pub enable_reveal: bool,
}

fn env_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {}={:?}: {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env_or("PORT", defaults.port)?,
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            max_attempts: env_or("MAX_ATTEMPTS", defaults.max_attempts)?,
            base_range: env_or("BASE_RANGE", defaults.base_range)?,
            range_increment: env_or("RANGE_INCREMENT", defaults.range_increment)?,
            code_length: env_or("CODE_LENGTH", defaults.code_length)?,
            session_timeout_minutes: env_or("SESSION_TIMEOUT_MINUTES", defaults.session_timeout_minutes)?,
            dialogue_file: env::var("DIALOGUE_FILE").ok().filter(|path| !path.trim().is_empty()),
            enable_reveal: env_or("ENABLE_REVEAL", defaults.enable_reveal)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            bail!("MAX_ATTEMPTS must be at least 1");
        }
        if self.base_range < 2 {
            bail!("BASE_RANGE must be at least 2");
        }
        if !CODE_LENGTH_RANGE.contains(&self.code_length) {
            bail!(
                "CODE_LENGTH must be between {} and {}, got {}",
                CODE_LENGTH_RANGE.start(),
                CODE_LENGTH_RANGE.end(),
                self.code_length
            );
        }
        Ok(())
    }

    pub fn engine_config(&self, mode: GameMode) -> EngineConfig {
        EngineConfig {
            max_attempts: self.max_attempts,
            base_range: self.base_range,
            range_increment: self.range_increment,
            code_length: self.code_length,
            ..EngineConfig::for_mode(mode)
        }
    }

    pub fn load_dialogue(&self) -> Result<DialogueBook> {
        match &self.dialogue_file {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read dialogue file {}", path))?;
                DialogueBook::from_json(&json)
            }
            None => Ok(DialogueBook::builtin()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_url: "sqlite://guess_arena.db?mode=rwc".to_string(),
            max_attempts: 7,
            base_range: 100,
            range_increment: 25,
            code_length: 3,
            session_timeout_minutes: 30,
            dialogue_file: None,
            enable_reveal: false,
        }
    }
}
