//! Layered CLI configuration.
//!
//! Values resolve from built-in defaults, then the TOML file named by `KUHN_CONFIG`,
//! then individual `KUHN_*` environment variables. Command-line flags are applied
//! on top by each command.

use kuhn_engine::rules::{TableRules, DEFAULT_ANTE, DEFAULT_BET_SIZE, DEFAULT_STARTING_STACK};
use serde::{Deserialize, Serialize};
use std::fs;

pub const CONFIG_ENV: &str = "KUHN_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub ante: u32,
    pub starting_stack: u32,
    pub bet_size: u32,
    pub seed: Option<u64>,
    pub ai: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ante: DEFAULT_ANTE,
            starting_stack: DEFAULT_STARTING_STACK,
            bet_size: DEFAULT_BET_SIZE,
            seed: None,
            ai: "baseline".into(),
        }
    }
}

impl Config {
    pub fn rules(&self) -> TableRules {
        TableRules {
            ante: self.ante,
            starting_stack: self.starting_stack,
            bet_size: self.bet_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigSources {
    pub ante: ValueSource,
    pub starting_stack: ValueSource,
    pub bet_size: ValueSource,
    pub seed: ValueSource,
    pub ai: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            ante: ValueSource::Default,
            starting_stack: ValueSource::Default,
            bet_size: ValueSource::Default,
            seed: ValueSource::Default,
            ai: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ConfigError {}

pub fn load() -> Result<Config, ConfigError> {
    load_with_sources().map(|resolved| resolved.config)
}

pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    load_from(|key| std::env::var(key).ok())
}

/// Resolves the configuration with `env` standing in for the process environment.
pub fn load_from<F>(env: F) -> Result<ConfigResolved, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Some(path) = env(CONFIG_ENV).filter(|p| !p.is_empty()) {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.ante {
            cfg.ante = v;
            sources.ante = ValueSource::File;
        }
        if let Some(v) = f.starting_stack {
            cfg.starting_stack = v;
            sources.starting_stack = ValueSource::File;
        }
        if let Some(v) = f.bet_size {
            cfg.bet_size = v;
            sources.bet_size = ValueSource::File;
        }
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.ai {
            cfg.ai = v;
            sources.ai = ValueSource::File;
        }
    }

    if let Some(seed) = env("KUHN_SEED").filter(|v| !v.is_empty()) {
        cfg.seed = Some(parse_number(&seed, "KUHN_SEED")?);
        sources.seed = ValueSource::Env;
    }
    if let Some(ante) = env("KUHN_ANTE").filter(|v| !v.is_empty()) {
        cfg.ante = parse_number(&ante, "KUHN_ANTE")?;
        sources.ante = ValueSource::Env;
    }
    if let Some(bet) = env("KUHN_BET_SIZE").filter(|v| !v.is_empty()) {
        cfg.bet_size = parse_number(&bet, "KUHN_BET_SIZE")?;
        sources.bet_size = ValueSource::Env;
    }
    if let Some(stack) = env("KUHN_STARTING_STACK").filter(|v| !v.is_empty()) {
        cfg.starting_stack = parse_number(&stack, "KUHN_STARTING_STACK")?;
        sources.starting_stack = ValueSource::Env;
    }
    if let Some(ai) = env("KUHN_AI").filter(|v| !v.is_empty()) {
        cfg.ai = ai;
        sources.ai = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    ante: Option<u32>,
    #[serde(default)]
    starting_stack: Option<u32>,
    #[serde(default)]
    bet_size: Option<u32>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    ai: Option<String>,
}

fn parse_number<T: std::str::FromStr>(raw: &str, name: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("Invalid {}: {}", name, raw)))
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    cfg.rules()
        .validate()
        .map_err(|e| ConfigError::Invalid(format!("Invalid configuration: {}", e)))?;
    if !kuhn_ai::AI_NAMES.contains(&cfg.ai.as_str()) {
        return Err(ConfigError::Invalid(format!(
            "Invalid configuration: unknown ai `{}`",
            cfg.ai
        )));
    }
    Ok(())
}
