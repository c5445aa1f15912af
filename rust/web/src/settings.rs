use kuhn_engine::rules::TableRules;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_ENV: &str = "KUHN_WEB_CONFIG";
pub const HOST_ENV: &str = "KUHN_WEB_HOST";
pub const PORT_ENV: &str = "KUHN_WEB_PORT";
pub const SEED_ENV: &str = "KUHN_WEB_SEED";
pub const LOG_JSON_ENV: &str = "KUHN_WEB_LOG_JSON";

/// Follow-up delays in milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Delays {
    /// AI "thinking" time before it acts
    pub ai_ms: u64,
    /// Pause between betting closing and cards being revealed
    pub showdown_ms: u64,
    /// Pause after a showdown before the next hand is dealt
    pub next_hand_ms: u64,
    /// Pause after a fold in an AI game
    pub ai_fold_ms: u64,
    /// Pause after a fold in an online game
    pub online_fold_ms: u64,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            ai_ms: 1500,
            showdown_ms: 1000,
            next_hand_ms: 3000,
            ai_fold_ms: 2000,
            online_fold_ms: 3000,
        }
    }
}

impl Delays {
    pub fn uniform(ms: u64) -> Self {
        Self {
            ai_ms: ms,
            showdown_ms: ms,
            next_hand_ms: ms,
            ai_fold_ms: ms,
            online_fold_ms: ms,
        }
    }

    pub fn ai(&self) -> Duration {
        Duration::from_millis(self.ai_ms)
    }
    pub fn showdown(&self) -> Duration {
        Duration::from_millis(self.showdown_ms)
    }
    pub fn next_hand(&self) -> Duration {
        Duration::from_millis(self.next_hand_ms)
    }
    pub fn ai_fold(&self) -> Duration {
        Duration::from_millis(self.ai_fold_ms)
    }
    pub fn online_fold(&self) -> Duration {
        Duration::from_millis(self.online_fold_ms)
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub ante: u32,
    pub starting_stack: u32,
    pub bet_size: u32,
    /// AI opponent name, see `kuhn_ai::create_ai`
    pub ai: String,
    /// Seeds the dealer and the AI; random when unset
    pub seed: Option<u64>,
    pub delays: Delays,
    /// Rooms with no activity for this long are closed by the sweeper
    pub room_ttl_secs: u64,
    pub friend_code_ttl_secs: u64,
    pub sweep_interval_secs: u64,
    pub log_json: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        let rules = TableRules::default();
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            ante: rules.ante,
            starting_stack: rules.starting_stack,
            bet_size: rules.bet_size,
            ai: "baseline".to_string(),
            seed: None,
            delays: Delays::default(),
            room_ttl_secs: 30 * 60,
            friend_code_ttl_secs: 24 * 60 * 60,
            sweep_interval_secs: 60,
            log_json: false,
        }
    }
}

impl ServerSettings {
    /// Settings for tests: ephemeral port, fixed seed, 1 ms delays.
    pub fn for_tests() -> Self {
        Self {
            port: 0,
            seed: Some(7),
            delays: Delays::uniform(1),
            ..Self::default()
        }
    }

    pub fn rules(&self) -> TableRules {
        TableRules {
            ante: self.ante,
            starting_stack: self.starting_stack,
            bet_size: self.bet_size,
        }
    }

    pub fn room_ttl(&self) -> Duration {
        Duration::from_secs(self.room_ttl_secs)
    }

    pub fn friend_code_ttl(&self) -> Duration {
        Duration::from_secs(self.friend_code_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.rules()
            .validate()
            .map_err(|e| SettingsError::InvalidValue(e.to_string()))?;

        if self.host.trim().is_empty() {
            return Err(SettingsError::InvalidValue("host cannot be empty".to_string()));
        }

        if self.ai.is_empty() {
            return Err(SettingsError::InvalidValue("ai cannot be empty".to_string()));
        }

        if self.room_ttl_secs == 0 {
            return Err(SettingsError::InvalidValue(
                "room_ttl_secs must be greater than 0".to_string(),
            ));
        }

        if self.sweep_interval_secs == 0 {
            return Err(SettingsError::InvalidValue(
                "sweep_interval_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Defaults, then the TOML file named by `KUHN_WEB_CONFIG`, then environment
    /// overrides.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// [`ServerSettings::load`] with an injectable environment lookup.
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let mut settings = match env(CONFIG_ENV) {
            Some(path) if !path.trim().is_empty() => Self::from_file(Path::new(&path))?,
            _ => Self::default(),
        };

        if let Some(host) = env(HOST_ENV) {
            settings.host = host;
        }
        if let Some(port) = env(PORT_ENV) {
            settings.port = parse_env(PORT_ENV, &port)?;
        }
        if let Some(seed) = env(SEED_ENV) {
            settings.seed = Some(parse_env(SEED_ENV, &seed)?);
        }
        if let Some(flag) = env(LOG_JSON_ENV) {
            settings.log_json = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::Io(format!("{}: {e}", path.display())))?;
        toml::from_str(&contents)
            .map_err(|e| SettingsError::Parse(format!("{}: {e}", path.display())))
    }
}

fn parse_env<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, SettingsError> {
    value.trim().parse().map_err(|_| SettingsError::Env {
        var,
        value: value.to_string(),
    })
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
    #[error("Cannot read config file {0}")]
    Io(String),
    #[error("Invalid config file {0}")]
    Parse(String),
    #[error("Invalid value for {var}: {value:?}")]
    Env { var: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_settings_are_valid() {
        let settings = ServerSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.rules(), TableRules::default());
        assert_eq!(settings.delays.ai(), Duration::from_millis(1500));
        assert_eq!(settings.delays.online_fold(), Duration::from_millis(3000));
    }

    #[test]
    fn rejects_invalid_values() {
        let zero_bet = ServerSettings {
            bet_size: 0,
            ..Default::default()
        };
        assert!(zero_bet.validate().is_err());

        let no_ai = ServerSettings {
            ai: String::new(),
            ..Default::default()
        };
        assert!(no_ai.validate().is_err());

        let no_sweep = ServerSettings {
            sweep_interval_secs: 0,
            ..Default::default()
        };
        assert!(no_sweep.validate().is_err());
    }

    #[test]
    fn env_overrides_defaults() {
        let settings = ServerSettings::load_with(env_from(&[
            (HOST_ENV, "0.0.0.0"),
            (PORT_ENV, "9000"),
            (SEED_ENV, "42"),
            (LOG_JSON_ENV, "true"),
        ]))
        .expect("load");
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.seed, Some(42));
        assert!(settings.log_json);
    }

    #[test]
    fn bad_env_value_is_reported() {
        let err = ServerSettings::load_with(env_from(&[(PORT_ENV, "http")])).unwrap_err();
        assert!(matches!(err, SettingsError::Env { var: PORT_ENV, .. }));
    }

    #[test]
    fn file_then_env_layering() {
        let mut file = tempfile_path("layering");
        writeln!(
            file.1,
            "port = 4000\nante = 2\nstarting_stack = 5\n\n[delays]\nai_ms = 10\n"
        )
        .expect("write");
        let path = file.0.to_string_lossy().to_string();

        let settings =
            ServerSettings::load_with(env_from(&[(CONFIG_ENV, &path), (PORT_ENV, "4500")]))
                .expect("load");
        assert_eq!(settings.port, 4500);
        assert_eq!(settings.ante, 2);
        assert_eq!(settings.starting_stack, 5);
        assert_eq!(settings.delays.ai_ms, 10);
        assert_eq!(settings.delays.showdown_ms, 1000);
        std::fs::remove_file(&file.0).ok();
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = ServerSettings::load_with(env_from(&[(CONFIG_ENV, "/nonexistent/kuhn.toml")]))
            .unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }

    fn tempfile_path(tag: &str) -> (std::path::PathBuf, std::fs::File) {
        let path = std::env::temp_dir().join(format!(
            "kuhn_web_settings_{tag}_{}.toml",
            std::process::id()
        ));
        let file = std::fs::File::create(&path).expect("create temp config");
        (path, file)
    }
}
