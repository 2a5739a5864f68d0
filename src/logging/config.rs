use std::collections::HashMap;

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted for scope-level overrides, e.g.
/// `VR_PLAYER_LOG=warn,teleport=debug,grab=trace`.
pub const LOG_ENV_VAR: &str = "VR_PLAYER_LOG";

#[derive(Debug, Clone)]
pub struct LogConfig {
    global_level: Level,
    scope_levels: HashMap<String, Level>,
}

impl LogConfig {
    pub fn new() -> Self {
        Self {
            global_level: Level::WARN,
            scope_levels: HashMap::new(),
        }
    }

    pub fn from_env(env_var_name: &str) -> Self {
        let mut config = Self::new();
        if let Ok(config_str) = std::env::var(env_var_name) {
            config.parse_config_string(&config_str);
        }
        config
    }

    fn parse_config_string(&mut self, config_str: &str) {
        for part in config_str.split(',') {
            let part = part.trim();
            if let Some((scope, level)) = part.split_once('=') {
                if let Ok(level) = parse_level(level.trim()) {
                    self.scope_levels.insert(scope.trim().to_string(), level);
                }
            } else if let Ok(level) = parse_level(part) {
                self.global_level = level;
            }
        }
    }

    pub fn should_log(&self, scope: &str, level: Level) -> bool {
        let target = self.scope_levels.get(scope).unwrap_or(&self.global_level);
        level <= *target
    }

    pub fn set_global_level(&mut self, level: Level) {
        self.global_level = level;
    }

    pub fn set_scope_level(&mut self, scope: &str, level: Level) {
        self.scope_levels.insert(scope.to_string(), level);
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_level(name: &str) -> Result<Level, ()> {
    match name.to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(()),
    }
}

/// Map a lowercase level name to a `Level` at macro-expansion call sites.
/// Unknown names log at the most verbose level rather than panicking.
pub fn level_from_name(name: &str) -> Level {
    parse_level(name).unwrap_or(Level::TRACE)
}

/// Install the scoped config and a fmt subscriber. Safe to call more
/// than once; later calls keep the first subscriber.
pub fn init_logging() {
    super::set_log_config(LogConfig::from_env(LOG_ENV_VAR));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
