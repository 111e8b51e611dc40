//! Configuration management for `ticket_rust`.
//!
//! Configuration sources, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. User config (`~/.config/tk/config.yaml`)
//! 3. Project config (`<tickets-dir>/config.yaml`)
//! 4. Environment (`TICKETS_DIR`, `TK_*`)
//! 5. CLI overrides
//!
//! Keys are normalized to lower-case with hyphens, so `default_priority`,
//! `DEFAULT-PRIORITY` and `TK_DEFAULT_PRIORITY` all address `default-priority`.

use crate::error::{Result, TicketError};
use crate::model::{IssueType, Priority};
use crate::query::jq::DEFAULT_JQ;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Default directory holding ticket files, relative to the working directory.
pub const DEFAULT_TICKETS_DIR: &str = ".tickets";

/// Name of the project and user config files.
pub const CONFIG_FILENAME: &str = "config.yaml";

/// Prefix of environment variables mapped onto config keys.
const ENV_PREFIX: &str = "TK_";

/// Environment variable naming the tickets directory.
pub const TICKETS_DIR_ENV: &str = "TICKETS_DIR";

pub const KEY_TICKETS_DIR: &str = "tickets-dir";
pub const KEY_DEFAULT_TYPE: &str = "default-type";
pub const KEY_DEFAULT_PRIORITY: &str = "default-priority";
pub const KEY_QUERY_ENGINE: &str = "query-engine";
pub const KEY_JQ_PATH: &str = "jq-path";

/// Which filter engine evaluates query expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryEngine {
    /// External `jq` subprocess.
    #[default]
    Jq,
    /// Embedded evaluator.
    Builtin,
}

impl FromStr for QueryEngine {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "jq" => Ok(Self::Jq),
            "builtin" => Ok(Self::Builtin),
            other => Err(TicketError::Config(format!(
                "invalid {KEY_QUERY_ENGINE} '{other}': expected 'jq' or 'builtin'"
            ))),
        }
    }
}

impl fmt::Display for QueryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Jq => "jq",
            Self::Builtin => "builtin",
        })
    }
}

/// One configuration source as normalized key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Set a key, normalizing its spelling.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(normalize_key(key), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize_key(key)).map(String::as_str)
    }

    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        debug!(path = %path.display(), "Loading config file");
        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
        Ok(layer_from_yaml_value(&value))
    }

    /// Build a layer from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_vars(env::vars())
    }

    /// Build a layer from `(name, value)` pairs shaped like environment variables.
    #[must_use]
    pub fn from_env_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut layer = Self::default();
        let mut tickets_dir = None;

        for (key, value) in vars {
            if key == TICKETS_DIR_ENV {
                tickets_dir = Some(value);
            } else if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layer.insert(stripped, value);
            }
        }

        // The bare variable wins over TK_TICKETS_DIR.
        if let Some(dir) = tickets_dir {
            layer.insert(KEY_TICKETS_DIR, dir);
        }

        layer
    }
}

/// CLI overrides for config loading.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub tickets_dir: Option<PathBuf>,
    pub query_engine: Option<String>,
    pub jq_path: Option<String>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(dir) = &self.tickets_dir {
            layer.insert(KEY_TICKETS_DIR, dir.to_string_lossy());
        }
        if let Some(engine) = &self.query_engine {
            layer.insert(KEY_QUERY_ENGINE, engine.clone());
        }
        if let Some(jq) = &self.jq_path {
            layer.insert(KEY_JQ_PATH, jq.clone());
        }

        layer
    }
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    layer.insert(KEY_TICKETS_DIR, DEFAULT_TICKETS_DIR);
    layer.insert(KEY_DEFAULT_TYPE, IssueType::default().as_str());
    layer.insert(KEY_DEFAULT_PRIORITY, Priority::DEFAULT.to_string());
    layer.insert(KEY_QUERY_ENGINE, QueryEngine::default().to_string());
    layer.insert(KEY_JQ_PATH, DEFAULT_JQ);
    layer
}

/// Path of the user config file under `home`.
#[must_use]
pub fn user_config_path(home: &Path) -> PathBuf {
    home.join(".config").join("tk").join(CONFIG_FILENAME)
}

/// Load user config (`~/.config/tk/config.yaml`).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config(home: Option<&Path>) -> Result<ConfigLayer> {
    home.map_or_else(
        || Ok(ConfigLayer::default()),
        |home| ConfigLayer::from_yaml(&user_config_path(home)),
    )
}

/// Load project config (`<tickets-dir>/config.yaml`).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(tickets_dir: &Path) -> Result<ConfigLayer> {
    ConfigLayer::from_yaml(&tickets_dir.join(CONFIG_FILENAME))
}

/// Load configuration from the real home directory and environment.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed, or a value
/// is invalid.
pub fn load_config(cli: &CliOverrides) -> Result<Settings> {
    let home = env::var_os("HOME").map(PathBuf::from);
    load_config_from(home.as_deref(), &ConfigLayer::from_env(), cli)
}

/// Load configuration with explicit home directory and environment layer.
///
/// The tickets directory is settled from every layer except the project
/// file, since that file lives inside it.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed, or a value
/// is invalid.
pub fn load_config_from(
    home: Option<&Path>,
    env_layer: &ConfigLayer,
    cli: &CliOverrides,
) -> Result<Settings> {
    let defaults = default_config_layer();
    let user = load_user_config(home)?;
    let cli_layer = cli.as_layer();

    let startup = ConfigLayer::merge_layers(&[
        defaults.clone(),
        user.clone(),
        env_layer.clone(),
        cli_layer.clone(),
    ]);
    let tickets_dir = tickets_dir_from_layer(&startup);
    let project = load_project_config(&tickets_dir)?;

    let mut merged =
        ConfigLayer::merge_layers(&[defaults, user, project, env_layer.clone(), cli_layer]);
    merged.insert(KEY_TICKETS_DIR, tickets_dir.to_string_lossy());

    Settings::from_layer(&merged)
}

fn tickets_dir_from_layer(layer: &ConfigLayer) -> PathBuf {
    layer
        .get(KEY_TICKETS_DIR)
        .map(str::trim)
        .filter(|dir| !dir.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_TICKETS_DIR), PathBuf::from)
}

/// Resolved settings used by commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub tickets_dir: PathBuf,
    pub default_type: IssueType,
    pub default_priority: Priority,
    pub query_engine: QueryEngine,
    pub jq_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tickets_dir: PathBuf::from(DEFAULT_TICKETS_DIR),
            default_type: IssueType::default(),
            default_priority: Priority::DEFAULT,
            query_engine: QueryEngine::default(),
            jq_path: DEFAULT_JQ.to_string(),
        }
    }
}

impl Settings {
    /// Resolve settings from a merged layer; absent keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error for a non-integer `default-priority` or an
    /// unknown `query-engine`.
    pub fn from_layer(layer: &ConfigLayer) -> Result<Self> {
        let defaults = Self::default();
        let non_empty = |key| get_non_empty(layer, key);

        let default_priority = match non_empty(KEY_DEFAULT_PRIORITY) {
            Some(value) => value.parse::<i64>().map(Priority::Level).map_err(|_| {
                TicketError::Config(format!(
                    "invalid {KEY_DEFAULT_PRIORITY} '{value}': must be an integer"
                ))
            })?,
            None => defaults.default_priority,
        };

        let default_type = match non_empty(KEY_DEFAULT_TYPE) {
            Some(value) => value.parse()?,
            None => defaults.default_type,
        };

        let query_engine = match non_empty(KEY_QUERY_ENGINE) {
            Some(value) => value.parse()?,
            None => defaults.query_engine,
        };

        Ok(Self {
            tickets_dir: tickets_dir_from_layer(layer),
            default_type,
            default_priority,
            query_engine,
            jq_path: non_empty(KEY_JQ_PATH).map_or(defaults.jq_path, str::to_string),
        })
    }
}

fn get_non_empty<'a>(layer: &'a ConfigLayer, key: &str) -> Option<&'a str> {
    layer.get(key).map(str::trim).filter(|value| !value.is_empty())
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn layer_from_yaml_value(value: &serde_yaml::Value) -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    let mut flat = HashMap::new();
    flatten_yaml(value, "", &mut flat);

    for (key, value) in flat {
        layer.insert(&key, value);
    }

    layer
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> ConfigLayer {
        ConfigLayer::from_env_vars(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string())),
        )
    }

    #[test]
    fn defaults_when_nothing_configured() {
        let temp = TempDir::new().unwrap();
        let cli = CliOverrides {
            tickets_dir: Some(temp.path().join(".tickets")),
            ..CliOverrides::default()
        };
        let settings = load_config_from(None, &ConfigLayer::default(), &cli).unwrap();
        assert_eq!(settings.default_type, IssueType::Task);
        assert_eq!(settings.default_priority, Priority::Level(2));
        assert_eq!(settings.query_engine, QueryEngine::Jq);
        assert_eq!(settings.jq_path, "jq");
    }

    #[test]
    fn merge_precedence_order() {
        let mut defaults = default_config_layer();
        defaults.insert(KEY_DEFAULT_TYPE, "task");
        let mut yaml = ConfigLayer::default();
        yaml.insert(KEY_DEFAULT_TYPE, "bug");
        let mut env_layer = ConfigLayer::default();
        env_layer.insert(KEY_DEFAULT_TYPE, "feature");
        let mut cli = ConfigLayer::default();
        cli.insert(KEY_DEFAULT_TYPE, "epic");

        let merged = ConfigLayer::merge_layers(&[defaults.clone(), yaml.clone(), env_layer]);
        assert_eq!(merged.get(KEY_DEFAULT_TYPE), Some("feature"));

        let merged = ConfigLayer::merge_layers(&[defaults, yaml, cli]);
        assert_eq!(merged.get(KEY_DEFAULT_TYPE), Some("epic"));
    }

    #[test]
    fn env_keys_are_normalized() {
        let layer = env_of(&[
            ("TK_DEFAULT_PRIORITY", "0"),
            ("TK_QUERY_ENGINE", "builtin"),
            ("HOME", "/home/x"),
        ]);
        assert_eq!(layer.get("default-priority"), Some("0"));
        assert_eq!(layer.get("query_engine"), Some("builtin"));
        assert_eq!(layer.get("home"), None);
    }

    #[test]
    fn tickets_dir_env_wins_over_prefixed() {
        let layer = env_of(&[("TK_TICKETS_DIR", "/a"), ("TICKETS_DIR", "/b")]);
        assert_eq!(layer.get(KEY_TICKETS_DIR), Some("/b"));
    }

    #[test]
    fn project_config_is_read_from_tickets_dir() {
        let temp = TempDir::new().unwrap();
        let tickets = temp.path().join("store");
        fs::create_dir_all(&tickets).unwrap();
        fs::write(
            tickets.join(CONFIG_FILENAME),
            "default-type: bug\ndefault_priority: 1\nquery-engine: builtin\n",
        )
        .unwrap();

        let env_layer = env_of(&[("TICKETS_DIR", tickets.to_str().unwrap())]);
        let settings = load_config_from(None, &env_layer, &CliOverrides::default()).unwrap();
        assert_eq!(settings.tickets_dir, tickets);
        assert_eq!(settings.default_type, IssueType::Bug);
        assert_eq!(settings.default_priority, Priority::Level(1));
        assert_eq!(settings.query_engine, QueryEngine::Builtin);
    }

    #[test]
    fn user_config_below_project_and_env() {
        let temp = TempDir::new().unwrap();
        let home = temp.path().join("home");
        let user_path = user_config_path(&home);
        fs::create_dir_all(user_path.parent().unwrap()).unwrap();
        fs::write(&user_path, "default-type: chore\njq-path: /opt/jq\n").unwrap();

        let tickets = temp.path().join(".tickets");
        let cli = CliOverrides {
            tickets_dir: Some(tickets),
            jq_path: Some("/usr/local/bin/jq".to_string()),
            ..CliOverrides::default()
        };
        let env_layer = env_of(&[("TK_DEFAULT_TYPE", "feature")]);
        let settings = load_config_from(Some(&home), &env_layer, &cli).unwrap();
        assert_eq!(settings.default_type, IssueType::Feature);
        assert_eq!(settings.jq_path, "/usr/local/bin/jq");
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let mut layer = default_config_layer();
        layer.insert(KEY_DEFAULT_PRIORITY, "high");
        assert!(matches!(
            Settings::from_layer(&layer),
            Err(TicketError::Config(_))
        ));

        let mut layer = default_config_layer();
        layer.insert(KEY_QUERY_ENGINE, "sql");
        assert!(matches!(
            Settings::from_layer(&layer),
            Err(TicketError::Config(_))
        ));
    }

    #[test]
    fn negative_default_priority_is_allowed() {
        let mut layer = default_config_layer();
        layer.insert(KEY_DEFAULT_PRIORITY, "-1");
        assert_eq!(
            Settings::from_layer(&layer).unwrap().default_priority,
            Priority::Level(-1)
        );
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "default-type: [unclosed\n").unwrap();
        assert!(matches!(
            ConfigLayer::from_yaml(&path),
            Err(TicketError::Yaml(_))
        ));
    }

    #[test]
    fn nested_yaml_flattens_with_dots() {
        let value: serde_yaml::Value = serde_yaml::from_str("query:\n  engine: builtin\n").unwrap();
        let layer = layer_from_yaml_value(&value);
        assert_eq!(layer.get("query.engine"), Some("builtin"));
    }
}
