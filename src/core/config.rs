//! Configuration loading and access
//!
//! Configuration is TOML. Each top-level table is a *section* (for example
//! `[Dir]` or `["ZIP Extract"]`) and the keys inside it are variables. Files
//! are layered: built-in defaults, the system file, the per-user file and
//! finally the file named on the command line. Later layers overwrite earlier
//! ones key by key, so a user file only needs the values it changes.

use crate::core::error_handling::ContextualError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the file written by [`Config::dump`]
pub const RUN_CONFIG_FILE: &str = "run-config.toml";

const DEFAULTS: &str = r#"
[Dir]
log_dir = "/var/log/filehound"
plugin_dir = ""

[Misc]
verbose = false
copy = false

[Sqlite]
db_file = "filehound.db"

["File ID"]
file_cmd = "file"
trid = ""
trid_db = ""

[Output]
formats = ["text"]
text_format = "single"
"#;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Could not read configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse configuration file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid override option '{option}', expected Section.Key=Value")]
    InvalidOverride { option: String },

    #[error("Could not write configuration to {}: {message}", path.display())]
    Write { path: PathBuf, message: String },
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        !matches!(self, ConfigError::Write { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::NotFound { .. } => Some("The configuration file does not exist"),
            ConfigError::Read { .. } => Some("The configuration file could not be read"),
            ConfigError::Parse { .. } => Some("The configuration file is not valid TOML"),
            ConfigError::InvalidOverride { .. } => {
                Some("Override options must look like Section.Key=Value")
            }
            ConfigError::Write { .. } => None,
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Layered configuration
///
/// Read-only for analysis plugins apart from the derived values the
/// orchestrator writes per file (`Dir.base_dir`, `Dir.log_dir`, `Misc.md5`,
/// `Misc.sha1`, `Misc.sha256`).
#[derive(Debug, Clone)]
pub struct Config {
    table: toml::Table,
    sources: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Built-in defaults only
    pub fn defaults() -> Self {
        let table = DEFAULTS
            .parse::<toml::Table>()
            .unwrap_or_else(|_| toml::Table::new());
        Self {
            table,
            sources: Vec::new(),
        }
    }

    /// Load defaults plus every configuration layer that exists
    ///
    /// The system and per-user files are optional. An explicitly named file
    /// must exist and parse.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        let mut config = Self::defaults();

        for candidate in default_config_paths() {
            if candidate.is_file() {
                config.merge_file(&candidate)?;
            }
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            config.merge_file(path)?;
        }

        log::debug!("Read configuration from {:?}", config.sources);
        Ok(config)
    }

    /// Parse a configuration from a TOML string layered over the defaults
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let mut config = Self::defaults();
        let layer = contents
            .parse::<toml::Table>()
            .map_err(|source| ConfigError::Parse {
                path: PathBuf::from("<string>"),
                source,
            })?;
        config.merge(layer);
        Ok(config)
    }

    fn merge_file(&mut self, path: &Path) -> ConfigResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let layer = contents
            .parse::<toml::Table>()
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        self.merge(layer);
        self.sources.push(path.to_path_buf());
        Ok(())
    }

    /// Overlay another table, section by section and key by key
    pub fn merge(&mut self, layer: toml::Table) {
        for (section, value) in layer {
            match (self.table.get_mut(&section), value) {
                (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                    for (key, v) in incoming {
                        existing.insert(key, v);
                    }
                }
                (_, value) => {
                    self.table.insert(section, value);
                }
            }
        }
    }

    /// Files that contributed to this configuration, in load order
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Apply a `Section.Key=Value` override
    ///
    /// The option is added when it does not exist yet.
    pub fn apply_override(&mut self, option: &str) -> ConfigResult<()> {
        let invalid = || ConfigError::InvalidOverride {
            option: option.to_string(),
        };
        let (name, value) = option.split_once('=').ok_or_else(invalid)?;
        let (section, key) = name.split_once('.').ok_or_else(invalid)?;
        let (section, key) = (section.trim(), key.trim());
        if section.is_empty() || key.is_empty() || key.contains('.') {
            return Err(invalid());
        }

        log::info!("Overriding option: {}.{}={}", section, key, value);
        self.set_var(section, key, value);
        Ok(())
    }

    fn raw(&self, section: &str, key: &str) -> Option<&toml::Value> {
        self.table.get(section)?.as_table()?.get(key)
    }

    /// Return a variable as a string
    ///
    /// Non-string scalars are stringified; arrays are joined with commas.
    pub fn get_var(&self, section: &str, key: &str) -> Option<String> {
        let value = self.raw(section, key);
        if value.is_none() {
            log::debug!("Could not find \"{}\": \"{}\"", section, key);
        }
        value.map(value_to_string)
    }

    /// Return a boolean variable
    ///
    /// Accepts TOML booleans and the strings on/off, yes/no, true/false, 1/0.
    pub fn get_bvar(&self, section: &str, key: &str) -> Option<bool> {
        match self.raw(section, key)? {
            toml::Value::Boolean(b) => Some(*b),
            toml::Value::Integer(i) => Some(*i != 0),
            toml::Value::String(s) => parse_bool(s),
            _ => None,
        }
    }

    /// Return a list variable
    ///
    /// A plain string is split on commas so overrides can set lists.
    pub fn get_list(&self, section: &str, key: &str) -> Option<Vec<String>> {
        match self.raw(section, key)? {
            toml::Value::Array(items) => Some(
                items
                    .iter()
                    .map(value_to_string)
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
            other => Some(
                value_to_string(other)
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
        }
    }

    /// Return every variable of a section
    pub fn get_section(&self, section: &str) -> Option<BTreeMap<String, String>> {
        let table = self.table.get(section)?.as_table()?;
        Some(
            table
                .iter()
                .map(|(k, v)| (k.clone(), value_to_string(v)))
                .collect(),
        )
    }

    /// Set a variable, creating the section if needed
    pub fn set_var(&mut self, section: &str, key: &str, value: impl Into<String>) {
        let entry = self
            .table
            .entry(section.to_string())
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        if !entry.is_table() {
            *entry = toml::Value::Table(toml::Table::new());
        }
        if let toml::Value::Table(table) = entry {
            table.insert(key.to_string(), toml::Value::String(value.into()));
        }
    }

    /// Write the effective configuration into `dir`
    pub fn dump(&self, dir: &Path) -> ConfigResult<PathBuf> {
        let path = dir.join(RUN_CONFIG_FILE);
        let rendered = toml::to_string_pretty(&self.table).map_err(|e| ConfigError::Write {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, rendered).map_err(|e| ConfigError::Write {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(path)
    }
}

fn value_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Some(true),
        "off" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// System and per-user configuration files, lowest precedence first
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/filehound/filehound.toml")];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("filehound").join("filehound.toml"));
    }
    paths
}

/// Expand a leading `~` using the home directory
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_present() {
        let config = Config::defaults();
        assert_eq!(
            config.get_var("Dir", "log_dir").as_deref(),
            Some("/var/log/filehound")
        );
        assert_eq!(config.get_bvar("Misc", "copy"), Some(false));
        assert_eq!(config.get_list("Output", "formats"), Some(vec!["text".to_string()]));
        assert_eq!(config.get_var("File ID", "file_cmd").as_deref(), Some("file"));
    }

    #[test]
    fn test_layer_overwrites_only_given_keys() {
        let config = Config::from_toml_str(
            r#"
            [Dir]
            log_dir = "/tmp/hound"

            ["ZIP Extract"]
            feedback = "on"
            "#,
        )
        .unwrap();

        assert_eq!(config.get_var("Dir", "log_dir").as_deref(), Some("/tmp/hound"));
        // untouched default from the same section survives
        assert_eq!(config.get_var("Dir", "plugin_dir").as_deref(), Some(""));
        assert_eq!(config.get_bvar("ZIP Extract", "feedback"), Some(true));
    }

    #[test]
    fn test_get_bvar_accepts_word_forms() {
        let mut config = Config::defaults();
        for (raw, expected) in [("yes", true), ("OFF", false), ("1", true), ("false", false)] {
            config.set_var("Test", "flag", raw);
            assert_eq!(config.get_bvar("Test", "flag"), Some(expected), "{}", raw);
        }
        config.set_var("Test", "flag", "maybe");
        assert_eq!(config.get_bvar("Test", "flag"), None);
        assert_eq!(config.get_bvar("Test", "missing"), None);
    }

    #[test]
    fn test_get_section_stringifies_values() {
        let config = Config::from_toml_str(
            r#"
            [Plugin]
            count = 3
            enabled = true
            name = "x"
            "#,
        )
        .unwrap();
        let section = config.get_section("Plugin").unwrap();
        assert_eq!(section.get("count").map(String::as_str), Some("3"));
        assert_eq!(section.get("enabled").map(String::as_str), Some("true"));
        assert_eq!(section.get("name").map(String::as_str), Some("x"));
        assert!(config.get_section("Nope").is_none());
    }

    #[test]
    fn test_override_adds_and_replaces() {
        let mut config = Config::defaults();
        config.apply_override("Dir.log_dir=/srv/out").unwrap();
        config.apply_override("New Section.key=a=b").unwrap();
        assert_eq!(config.get_var("Dir", "log_dir").as_deref(), Some("/srv/out"));
        assert_eq!(config.get_var("New Section", "key").as_deref(), Some("a=b"));
    }

    #[test]
    fn test_malformed_overrides_are_rejected() {
        let mut config = Config::defaults();
        for bad in ["nodot=1", "Dir.log_dir", ".key=1", "Dir.=1", "A.b.c=1"] {
            assert!(
                matches!(
                    config.apply_override(bad),
                    Err(ConfigError::InvalidOverride { .. })
                ),
                "{}",
                bad
            );
        }
    }

    #[test]
    fn test_override_string_list_is_split() {
        let mut config = Config::defaults();
        config.apply_override("Output.formats=text, json").unwrap();
        assert_eq!(
            config.get_list("Output", "formats"),
            Some(vec!["text".to_string(), "json".to_string()])
        );
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let result = Config::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_load_and_dump_roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[Misc]\ncopy = true\n").unwrap();

        let mut config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.get_bvar("Misc", "copy"), Some(true));
        assert!(config.sources().contains(&path));

        config.set_var("Misc", "sha256", "abc");
        let dumped = config.dump(dir.path()).unwrap();
        let reread = std::fs::read_to_string(dumped).unwrap();
        assert!(reread.contains("sha256 = \"abc\""));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/plugins"), home.join("plugins"));
        }
    }
}
