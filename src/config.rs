/// Engine configuration.
///
/// Holds the process-level settings the dashboard host owns: the default
/// threshold standard, an optional replacement limit table, and logging.
/// Read from a TOML file such as:
///
/// ```toml
/// standard = "WHO"
/// limits_file = "regulatory_limits.toml"
///
/// [logging]
/// level = "debug"
/// file = "airlens.log"
/// console_timestamps = false
/// ```
///
/// Every key is optional.

use crate::limits::LimitTable;
use crate::logging::{self, EngineArea, LogLevel};
use crate::model::{EngineError, Standard};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Standard applied when the caller does not choose one.
    pub standard: Standard,
    /// Limit table to use instead of the built-in one.
    pub limits_file: Option<PathBuf>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub file: Option<PathBuf>,
    pub console_timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
            console_timestamps: true,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads a config file. A relative `limits_file` is resolved against the
    /// directory the config file lives in.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml_str(&contents)?;

        if let (Some(limits), Some(dir)) = (&config.limits_file, path.parent()) {
            if limits.is_relative() {
                config.limits_file = Some(dir.join(limits));
            }
        }

        logging::info(
            EngineArea::Config,
            None,
            &format!("Loaded config from {} (standard {})", path.display(), config.standard),
        );
        Ok(config)
    }

    /// The configured limit table, or the built-in one when no file is set.
    ///
    /// A configured file that fails to load is an error; the engine does not
    /// silently fall back to built-in values.
    pub fn limit_table(&self) -> Result<LimitTable, EngineError> {
        match &self.limits_file {
            Some(path) => LimitTable::load(path).inspect_err(|err| {
                logging::log_failure(EngineArea::Config, "load limit table", err)
            }),
            None => Ok(LimitTable::builtin().clone()),
        }
    }

    /// Installs the global subscriber from the `[logging]` section.
    pub fn init_logging(&self) -> Result<(), EngineError> {
        logging::init_logger(
            self.logging.level,
            self.logging.file.as_deref(),
            self.logging.console_timestamps,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("airlens_config_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.standard, Standard::Uk);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert!(config.logging.console_timestamps);
    }

    #[test]
    fn test_full_config_parses() {
        let config = EngineConfig::from_toml_str(
            r#"
            standard = "WHO"
            limits_file = "limits.toml"

            [logging]
            level = "warn"
            file = "airlens.log"
            console_timestamps = false
            "#,
        )
        .unwrap();
        assert_eq!(config.standard, Standard::Who);
        assert_eq!(config.limits_file, Some(PathBuf::from("limits.toml")));
        assert_eq!(config.logging.level, LogLevel::Warning);
        assert_eq!(config.logging.file, Some(PathBuf::from("airlens.log")));
        assert!(!config.logging.console_timestamps);
    }

    #[test]
    fn test_unknown_standard_is_rejected() {
        assert!(matches!(
            EngineConfig::from_toml_str(r#"standard = "EPA""#),
            Err(EngineError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_builtin_table_without_limits_file() {
        let table = EngineConfig::default().limit_table().unwrap();
        assert_eq!(&table, LimitTable::builtin());
    }

    #[test]
    fn test_load_resolves_limits_file_next_to_config() {
        let dir = scratch_dir("relative");
        std::fs::write(dir.join("limits.toml"), LimitTable::builtin().to_toml_string().unwrap())
            .unwrap();
        std::fs::write(dir.join("engine.toml"), "limits_file = \"limits.toml\"\n").unwrap();

        let config = EngineConfig::load(dir.join("engine.toml")).unwrap();
        assert_eq!(config.limits_file, Some(dir.join("limits.toml")));
        assert_eq!(&config.limit_table().unwrap(), LimitTable::builtin());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_limits_file_is_an_error() {
        let config = EngineConfig {
            limits_file: Some(PathBuf::from("/nonexistent/airlens/limits.toml")),
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.limit_table(),
            Err(EngineError::ConfigRead { .. })
        ));
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        assert!(matches!(
            EngineConfig::load("/nonexistent/airlens/engine.toml"),
            Err(EngineError::ConfigRead { .. })
        ));
    }
}
