//! INI configuration file.
//!
//! ```ini
//! [tracking]
//! interval_ms = 5000
//! distance_threshold_m = 300
//! speed_limit_kmh = 40
//! fix_timeout_ms = 20000
//! max_fix_age_ms = 1000
//!
//! [store]
//! path = locations.jsonl
//!
//! [logging]
//! level = info
//! directory =
//! ```
//!
//! A missing file yields the defaults. Unknown keys are ignored; a value
//! that does not parse is an error naming its section and key.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::sample::{EvaluatorConfig, DEFAULT_DISTANCE_THRESHOLD_M, DEFAULT_SPEED_LIMIT_KMH};
use crate::session::{SessionConfig, DEFAULT_FIX_TIMEOUT, DEFAULT_INTERVAL_MS, DEFAULT_MAX_FIX_AGE};

const CONFIG_DIR_NAME: &str = "geotrack";
const CONFIG_FILE_NAME: &str = "config.ini";
const DEFAULT_STORE_PATH: &str = "locations.jsonl";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors loading or saving the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid value '{value}' for {section}.{key}: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl From<ini::Error> for ConfigError {
    fn from(e: ini::Error) -> Self {
        match e {
            ini::Error::Io(e) => ConfigError::Io(e),
            ini::Error::Parse(e) => ConfigError::Parse(e.to_string()),
        }
    }
}

/// `[tracking]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingSettings {
    pub interval_ms: u64,
    pub distance_threshold_m: f64,
    pub speed_limit_kmh: f64,
    pub fix_timeout_ms: u64,
    pub max_fix_age_ms: u64,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            distance_threshold_m: DEFAULT_DISTANCE_THRESHOLD_M,
            speed_limit_kmh: DEFAULT_SPEED_LIMIT_KMH,
            fix_timeout_ms: DEFAULT_FIX_TIMEOUT.as_millis() as u64,
            max_fix_age_ms: DEFAULT_MAX_FIX_AGE.as_millis() as u64,
        }
    }
}

/// `[store]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSettings {
    /// JSON-lines file synced fixes are appended to.
    pub path: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Directory for daily log files. Console only when unset.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            directory: None,
        }
    }
}

/// The parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub tracking: TrackingSettings,
    pub store: StoreSettings,
    pub logging: LoggingSettings,
}

/// Default configuration file location, e.g. `~/.config/geotrack/config.ini`.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

impl ConfigFile {
    /// Load from the default location, or defaults if there is none.
    pub fn load() -> Result<Self, ConfigError> {
        match config_file_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`, or defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path)?;
        Self::from_ini(&ini)
    }

    /// Parse configuration text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let reader = Reader { ini };

        let tracking = &mut config.tracking;
        reader.read("tracking", "interval_ms", &mut tracking.interval_ms)?;
        reader.read("tracking", "distance_threshold_m", &mut tracking.distance_threshold_m)?;
        reader.read("tracking", "speed_limit_kmh", &mut tracking.speed_limit_kmh)?;
        reader.read("tracking", "fix_timeout_ms", &mut tracking.fix_timeout_ms)?;
        reader.read("tracking", "max_fix_age_ms", &mut tracking.max_fix_age_ms)?;

        // A zero timeout or maximum age would skip every tick.
        for (key, value) in [
            ("interval_ms", tracking.interval_ms),
            ("fix_timeout_ms", tracking.fix_timeout_ms),
            ("max_fix_age_ms", tracking.max_fix_age_ms),
        ] {
            if value == 0 {
                return Err(invalid("tracking", key, "0", "must be greater than zero"));
            }
        }
        for (key, value) in [
            ("distance_threshold_m", tracking.distance_threshold_m),
            ("speed_limit_kmh", tracking.speed_limit_kmh),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid("tracking", key, &value.to_string(), "must be a non-negative number"));
            }
        }

        if let Some(path) = reader.get("store", "path") {
            config.store.path = PathBuf::from(path);
        }

        if let Some(level) = reader.get("logging", "level") {
            config.logging.level = level.to_string();
        }
        config.logging.directory = reader.get("logging", "directory").map(PathBuf::from);

        Ok(config)
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.to_ini().write_to_file(path)?;
        Ok(())
    }

    /// Render as INI text.
    pub fn to_ini_string(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.to_ini().write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        ini.with_section(Some("tracking"))
            .set("interval_ms", self.tracking.interval_ms.to_string())
            .set("distance_threshold_m", self.tracking.distance_threshold_m.to_string())
            .set("speed_limit_kmh", self.tracking.speed_limit_kmh.to_string())
            .set("fix_timeout_ms", self.tracking.fix_timeout_ms.to_string())
            .set("max_fix_age_ms", self.tracking.max_fix_age_ms.to_string());
        ini.with_section(Some("store"))
            .set("path", self.store.path.to_string_lossy());
        ini.with_section(Some("logging"))
            .set("level", self.logging.level.as_str())
            .set(
                "directory",
                self.logging
                    .directory
                    .as_ref()
                    .map(|d| d.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );
        ini
    }

    /// Session configuration derived from the `[tracking]` section.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::default()
            .with_evaluator(
                EvaluatorConfig::default()
                    .with_distance_threshold(self.tracking.distance_threshold_m)
                    .with_speed_limit(self.tracking.speed_limit_kmh),
            )
            .with_fix_timeout(Duration::from_millis(self.tracking.fix_timeout_ms))
            .with_max_fix_age(Duration::from_millis(self.tracking.max_fix_age_ms))
    }
}

struct Reader<'a> {
    ini: &'a Ini,
}

impl Reader<'_> {
    /// Non-empty value for `section.key`.
    fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.ini
            .section(Some(section))
            .and_then(|s| s.get(key))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Parse `section.key` into `target` if present.
    fn read<T: FromStr>(&self, section: &str, key: &str, target: &mut T) -> Result<(), ConfigError>
    where
        T::Err: std::fmt::Display,
    {
        if let Some(raw) = self.get(section, key) {
            *target = raw
                .parse()
                .map_err(|e: T::Err| invalid(section, key, raw, &e.to_string()))?;
        }
        Ok(())
    }
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = ConfigFile::parse("").unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.tracking.interval_ms, 5000);
        assert_eq!(config.tracking.fix_timeout_ms, 20_000);
        assert_eq!(config.tracking.max_fix_age_ms, 1000);
    }

    #[test]
    fn test_parse_all_sections() {
        let config = ConfigFile::parse(
            "[tracking]\n\
             interval_ms = 2000\n\
             distance_threshold_m = 150.5\n\
             speed_limit_kmh = 60\n\
             \n\
             [store]\n\
             path = /var/lib/geotrack/out.jsonl\n\
             \n\
             [logging]\n\
             level = debug\n\
             directory = /var/log/geotrack\n",
        )
        .unwrap();

        assert_eq!(config.tracking.interval_ms, 2000);
        assert_eq!(config.tracking.distance_threshold_m, 150.5);
        assert_eq!(config.tracking.speed_limit_kmh, 60.0);
        assert_eq!(config.tracking.fix_timeout_ms, 20_000);
        assert_eq!(config.store.path, PathBuf::from("/var/lib/geotrack/out.jsonl"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.logging.directory,
            Some(PathBuf::from("/var/log/geotrack"))
        );
    }

    #[test]
    fn test_invalid_value_names_key() {
        let err = ConfigFile::parse("[tracking]\nspeed_limit_kmh = fast\n").unwrap_err();
        match err {
            ConfigError::InvalidValue { section, key, .. } => {
                assert_eq!(section, "tracking");
                assert_eq!(key, "speed_limit_kmh");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(matches!(
            ConfigFile::parse("[tracking]\ninterval_ms = 0\n"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_zero_max_fix_age_rejected() {
        match ConfigFile::parse("[tracking]\nmax_fix_age_ms = 0\n") {
            Err(ConfigError::InvalidValue { section, key, .. }) => {
                assert_eq!(section, "tracking");
                assert_eq!(key, "max_fix_age_ms");
            }
            other => panic!("expected invalid value, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_fix_timeout_rejected() {
        assert!(matches!(
            ConfigFile::parse("[tracking]\nfix_timeout_ms = 0\n"),
            Err(ConfigError::InvalidValue { key, .. }) if key == "fix_timeout_ms"
        ));
    }

    #[test]
    fn test_negative_threshold_rejected() {
        assert!(ConfigFile::parse("[tracking]\ndistance_threshold_m = -5\n").is_err());
    }

    #[test]
    fn test_empty_directory_means_console_only() {
        let config = ConfigFile::parse("[logging]\ndirectory =\n").unwrap();
        assert!(config.logging.directory.is_none());
    }

    #[test]
    fn test_session_config() {
        let config = ConfigFile::parse(
            "[tracking]\ndistance_threshold_m = 100\nspeed_limit_kmh = 80\nfix_timeout_ms = 3000\nmax_fix_age_ms = 250\n",
        )
        .unwrap();

        let session = config.session_config();
        assert_eq!(session.evaluator.distance_threshold_m, 100.0);
        assert_eq!(session.evaluator.speed_limit_kmh, 80.0);
        assert_eq!(session.fix_timeout, Duration::from_secs(3));
        assert_eq!(session.max_fix_age, Duration::from_millis(250));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geotrack").join("config.ini");

        let mut config = ConfigFile::default();
        config.tracking.speed_limit_kmh = 55.0;
        config.logging.directory = Some(PathBuf::from("/tmp/logs"));
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = ConfigFile::load_from(&dir.path().join("absent.ini")).unwrap();
        assert_eq!(loaded, ConfigFile::default());
    }

    #[test]
    fn test_to_ini_string_round_trips() {
        let text = ConfigFile::default().to_ini_string();
        assert!(text.contains("[tracking]"));
        assert_eq!(ConfigFile::parse(&text).unwrap(), ConfigFile::default());
    }
}
