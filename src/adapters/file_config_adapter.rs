//! INI file configuration adapter.
//!
//! Sections and keys are case-insensitive. Typed getters fall back to the caller's
//! default when a key is absent; a value that is present but malformed also falls
//! back, with a warning naming the file and key so a typo is not silent.

use crate::domain::error::ScannerError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;
use tracing::warn;

const INLINE_SOURCE: &str = "<inline>";

pub struct FileConfigAdapter {
    config: Ini,
    /// Where the settings came from, for diagnostics.
    source: String,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScannerError> {
        let source = path.as_ref().display().to_string();
        let mut config = Ini::new();
        config
            .load(path.as_ref())
            .map_err(|reason| ScannerError::ConfigParse {
                file: source.clone(),
                reason,
            })?;
        Ok(Self { config, source })
    }

    pub fn from_string(content: &str) -> Result<Self, ScannerError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| ScannerError::ConfigParse {
                file: INLINE_SOURCE.to_string(),
                reason,
            })?;
        Ok(Self {
            config,
            source: INLINE_SOURCE.to_string(),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parse a present value with `parse`, warning and returning `None` when it is malformed.
    fn typed<T>(
        &self,
        section: &str,
        key: &str,
        expected: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Option<T> {
        let raw = self.config.get(section, key)?;
        let parsed = parse(raw.trim());
        if parsed.is_none() {
            warn!(
                file = %self.source,
                section,
                key,
                value = %raw,
                "ignoring {} value that is not {}",
                key,
                expected
            );
        }
        parsed
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.typed(section, key, "an integer", |v| v.parse().ok())
            .unwrap_or(default)
    }

    /// NaN and infinities are treated as malformed.
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.typed(section, key, "a finite number", |v| {
            v.parse::<f64>().ok().filter(|x| x.is_finite())
        })
        .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.typed(section, key, "a boolean", parse_bool)
            .unwrap_or(default)
    }
}
