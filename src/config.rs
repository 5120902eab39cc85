#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use chrono::TimeDelta;

/// Default GML format version stamped on new instances.
pub const DEFAULT_GML_VERSION: &str = "1.0";

/// Default sheet type stamped on new instances.
pub const DEFAULT_SHEET_TYPE: &str = "ADDITIVE";

/// Largest accepted leniency: one year, in minutes.
pub const MAX_LENIENCY_MINUTES: i64 = 365 * 24 * 60;

/// Process-wide settings read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigState {
    /// Grace window added to every deadline threshold, in minutes.
    leniency_minutes: i64,
    /// Version written on instances created from a bare sheet.
    gml_version:      String,
    /// Sheet type written on instances created from a bare sheet.
    sheet_type:       String,
}

impl Default for ConfigState {
    fn default() -> Self {
        Self {
            leniency_minutes: 0,
            gml_version:      DEFAULT_GML_VERSION.to_string(),
            sheet_type:       DEFAULT_SHEET_TYPE.to_string(),
        }
    }
}

impl ConfigState {
    /// Creates a configuration with explicit values. The leniency is clamped
    /// to `0..=MAX_LENIENCY_MINUTES`.
    pub fn new(
        leniency_minutes: i64,
        gml_version: impl Into<String>,
        sheet_type: impl Into<String>,
    ) -> Self {
        Self {
            leniency_minutes: leniency_minutes.clamp(0, MAX_LENIENCY_MINUTES),
            gml_version:      gml_version.into(),
            sheet_type:       sheet_type.into(),
        }
    }

    /// Builds a configuration from `GRADESHEET_*` environment variables,
    /// falling back to defaults for anything missing or malformed.
    fn from_env() -> Self {
        let defaults = Self::default();

        let leniency_minutes = match std::env::var("GRADESHEET_LENIENCY_MINUTES") {
            Ok(raw) => match raw.trim().parse::<i64>() {
                Ok(minutes) if (0..=MAX_LENIENCY_MINUTES).contains(&minutes) => minutes,
                _ => {
                    tracing::warn!(
                        value = %raw,
                        max = MAX_LENIENCY_MINUTES,
                        "GRADESHEET_LENIENCY_MINUTES is not an integer between 0 and max; using 0"
                    );
                    defaults.leniency_minutes
                }
            },
            Err(_) => defaults.leniency_minutes,
        };

        let gml_version = non_empty_env("GRADESHEET_GML_VERSION").unwrap_or(defaults.gml_version);
        let sheet_type = non_empty_env("GRADESHEET_SHEET_TYPE").unwrap_or(defaults.sheet_type);

        Self {
            leniency_minutes,
            gml_version,
            sheet_type,
        }
    }

    /// Leniency in minutes.
    pub fn leniency_minutes(&self) -> i64 {
        self.leniency_minutes
    }

    /// Leniency as a duration.
    pub fn leniency(&self) -> TimeDelta {
        TimeDelta::try_minutes(self.leniency_minutes).unwrap_or_else(TimeDelta::zero)
    }

    /// Version stamped on new instances.
    pub fn gml_version(&self) -> &str {
        &self.gml_version
    }

    /// Sheet type stamped on new instances.
    pub fn sheet_type(&self) -> &str {
        &self.sheet_type
    }
}

/// Reads an environment variable, treating blank values as unset.
fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Shared configuration handle used throughout the crate.
#[derive(Clone, Debug)]
pub struct ConfigHandle(Arc<ConfigState>);

impl std::ops::Deref for ConfigHandle {
    type Target = ConfigState;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Global storage for the lazily constructed configuration state.
static CONFIG_SLOT: OnceLock<Mutex<Option<Arc<ConfigState>>>> = OnceLock::new();

/// Returns the mutex guarding the global configuration slot.
fn slot() -> &'static Mutex<Option<Arc<ConfigState>>> {
    CONFIG_SLOT.get_or_init(|| Mutex::new(None))
}

/// Returns the active configuration, reading the environment on first use.
pub fn get() -> ConfigHandle {
    let mut guard = slot().lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(cfg) = guard.as_ref() {
        return ConfigHandle(Arc::clone(cfg));
    }

    let cfg = Arc::new(ConfigState::from_env());
    tracing::debug!(
        leniency_minutes = cfg.leniency_minutes,
        gml_version = %cfg.gml_version,
        "loaded configuration"
    );
    *guard = Some(Arc::clone(&cfg));
    ConfigHandle(cfg)
}

/// Replaces the active configuration.
pub fn override_with(state: ConfigState) {
    let mut guard = slot().lock().unwrap_or_else(PoisonError::into_inner);
    *guard = Some(Arc::new(state));
}

/// Returns the configured deadline leniency.
pub fn leniency() -> TimeDelta {
    get().leniency()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_leniency_is_clamped() {
        let state = ConfigState::new(-5, "2.0", "SUBTRACTIVE");
        assert_eq!(state.leniency_minutes(), 0);
        assert_eq!(state.gml_version(), "2.0");
        assert_eq!(state.sheet_type(), "SUBTRACTIVE");
    }

    #[test]
    fn huge_leniency_is_clamped() {
        let state = ConfigState::new(i64::MAX / 2, "1.0", "ADDITIVE");
        assert_eq!(state.leniency_minutes(), MAX_LENIENCY_MINUTES);
        assert_eq!(state.leniency(), TimeDelta::days(365));

        let state = ConfigState::new(i64::MAX, "1.0", "ADDITIVE");
        assert_eq!(state.leniency(), TimeDelta::days(365));
    }
}
