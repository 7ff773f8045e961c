//! File-backed configuration.
//!
//! ```toml
//! [limits]
//! time_ms = 2000
//! memory_mb = 512
//! steps = 1000000
//!
//! [watchdog]
//! poll_interval_ms = 10
//! ```

use crate::{ConfigError, Limits, ResourceLimit};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub limits: LimitsConfig,
    pub watchdog: WatchdogConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    pub time_ms: Option<u64>,
    pub memory_mb: Option<u64>,
    pub steps: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchdogConfig {
    pub poll_interval_ms: u64,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

fn positive(key: &str, value: u64) -> Result<u64, ConfigError> {
    if value == 0 {
        Err(ConfigError::InvalidValue {
            key: key.into(),
            msg: "must be greater than zero".into(),
        })
    } else {
        Ok(value)
    }
}

impl Config {
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|err| ConfigError::Parse {
            msg: err.message().to_string(),
        })
    }

    /// Validated limits. Zero thresholds are rejected rather than treated as "unlimited".
    pub fn limits(&self) -> Result<Limits, ConfigError> {
        let mut limits = Limits::none();
        if let Some(ms) = self.limits.time_ms {
            let ms = positive("limits.time_ms", ms)?;
            limits.set(ResourceLimit::Time(Duration::from_millis(ms)));
        }
        if let Some(mb) = self.limits.memory_mb {
            let bytes = positive("limits.memory_mb", mb)?
                .checked_mul(1024 * 1024)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "limits.memory_mb".into(),
                    msg: "too large".into(),
                })?;
            limits.set(ResourceLimit::Memory(bytes));
        }
        if let Some(steps) = self.limits.steps {
            limits.set(ResourceLimit::Steps(positive("limits.steps", steps)?));
        }
        Ok(limits)
    }

    pub fn poll_interval(&self) -> Result<Duration, ConfigError> {
        positive("watchdog.poll_interval_ms", self.watchdog.poll_interval_ms)
            .map(Duration::from_millis)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn empty_file_means_no_limits() {
        let config = Config::from_toml("").expect("valid config");
        assert_eq!(config, Config::default());
        assert_eq!(config.limits(), Ok(Limits::none()));
        assert_eq!(
            config.poll_interval(),
            Ok(Duration::from_millis(DEFAULT_POLL_INTERVAL_MS))
        );
    }

    #[test]
    fn full_file() {
        let config = Config::from_toml(
            r#"
            [limits]
            time_ms = 1500
            memory_mb = 2
            steps = 100

            [watchdog]
            poll_interval_ms = 5
            "#,
        )
        .expect("valid config");

        assert_eq!(
            config.limits(),
            Ok(Limits::none()
                .with(ResourceLimit::Time(Duration::from_millis(1500)))
                .with(ResourceLimit::Memory(2 * 1024 * 1024))
                .with(ResourceLimit::Steps(100)))
        );
        assert_eq!(config.poll_interval(), Ok(Duration::from_millis(5)));
    }

    #[rstest]
    #[case("[limits]\ntime_ms = 0", "limits.time_ms")]
    #[case("[limits]\nmemory_mb = 0", "limits.memory_mb")]
    #[case("[limits]\nsteps = 0", "limits.steps")]
    fn zero_limits_are_rejected(#[case] source: &str, #[case] key: &str) {
        let config = Config::from_toml(source).expect("valid toml");
        assert_eq!(
            config.limits(),
            Err(ConfigError::InvalidValue {
                key: key.into(),
                msg: "must be greater than zero".into(),
            })
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            Config::from_toml("[limits]\nseconds = 3"),
            Err(ConfigError::Parse { .. })
        ));
    }
}
