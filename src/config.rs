//! Optional YAML run configuration.
//!
//! Everything here has a default, so the file may be missing or partial:
//!
//! ```yaml
//! proxies:
//!   - socks5://127.0.0.1:9050
//!   - socks5://127.0.0.1:9150
//! throttle:
//!   min_secs: 3
//!   max_secs: 5
//! backoff_secs: 2
//! timeout_secs: 30
//! ```

use crate::error::Result;
use crate::fetch::proxy::{DEFAULT_BACKOFF, DEFAULT_PROXY};
use crate::scraper::ThrottleConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleSettings {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            min_secs: 3.0,
            max_secs: 5.0,
        }
    }
}

impl ThrottleSettings {
    /// Apply command-line bounds. A lone bound that crosses the other one
    /// drags it along, so `--min-delay 10` alone means a fixed 10 s pause.
    pub fn override_with(&mut self, min_secs: Option<f64>, max_secs: Option<f64>) {
        match (min_secs, max_secs) {
            (Some(min), Some(max)) => (self.min_secs, self.max_secs) = (min, max),
            (Some(min), None) => {
                self.min_secs = min;
                self.max_secs = self.max_secs.max(min);
            }
            (None, Some(max)) => {
                self.max_secs = max;
                self.min_secs = self.min_secs.min(max);
            }
            (None, None) => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapsConfig {
    pub proxies: Vec<String>,
    pub throttle: ThrottleSettings,
    pub backoff_secs: f64,
    pub timeout_secs: u64,
}

impl Default for ScrapsConfig {
    fn default() -> Self {
        Self {
            proxies: vec![DEFAULT_PROXY.to_string()],
            throttle: ThrottleSettings::default(),
            backoff_secs: DEFAULT_BACKOFF.as_secs_f64(),
            timeout_secs: 30,
        }
    }
}

impl ScrapsConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref()).await?;
        let config = Self::from_yaml(&text)?;
        info!(proxies = config.proxies.len(), "Loaded configuration");
        Ok(config)
    }

    /// # Errors
    ///
    /// [`crate::Error::InvalidThrottle`] if the bounds are inverted, or
    /// [`crate::Error::InvalidArgument`] if either is negative or not finite.
    pub fn throttle(&self) -> Result<ThrottleConfig> {
        ThrottleConfig::new(
            secs(self.throttle.min_secs, "throttle.min_secs")?,
            secs(self.throttle.max_secs, "throttle.max_secs")?,
        )
    }

    pub fn backoff(&self) -> Result<Duration> {
        secs(self.backoff_secs, "backoff_secs")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn secs(value: f64, name: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .map_err(|e| crate::Error::InvalidArgument(format!("{name} = {value}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_defaults_match_tor_setup() {
        let config = ScrapsConfig::default();
        assert_eq!(config.proxies, vec![DEFAULT_PROXY.to_string()]);
        assert_eq!(config.backoff().unwrap(), Duration::from_secs(2));
        assert_eq!(
            config.throttle().unwrap(),
            ThrottleConfig::new(Duration::from_secs(3), Duration::from_secs(5)).unwrap()
        );
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ScrapsConfig::from_yaml(
            "proxies:\n  - socks5://10.0.0.1:9050\n  - http://10.0.0.2:8080\nthrottle:\n  max_secs: 40\n",
        )
        .unwrap();
        assert_eq!(config.proxies.len(), 2);
        assert_eq!(config.throttle.min_secs, 3.0);
        assert_eq!(config.throttle.max_secs, 40.0);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_throttle_is_rejected() {
        let config = ScrapsConfig::from_yaml("throttle:\n  min_secs: 20\n  max_secs: 10\n").unwrap();
        assert!(matches!(config.throttle(), Err(Error::InvalidThrottle { .. })));

        let config = ScrapsConfig::from_yaml("backoff_secs: -1\n").unwrap();
        assert!(matches!(config.backoff(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_single_throttle_override_moves_other_bound() {
        let mut config = ScrapsConfig::default();
        config.throttle.override_with(Some(10.0), None);
        assert_eq!(
            config.throttle().unwrap(),
            ThrottleConfig::new(Duration::from_secs(10), Duration::from_secs(10)).unwrap()
        );

        let mut config = ScrapsConfig::default();
        config.throttle.override_with(None, Some(1.0));
        assert_eq!((config.throttle.min_secs, config.throttle.max_secs), (1.0, 1.0));

        let mut config = ScrapsConfig::default();
        config.throttle.override_with(Some(4.0), None);
        assert_eq!((config.throttle.min_secs, config.throttle.max_secs), (4.0, 5.0));
    }

    #[test]
    fn test_explicit_inverted_throttle_override_still_fails() {
        let mut config = ScrapsConfig::default();
        config.throttle.override_with(Some(10.0), Some(2.0));
        assert!(matches!(config.throttle(), Err(Error::InvalidThrottle { .. })));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scraps.yaml");
        std::fs::write(&path, "backoff_secs: 0.5\ntimeout_secs: 10\n").unwrap();

        let config = ScrapsConfig::load(&path).await.unwrap();
        assert_eq!(config.backoff().unwrap(), Duration::from_millis(500));
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_io_error() {
        let err = ScrapsConfig::load("/definitely/not/here.yaml").await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
