//! Side-channel polling configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Side-channel polling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Refresh interval in seconds
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

impl PollingConfig {
    /// Get interval as Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Validate polling configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval_secs < 5 {
            return Err(ValidationError::PollingIntervalTooShort);
        }
        Ok(())
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
        }
    }
}

fn default_interval() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_interval_is_one_minute() {
        let config = PollingConfig::default();
        assert_eq!(config.interval(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn too_short_interval_is_rejected() {
        let config = PollingConfig { interval_secs: 1 };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::PollingIntervalTooShort)
        ));
    }
}
