use super::{Config, ConfigError};
use url::Url;

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.prometheus_remote_write_uri).map_err(|e| {
            ConfigError::InvalidUrl(format!(
                "Invalid remote write URI '{}': {}",
                self.prometheus_remote_write_uri, e
            ))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "Unsupported scheme '{}' in remote write URI '{}'",
                url.scheme(),
                self.prometheus_remote_write_uri
            )));
        }

        if self.remote_write_timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "Remote write timeout must be greater than 0".to_string(),
            ));
        }

        if self.max_backoff_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "Max backoff must be greater than 0".to_string(),
            ));
        }

        if self.initial_backoff_secs > self.max_backoff_secs {
            return Err(ConfigError::InvalidConfig(format!(
                "Initial backoff ({}s) must not exceed max backoff ({}s)",
                self.initial_backoff_secs, self.max_backoff_secs
            )));
        }

        if self.max_record_bytes == 0 {
            return Err(ConfigError::InvalidConfig(
                "Max record size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
