//! Configuration module - resolved run settings

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};

/// Optional settings for [`Config::new`]; `None` means the documented default.
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    pub verify_tls: Option<bool>,
    pub recursive: Option<bool>,
    pub exclude_patterns: Vec<String>,
    pub sleep_secs: Option<f64>,
    pub retries: Option<u32>,
    pub retry_delay_secs: Option<f64>,
    pub timeout_secs: Option<u64>,
}

/// Resolved run configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub token: String,
    pub verify_tls: bool,
    pub target_path: PathBuf,
    pub recursive: bool,
    pub exclude_patterns: Vec<String>,
    /// Pacing delay inserted between successive files.
    pub inter_upload_delay: Duration,
    pub max_attempts: u32,
    /// Base retry delay; the wait before attempt k+1 is `base * k`.
    pub base_retry_delay: Duration,
    pub request_timeout: Duration,
}

impl Config {
    /// Create a new Config with required target path, host and token,
    /// plus optional settings
    pub fn new(
        target_path: PathBuf,
        host: String,
        token: String,
        options: ConfigOptions,
    ) -> Result<Self> {
        if host.trim().is_empty() {
            return Err(anyhow!("host cannot be empty"));
        }

        // Ensure host uses https:// (using strip_prefix to avoid replacing
        // http:// in a path component)
        let host = if let Some(rest) = host.strip_prefix("http://") {
            format!("https://{}", rest)
        } else if host.starts_with("https://") {
            host
        } else {
            format!("https://{}", host)
        };

        // Remove trailing slash
        let host = host.trim_end_matches('/').to_string();

        if token.is_empty() {
            return Err(anyhow!("token cannot be empty"));
        }

        let max_attempts = options.retries.unwrap_or(3);
        if max_attempts < 1 {
            return Err(anyhow!("retries must be at least 1"));
        }

        let sleep_secs = options.sleep_secs.unwrap_or(2.0);
        let retry_delay_secs = options.retry_delay_secs.unwrap_or(5.0);
        if !sleep_secs.is_finite() || sleep_secs < 0.0 {
            return Err(anyhow!("sleep must be a non-negative number"));
        }
        if !retry_delay_secs.is_finite() || retry_delay_secs < 0.0 {
            return Err(anyhow!("retry delay must be a non-negative number"));
        }

        Ok(Self {
            host,
            token,
            verify_tls: options.verify_tls.unwrap_or(true),
            target_path,
            recursive: options.recursive.unwrap_or(false),
            exclude_patterns: options.exclude_patterns,
            inter_upload_delay: Duration::from_secs_f64(sleep_secs),
            max_attempts,
            base_retry_delay: Duration::from_secs_f64(retry_delay_secs),
            request_timeout: Duration::from_secs(options.timeout_secs.unwrap_or(300)),
        })
    }
}

/// Parse a truthy environment-style string (`1`, `yes`, `true`, `on`)
pub fn truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "yes" | "true" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal(host: &str, token: &str) -> Result<Config> {
        Config::new(
            PathBuf::from("/samples"),
            host.to_string(),
            token.to_string(),
            ConfigOptions::default(),
        )
    }

    #[test]
    fn test_host_normalization() {
        let config = minimal("a1000.example.com", "t").unwrap();
        assert_eq!(config.host, "https://a1000.example.com");

        let config = minimal("http://a1000.example.com/", "t").unwrap();
        assert_eq!(config.host, "https://a1000.example.com");

        let config = minimal("https://a1000.example.com", "t").unwrap();
        assert_eq!(config.host, "https://a1000.example.com");
    }

    #[test]
    fn test_empty_credentials_rejected() {
        assert!(minimal("", "t").is_err());
        assert!(minimal("a1000.example.com", "").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = minimal("a1000.example.com", "t").unwrap();
        assert!(config.verify_tls);
        assert!(!config.recursive);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.inter_upload_delay, Duration::from_secs(2));
        assert_eq!(config.base_retry_delay, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_truthy() {
        assert!(truthy("1"));
        assert!(truthy("Yes"));
        assert!(truthy(" true "));
        assert!(truthy("ON"));
        assert!(!truthy("no"));
        assert!(!truthy("0"));
        assert!(!truthy(""));
    }
}
