use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Timer values written into a synthesized SOA record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoaTimers {
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

impl Default for SoaTimers {
    fn default() -> Self {
        Self {
            serial: 2023120501,
            refresh: 10800,
            retry: 3600,
            expire: 604800,
            minimum: 3600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Base URL of the control plane API, e.g. `http://127.0.0.1:8081/api/v1`
    pub api_url: String,

    /// Credential sent as `X-API-Key` on every request
    pub api_key: String,

    /// Server id used in `/servers/{id}/zones`
    pub server_id: String,

    /// Directory holding `<domain>.db` zone files
    pub watch_dir: PathBuf,

    /// Nameserver written into synthesized SOA records
    pub primary_nameserver: String,

    /// Targets of the synthesized apex NS RRset
    pub nameservers: Vec<String>,

    /// TTL for records that never saw an explicit TTL, and for synthesized SOA
    pub default_ttl: u32,

    /// TTL of the synthesized apex NS RRset
    pub ns_ttl: u32,

    /// Timers for synthesized SOA records
    pub soa: SoaTimers,

    /// Per-request timeout enforced by the HTTP transport (seconds)
    pub request_timeout_secs: u64,

    /// Append log lines to this file instead of stderr
    pub log_file: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8081/api/v1".to_string(),
            api_key: String::new(),
            server_id: "localhost".to_string(),
            watch_dir: PathBuf::from("/var/named"),
            primary_nameserver: "ns1.hostup.se.".to_string(),
            nameservers: vec!["ns1.hostup.se.".to_string(), "ns2.hostup.se.".to_string()],
            default_ttl: 14400,
            ns_ttl: 3600,
            soa: SoaTimers::default(),
            request_timeout_secs: 30,
            log_file: None,
        }
    }
}

impl SyncConfig {
    /// Create a SyncConfig from defaults overridden by environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::load(None)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file, then apply environment overrides on top
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load(Some(path.as_ref()))?;
        config.validate()?;
        Ok(config)
    }

    /// File (or defaults) plus environment overrides, not yet validated
    ///
    /// Callers layering further overrides on top must call `validate` last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };
        config.apply_env()
    }

    /// Parse TOML content; keys that are absent keep their defaults
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn apply_env(mut self) -> Result<Self, ConfigError> {
        if let Ok(api_url) = std::env::var("ZONESYNC_API_URL") {
            self.api_url = api_url;
        }

        if let Ok(api_key) = std::env::var("ZONESYNC_API_KEY") {
            self.api_key = api_key;
        }

        if let Ok(server_id) = std::env::var("ZONESYNC_SERVER_ID") {
            self.server_id = server_id;
        }

        if let Ok(watch_dir) = std::env::var("ZONESYNC_WATCH_DIR") {
            self.watch_dir = PathBuf::from(watch_dir);
        }

        if let Ok(primary) = std::env::var("ZONESYNC_PRIMARY_NAMESERVER") {
            self.primary_nameserver = primary.trim().to_string();
        }

        if let Ok(nameservers) = std::env::var("ZONESYNC_NAMESERVERS") {
            self.nameservers = parse_list(&nameservers);
        }

        if let Ok(ttl) = std::env::var("ZONESYNC_DEFAULT_TTL") {
            self.default_ttl = parse_number(&ttl, ConfigError::InvalidTtl)?;
        }

        if let Ok(ttl) = std::env::var("ZONESYNC_NS_TTL") {
            self.ns_ttl = parse_number(&ttl, ConfigError::InvalidTtl)?;
        }

        if let Ok(timers) = std::env::var("ZONESYNC_SOA_TIMERS") {
            self.soa = parse_soa_timers(&timers)?;
        }

        if let Ok(timeout) = std::env::var("ZONESYNC_REQUEST_TIMEOUT") {
            self.request_timeout_secs = parse_number(&timeout, ConfigError::InvalidTimeout)?;
        }

        if let Ok(log_file) = std::env::var("ZONESYNC_LOG_FILE") {
            self.log_file = if log_file.is_empty() {
                None
            } else {
                Some(PathBuf::from(log_file))
            };
        }

        Ok(self)
    }

    /// Validate the configuration
    ///
    /// The API key is checked by the HTTP transport, so offline commands can
    /// run without one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(self.api_url.clone()));
        }

        if self.server_id.is_empty() || self.server_id.contains('/') {
            return Err(ConfigError::ParseError(format!(
                "Invalid server id: {:?}",
                self.server_id
            )));
        }

        if self.nameservers.is_empty() {
            return Err(ConfigError::InvalidNameservers(
                "At least one nameserver is required".to_string(),
            ));
        }

        if let Some(ns) = self
            .nameservers
            .iter()
            .chain(std::iter::once(&self.primary_nameserver))
            .find(|ns| !ns.ends_with('.') || ns.len() < 2)
        {
            return Err(ConfigError::InvalidNameservers(format!(
                "Nameserver must be fully qualified: {}",
                ns
            )));
        }

        if self.default_ttl == 0 || self.ns_ttl == 0 {
            return Err(ConfigError::InvalidTtl(
                "TTL must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ConfigError::InvalidTimeout(format!(
                "{} (must be 1-300 seconds)",
                self.request_timeout_secs
            )));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_number<T: std::str::FromStr>(
    s: &str,
    err: fn(String) -> ConfigError,
) -> Result<T, ConfigError> {
    s.trim().parse::<T>().map_err(|_| err(s.to_string()))
}

/// Parse `serial,refresh,retry,expire,minimum`
fn parse_soa_timers(s: &str) -> Result<SoaTimers, ConfigError> {
    let values: Vec<u32> = s
        .split(',')
        .map(|v| parse_number::<u32>(v, ConfigError::ParseError))
        .collect::<Result<Vec<u32>, _>>()?;

    match values.as_slice() {
        &[serial, refresh, retry, expire, minimum] => Ok(SoaTimers {
            serial,
            refresh,
            retry,
            expire,
            minimum,
        }),
        _ => Err(ConfigError::ParseError(format!(
            "SOA timers need 5 values, got {}",
            values.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SyncConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_ttl, 14400);
        assert_eq!(config.ns_ttl, 3600);
        assert_eq!(config.nameservers.len(), 2);
    }

    #[test]
    fn test_invalid_url() {
        let config = SyncConfig {
            api_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_relative_nameserver_rejected() {
        let config = SyncConfig {
            nameservers: vec!["ns1.example.com".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidNameservers(_))
        ));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let config = SyncConfig {
            ns_ttl: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let config = SyncConfig {
            request_timeout_secs: 400,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SyncConfig::from_toml(
            r#"
api_url = "https://pdns.internal/api/v1"
api_key = "secret"
nameservers = ["a.ns.example.", "b.ns.example."]

[soa]
serial = 2024010101
"#,
        )
        .unwrap();

        assert_eq!(config.api_url, "https://pdns.internal/api/v1");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.nameservers[1], "b.ns.example.");
        assert_eq!(config.soa.serial, 2024010101);
        assert_eq!(config.soa.refresh, 10800);
        assert_eq!(config.server_id, "localhost");
        assert_eq!(config.watch_dir, PathBuf::from("/var/named"));
    }

    #[test]
    fn test_parse_soa_timers() {
        let timers = parse_soa_timers("1, 2, 3, 4, 5").unwrap();
        assert_eq!(timers.serial, 1);
        assert_eq!(timers.minimum, 5);

        assert!(parse_soa_timers("1,2,3").is_err());
        assert!(parse_soa_timers("1,2,x,4,5").is_err());
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            parse_list(" ns1.a. ,ns2.a.,, "),
            vec!["ns1.a.".to_string(), "ns2.a.".to_string()]
        );
    }
}
