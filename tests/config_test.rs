use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;
use zonesync::config::SyncConfig;
use zonesync::error::ConfigError;

// Tests that modify environment variables must not run concurrently
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Sets variables for the duration of a test and restores them on drop
struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    fn set(vars: &[(&'static str, &str)]) -> Self {
        let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let mut saved = Vec::new();
        for (key, value) in vars {
            saved.push((*key, std::env::var(key).ok()));
            unsafe {
                std::env::set_var(key, value);
            }
        }
        Self { saved, _lock: lock }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, original) in self.saved.drain(..) {
            unsafe {
                match original {
                    Some(val) => std::env::set_var(key, val),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}

#[test]
fn test_from_env_overrides_defaults() {
    let _env = EnvGuard::set(&[
        ("ZONESYNC_API_URL", "https://pdns.example.net/api/v1"),
        ("ZONESYNC_API_KEY", "env-secret"),
        ("ZONESYNC_WATCH_DIR", "/srv/zones"),
        ("ZONESYNC_NAMESERVERS", "a.ns.example.net., b.ns.example.net."),
        ("ZONESYNC_DEFAULT_TTL", "7200"),
        ("ZONESYNC_SOA_TIMERS", "2024060101,7200,1800,1209600,300"),
    ]);

    let config = SyncConfig::from_env().unwrap();

    assert_eq!(config.api_url, "https://pdns.example.net/api/v1");
    assert_eq!(config.api_key, "env-secret");
    assert_eq!(config.watch_dir, PathBuf::from("/srv/zones"));
    assert_eq!(
        config.nameservers,
        vec!["a.ns.example.net.".to_string(), "b.ns.example.net.".to_string()]
    );
    assert_eq!(config.default_ttl, 7200);
    assert_eq!(config.soa.serial, 2024060101);
    assert_eq!(config.soa.minimum, 300);
    // Untouched keys keep their defaults
    assert_eq!(config.ns_ttl, 3600);
    assert_eq!(config.server_id, "localhost");
}

#[test]
fn test_from_env_rejects_malformed_numbers() {
    let _env = EnvGuard::set(&[("ZONESYNC_NS_TTL", "an hour")]);

    assert!(matches!(
        SyncConfig::from_env(),
        Err(ConfigError::InvalidTtl(_))
    ));
}

#[test]
fn test_from_file_applies_env_after_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
api_url = "http://10.0.0.5:8081/api/v1"
api_key = "file-secret"
server_id = "primary"
default_ttl = 600
"#
    )
    .unwrap();
    file.flush().unwrap();

    let _env = EnvGuard::set(&[("ZONESYNC_API_KEY", "env-secret")]);
    let config = SyncConfig::from_file(file.path()).unwrap();

    assert_eq!(config.api_url, "http://10.0.0.5:8081/api/v1");
    assert_eq!(config.server_id, "primary");
    assert_eq!(config.default_ttl, 600);
    assert_eq!(config.api_key, "env-secret");
}

#[test]
fn test_from_file_missing_file() {
    let result = SyncConfig::from_file("/nonexistent/zonesync.toml");
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_load_defers_validation_to_caller() {
    let _env = EnvGuard::set(&[("ZONESYNC_API_URL", "pdns.internal")]);

    assert!(matches!(
        SyncConfig::from_env(),
        Err(ConfigError::InvalidUrl(_))
    ));

    let mut config = SyncConfig::load(None).unwrap();
    assert_eq!(config.api_url, "pdns.internal");
    assert!(config.validate().is_err());

    config.api_url = "https://pdns.internal/api/v1".to_string();
    assert!(config.validate().is_ok());
}
