use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::level_filters::LevelFilter;

pub mod defaults;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub lookup: LookupConfig,
    pub storage: StorageConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address, e.g. "127.0.0.1:8080"
    pub addr: String,
    /// Upper bound for handling a single request
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Base URL of the song info service (`/info` is appended)
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file
    pub database: PathBuf,
    pub pool_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Used when RUST_LOG is not set (trace, debug, info, warn, error, off)
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: defaults::ADDR.to_string(),
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::LOOKUP_BASE_URL.to_string(),
            timeout_secs: defaults::LOOKUP_TIMEOUT_SECS,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: defaults::data_dir().join("songs.sqlite3"),
            pool_size: defaults::POOL_SIZE,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Check every field once, before anything is started.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .addr
            .parse::<SocketAddr>()
            .with_context(|| format!("server.addr: invalid address {:?}", self.server.addr))?;
        if self.server.request_timeout_secs == 0 {
            anyhow::bail!("server.request_timeout_secs must be positive");
        }

        let url = reqwest::Url::parse(&self.lookup.base_url)
            .with_context(|| format!("lookup.base_url: invalid url {:?}", self.lookup.base_url))?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("lookup.base_url must be an absolute http(s) url");
        }
        if self.lookup.timeout_secs == 0 {
            anyhow::bail!("lookup.timeout_secs must be positive");
        }

        if self.storage.database.as_os_str().is_empty() {
            anyhow::bail!("storage.database must not be empty");
        }
        if self.storage.pool_size == 0 {
            anyhow::bail!("storage.pool_size must be positive");
        }

        self.log_level()?;
        Ok(())
    }

    pub fn log_level(&self) -> anyhow::Result<LevelFilter> {
        self.log
            .level
            .parse::<LevelFilter>()
            .with_context(|| format!("log.level: unknown level {:?}", self.log.level))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup.timeout_secs)
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let proj = ProjectDirs::from("dev", "songbook", "songbook").context("ProjectDirs unavailable")?;
    Ok(proj.config_dir().join("config.toml"))
}

pub fn load(override_path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        let cfg = defaults::defaults();
        write(&cfg, &path)?;
        return Ok(cfg);
    }

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg = toml::from_str::<Config>(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

fn write(cfg: &Config, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    let raw = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, raw).with_context(|| format!("write {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = defaults::defaults();
        cfg.validate().unwrap();
        assert_eq!(cfg.lookup_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.server.addr, "127.0.0.1:8080");
        assert!(cfg.storage.database.ends_with("songs.sqlite3"));
    }

    #[test]
    fn test_load_writes_defaults_when_missing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("conf").join("config.toml");

        let cfg = load(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.log.level, "info");

        let again = load(Some(&path)).unwrap();
        assert_eq!(again.server.addr, cfg.server.addr);
        assert_eq!(again.storage.database, cfg.storage.database);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[lookup]
base_url = "http://info.internal:9000"

[log]
level = "debug"
"#,
        )
        .unwrap();

        let cfg = load(Some(&path)).unwrap();
        assert_eq!(cfg.lookup.base_url, "http://info.internal:9000");
        assert_eq!(cfg.lookup.timeout_secs, 5);
        assert_eq!(cfg.server.request_timeout_secs, 15);
        assert_eq!(cfg.log_level().unwrap(), LevelFilter::DEBUG);
        cfg.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = defaults::defaults();
        cfg.server.addr = "localhost".into();
        assert!(cfg.validate().is_err());

        let mut cfg = defaults::defaults();
        cfg.lookup.base_url = "not a url".into();
        assert!(cfg.validate().is_err());

        let mut cfg = defaults::defaults();
        cfg.lookup.base_url = "ftp://info.internal/".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("http(s)"));

        let mut cfg = defaults::defaults();
        cfg.lookup.base_url = "https://info.internal/api".into();
        cfg.validate().unwrap();

        let mut cfg = defaults::defaults();
        cfg.lookup.timeout_secs = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = defaults::defaults();
        cfg.storage.pool_size = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = defaults::defaults();
        cfg.log.level = "loud".into();
        assert!(cfg.validate().is_err());
    }
}
