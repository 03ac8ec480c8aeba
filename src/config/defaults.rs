use super::Config;
use directories::ProjectDirs;
use std::path::PathBuf;

pub const ADDR: &str = "127.0.0.1:8080";
pub const REQUEST_TIMEOUT_SECS: u64 = 15;
pub const LOOKUP_BASE_URL: &str = "http://localhost:8081";
pub const LOOKUP_TIMEOUT_SECS: u64 = 5;
pub const POOL_SIZE: u32 = 8;
pub const LOG_LEVEL: &str = "info";

pub fn defaults() -> Config {
    Config::default()
}

pub fn data_dir() -> PathBuf {
    ProjectDirs::from("dev", "songbook", "songbook")
        .map(|p| p.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("songbook"))
}
