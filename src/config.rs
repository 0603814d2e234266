use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// sgID client registration.
#[derive(Debug, Clone)]
pub struct SgidConfig {
    pub hostname: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_workers: usize,
    pub db_path: String,
    /// Directory the filesystem blob store writes images into.
    pub blob_dir: PathBuf,
    /// Public URL prefix prepended to blob keys when rendering images.
    /// A local path (`/uploads/`) is also the route the app serves them on.
    pub blob_path: String,
    pub max_upload_bytes: u64,
    pub session_ttl_secs: i64,
    pub cookie_secure: bool,
    pub sgid: SgidConfig,
}

impl AppConfig {
    /// Load `.env` if present, then read every key from the environment
    /// falling back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            host: var_or("APP_HOST", "127.0.0.1"),
            port: parse_or("APP_PORT", 1337)?,
            max_workers: parse_or("MAX_WORKERS", 8)?,
            db_path: var_or("DB_PATH", "marketplace.sqlite3"),
            blob_dir: PathBuf::from(var_or("BLOB_DIR", "uploads")),
            blob_path: blob_path_from(var_or("BLOB_PATH", "/uploads/"))?,
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            session_ttl_secs: parse_or("SESSION_TTL_SECS", 60 * 60 * 24 * 7)?,
            cookie_secure: parse_or("COOKIE_SECURE", false)?,
            sgid: SgidConfig {
                hostname: var_or("SGID_HOSTNAME", "https://api.id.gov.sg"),
                client_id: var_or("SGID_CLIENT_ID", ""),
                client_secret: var_or("SGID_CLIENT_SECRET", ""),
                redirect_uri: var_or("SGID_REDIRECT_URI", "http://localhost:1337/callback"),
            },
        })
    }

    /// Route prefix for stored images, or `None` when `BLOB_PATH` points at
    /// another host that serves `BLOB_DIR` itself.
    pub fn upload_route(&self) -> Option<&str> {
        is_local_path(&self.blob_path).then_some(self.blob_path.as_str())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::Invalid {
            key: "APP_HOST",
            value: raw,
        })
    }
}

fn is_local_path(value: &str) -> bool {
    value.starts_with('/') && !value.starts_with("//")
}

/// Local prefixes get exactly one trailing slash and may not be `/` itself,
/// which would shadow every other route.
fn blob_path_from(value: String) -> Result<String, ConfigError> {
    if !is_local_path(&value) {
        return Ok(value);
    }
    let trimmed = value.trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid {
            key: "BLOB_PATH",
            value,
        });
    }
    Ok(format!("{trimmed}/"))
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
pub fn test_config(db_path: &str, blob_dir: PathBuf) -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_workers: 1,
        db_path: db_path.to_string(),
        blob_dir,
        blob_path: "/uploads/".to_string(),
        max_upload_bytes: 1024 * 1024,
        session_ttl_secs: 60 * 60,
        cookie_secure: false,
        sgid: SgidConfig {
            hostname: "https://sgid.test".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "http://localhost/callback".to_string(),
        },
    }
}
