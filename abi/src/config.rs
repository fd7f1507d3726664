// server, db, jwt, stream and log settings, loaded from a yaml file

use crate::errors::{Error, ErrorKind};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub db: DbConfig,
    pub jwt: JwtConfig,
    pub stream: StreamConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// mark the auth cookie `Secure`; enable behind https
    #[serde(default)]
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DbDriver {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DbConfig {
    #[serde(default)]
    pub driver: DbDriver,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub database: String,
    #[serde(default = "default_conn")]
    pub max_connections: u32,
    #[serde(default = "default_true")]
    pub migrate: bool,
}

fn default_conn() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_expires_days")]
    pub expires_days: i64,
}

fn default_expires_days() -> i64 {
    7
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamConfig {
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    #[serde(default = "default_level")]
    pub level: String,
    /// rolling log files go here when set, stdout otherwise
    pub dir: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: None,
        }
    }
}

fn default_level() -> String {
    String::from("debug")
}

impl Config {
    pub fn load(filename: impl AsRef<Path>) -> Result<Self, Error> {
        let filename = filename.as_ref();
        let content = fs::read_to_string(filename).map_err(|e| {
            Error::new(
                ErrorKind::ConfigReadError,
                format!("read config {} failed", filename.display()),
                e,
            )
        })?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

impl DbConfig {
    pub fn server_url(&self) -> String {
        if self.password.is_empty() {
            return format!("postgres://{}@{}:{}", self.user, self.host, self.port);
        }
        format!(
            "postgres://{}:{}@{}:{}",
            self.user, self.password, self.host, self.port
        )
    }

    pub fn url(&self) -> String {
        format!("{}/{}", self.server_url(), self.database)
    }
}

impl ServerConfig {
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
