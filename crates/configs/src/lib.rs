use anyhow::{anyhow, Result};
use serde::Deserialize;

/// Hash methods accepted by `auth.hash_method`.
pub const SUPPORTED_HASH_METHODS: &[&str] = &["sha256", "sha384", "sha512"];

/// Upper bound for `auth.jwt_expires_after_hours` (100 years).
pub const MAX_EXPIRES_AFTER_HOURS: u64 = 876_000;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Deadline applied to every auth request, in milliseconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 9090,
            worker_threads: Some(4),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub jwt_sign_key: String,
    #[serde(default = "default_expires_after_hours")]
    pub jwt_expires_after_hours: u64,
    #[serde(default = "default_hash_method")]
    pub hash_method: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_sign_key: String::new(),
            jwt_expires_after_hours: default_expires_after_hours(),
            hash_method: default_hash_method(),
        }
    }
}

/// User store backend, selected by the `kind` tag.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    InMemory {
        #[serde(default = "default_true")]
        seed_demo_users: bool,
        #[serde(default)]
        users: Vec<SeedUser>,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::InMemory { seed_demo_users: true, users: Vec::new() }
    }
}

/// A user record preloaded into the store at startup.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SeedUser {
    #[serde(default)]
    pub id: Option<String>,
    pub username: String,
    pub email: String,
    /// Hex digest produced with the configured hash method.
    pub password_digest: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
    #[serde(default)]
    pub disabled: bool,
}

fn default_request_timeout() -> u64 { 5_000 }
fn default_expires_after_hours() -> u64 { 744 }
fn default_hash_method() -> String { "sha256".to_string() }
fn default_true() -> bool { true }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), falling back to defaults when the
    /// file is absent, then fill gaps from the environment and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize_from_env();
        self.server.normalize()?;
        // 签名密钥允许从环境变量 JWT_SIGN_KEY 注入
        self.auth.normalize_from_env();
        self.auth.validate()?;
        Ok(())
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl ServerConfig {
    fn normalize_from_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            if !host.trim().is_empty() {
                self.host = host;
            }
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        if self.request_timeout_ms == 0 {
            self.request_timeout_ms = default_request_timeout();
        }
        Ok(())
    }
}

impl AuthSettings {
    pub fn normalize_from_env(&mut self) {
        if self.jwt_sign_key.trim().is_empty() {
            if let Ok(key) = std::env::var("JWT_SIGN_KEY") {
                self.jwt_sign_key = key;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt_sign_key.is_empty() {
            return Err(anyhow!("auth.jwt_sign_key is empty; set it in config.toml or JWT_SIGN_KEY"));
        }
        if self.jwt_expires_after_hours == 0 || self.jwt_expires_after_hours > MAX_EXPIRES_AFTER_HOURS {
            return Err(anyhow!(
                "auth.jwt_expires_after_hours must be within 1..={MAX_EXPIRES_AFTER_HOURS}"
            ));
        }
        let method = self.hash_method.to_ascii_lowercase();
        if !SUPPORTED_HASH_METHODS.contains(&method.as_str()) {
            return Err(anyhow!(
                "auth.hash_method `{}` is not one of {:?}",
                self.hash_method,
                SUPPORTED_HASH_METHODS
            ));
        }
        Ok(())
    }
}
