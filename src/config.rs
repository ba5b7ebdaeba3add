use axum_extra::extract::cookie::Key;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Development-only signing secret. Anything deployed must override it.
pub const DEFAULT_SECRET_KEY: &str = "change-this-secret-before-deploying-kissa";

const MIN_SECRET_LEN: usize = 32;

#[derive(Parser, Debug)]
#[command(name = "kissa", about = "Content backend for a café website")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Secret used to sign session cookies
    #[arg(long, env = "KISSA_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Username for the initial admin account
    #[arg(long, env = "KISSA_ADMIN_USERNAME", default_value = "admin")]
    pub admin_username: String,

    /// Password for the initial admin account (only used when no user exists yet)
    #[arg(long, env = "KISSA_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub site: SiteConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Where admin uploads are written; served under `/static/uploads/`
    pub uploads: Option<PathBuf>,
    /// Pre-built front-end bundle directory
    pub frontend: PathBuf,
    pub max_body_bytes: usize,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub cookie_name: String,
    pub session_hours: u64,
    pub secret_key: String,
    pub password_cost: u32,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SiteConfig {
    pub navigation: Vec<NavLink>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uploads: None,
            frontend: PathBuf::from("frontend/dist"),
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: "kissa_session".to_string(),
            session_hours: 720,
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            password_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        let links = [
            ("ホーム", "/"),
            ("アクセス", "/access"),
            ("予約", "/reservations"),
            ("ギャラリー", "/gallery"),
            ("ストーリー", "/about"),
            ("ハイライト", "/highlights"),
        ];
        Self {
            navigation: links
                .iter()
                .map(|(label, path)| NavLink {
                    label: label.to_string(),
                    path: path.to_string(),
                })
                .collect(),
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // CLI overrides
        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(ref secret) = cli.secret_key {
            config.auth.secret_key = secret.clone();
        }

        // Resolve paths relative to data dir
        if config.database.path.is_none() {
            config.database.path = Some(data_dir.join("kissa.db"));
        }
        if config.storage.uploads.is_none() {
            config.storage.uploads = Some(data_dir.join("uploads"));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.auth.secret_key.len() < MIN_SECRET_LEN {
            anyhow::bail!(
                "auth.secret_key must be at least {} bytes long",
                MIN_SECRET_LEN
            );
        }
        if self.storage.max_body_bytes == 0 {
            anyhow::bail!("storage.max_body_bytes must be positive");
        }
        Ok(())
    }

    pub fn data_dir(cli: &Cli) -> PathBuf {
        cli.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".kissa")
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("kissa.db"))
    }

    pub fn uploads_path(&self) -> PathBuf {
        self.storage
            .uploads
            .clone()
            .unwrap_or_else(|| PathBuf::from("uploads"))
    }

    pub fn uses_default_secret(&self) -> bool {
        self.auth.secret_key == DEFAULT_SECRET_KEY
    }

    /// Signing key for session cookies, stretched from the configured secret.
    pub fn cookie_key(&self) -> anyhow::Result<Key> {
        self.validate()?;
        Ok(Key::derive_from(self.auth.secret_key.as_bytes()))
    }
}
