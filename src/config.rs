use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use std::net::SocketAddr;
use std::time::Duration;

/// How startup reacts to an unreachable database
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Abort launch when the pool cannot connect
    #[default]
    Standalone,
    /// Keep serving; failures surface per request
    Managed,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_db_host")]
    pub db_host: String,

    #[serde(default = "default_db_name")]
    pub db_name: String,

    #[serde(default = "default_db_user")]
    pub db_user: String,

    #[serde(default = "default_db_password")]
    pub db_password: String,

    #[serde(default = "default_db_port")]
    pub db_port: u16,

    #[serde(default = "default_min_connections")]
    pub db_min_connections: u32,

    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub run_mode: RunMode,

    pub rust_log: Option<String>,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_port() -> u16 {
    5000
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_name() -> String {
    "product_db".to_string()
}

fn default_db_user() -> String {
    "pguser".to_string()
}

fn default_db_password() -> String {
    "password".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_min_connections() -> u32 {
    1
}

fn default_max_connections() -> u32 {
    20
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from explicit key/value pairs instead of the process environment
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.db_max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be greater than zero");
        }
        if self.db_max_connections < self.db_min_connections {
            anyhow::bail!(
                "DB_MAX_CONNECTIONS ({}) must be >= DB_MIN_CONNECTIONS ({})",
                self.db_max_connections,
                self.db_min_connections
            );
        }
        Ok(())
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .database(&self.db_name)
            .username(&self.db_user)
            .password(&self.db_password)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.db_acquire_timeout_secs)
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address {}:{}: {}", self.host, self.port, e))
    }

    /// Filter used when `RUST_LOG` is not set; debug mode turns verbosity up
    pub fn log_filter(&self) -> String {
        match (&self.rust_log, self.debug) {
            (Some(filter), _) => filter.clone(),
            (None, true) => "debug,product_catalog=debug".to_string(),
            (None, false) => "info,product_catalog=info".to_string(),
        }
    }
}
