use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use waypoint_auth::{BearerGateConfig, IdentityProviderConfig};

pub const LISTEN_ADDR_ENV: &str = "WAYPOINT_LISTEN_ADDR";
pub const DATABASE_URL_ENV: &str = "POSTGRESQL_URL";
pub const AUTH_ENV: &str = "WAYPOINT_AUTH";
pub const LOGTO_ENDPOINT_ENV: &str = "LOGTO_ENDPOINT";
pub const LOGTO_APP_ID_ENV: &str = "LOGTO_APPID";
pub const LOGTO_APP_SECRET_ENV: &str = "LOGTO_APPSECRET";
pub const BASE_URL_ENV: &str = "WAYPOINT_BASE_URL";
pub const JWKS_URL_ENV: &str = "WAYPOINT_JWKS_URL";
pub const JWKS_REFRESH_SECS_ENV: &str = "WAYPOINT_JWKS_REFRESH_SECS";
pub const JWT_ISSUER_ENV: &str = "WAYPOINT_JWT_ISSUER";
pub const JWT_AUDIENCE_ENV: &str = "WAYPOINT_JWT_AUDIENCE";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_LOGTO_ENDPOINT: &str = "https://id.bksp.in/";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_JWKS_REFRESH_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuthMode {
    #[value(name = "session")]
    Session,
    #[value(name = "bearer")]
    Bearer,
}

impl Display for AuthMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMode::Session => write!(f, "session"),
            AuthMode::Bearer => write!(f, "bearer"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[value(name = "pretty")]
    Pretty,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "waypoint")]
pub struct Cli {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(long, env = DATABASE_URL_ENV)]
    pub database_url: String,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    pub debug: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    #[arg(long, env = AUTH_ENV, value_enum, default_value_t = AuthMode::Session)]
    pub auth: AuthMode,

    #[arg(long, env = LOGTO_ENDPOINT_ENV, default_value = DEFAULT_LOGTO_ENDPOINT)]
    pub logto_endpoint: String,

    #[arg(long, env = LOGTO_APP_ID_ENV, required_if_eq("auth", "session"))]
    pub logto_app_id: Option<String>,

    #[arg(long, env = LOGTO_APP_SECRET_ENV, required_if_eq("auth", "session"))]
    pub logto_app_secret: Option<String>,

    /// Public address of this service, used for the sign-in callback.
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, env = JWKS_URL_ENV, required_if_eq("auth", "bearer"))]
    pub jwks_url: Option<String>,

    #[arg(long, env = JWKS_REFRESH_SECS_ENV, default_value_t = DEFAULT_JWKS_REFRESH_SECS)]
    pub jwks_refresh_secs: u64,

    #[arg(long, env = JWT_ISSUER_ENV)]
    pub jwt_issuer: Option<String>,

    #[arg(long, env = JWT_AUDIENCE_ENV)]
    pub jwt_audience: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required when auth mode is {1}")]
    Missing(&'static str, AuthMode),
    #[error("jwks refresh period must be positive")]
    ZeroRefreshPeriod,
}

/// Settings of the one auth gate this process runs.
#[derive(Debug, Clone)]
pub enum AuthConfig {
    Session {
        provider: IdentityProviderConfig,
        base_url: String,
    },
    Bearer {
        jwks_url: String,
        refresh: Duration,
        gate: BearerGateConfig,
    },
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub listen_addr: SocketAddr,
    pub database_url: String,
    pub auth: AuthConfig,
}

impl TryFrom<Cli> for GatewayConfig {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let auth = match cli.auth {
            AuthMode::Session => AuthConfig::Session {
                provider: IdentityProviderConfig {
                    endpoint: cli.logto_endpoint,
                    app_id: cli
                        .logto_app_id
                        .ok_or(ConfigError::Missing(LOGTO_APP_ID_ENV, cli.auth))?,
                    app_secret: cli
                        .logto_app_secret
                        .ok_or(ConfigError::Missing(LOGTO_APP_SECRET_ENV, cli.auth))?,
                },
                base_url: cli.base_url,
            },
            AuthMode::Bearer => {
                if cli.jwks_refresh_secs == 0 {
                    return Err(ConfigError::ZeroRefreshPeriod);
                }
                AuthConfig::Bearer {
                    jwks_url: cli
                        .jwks_url
                        .ok_or(ConfigError::Missing(JWKS_URL_ENV, cli.auth))?,
                    refresh: Duration::from_secs(cli.jwks_refresh_secs),
                    gate: BearerGateConfig {
                        issuer: cli.jwt_issuer,
                        audience: cli.jwt_audience,
                    },
                }
            }
        };

        Ok(Self {
            listen_addr: cli.listen_addr,
            database_url: cli.database_url,
            auth,
        })
    }
}
