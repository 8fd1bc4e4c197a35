/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, APP_ENV, AUTH_* など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - ConfigError は AuthPipeline の初期化でも使う
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::auth::{AuthOptions, RequireClaims};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
    Null(&'static str),
    WrongType {
        key: &'static str,
        expected: &'static str,
    },
    SecretTooShort {
        len: usize,
        min: usize,
    },
    NoSourceEnabled,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
            ConfigError::Null(key) => write!(f, "{} cannot be null", key),
            ConfigError::WrongType { key, expected } => {
                write!(f, "{} should be {}", key, expected)
            }
            ConfigError::SecretTooShort { len, min } => {
                write!(f, "secret should have at least {} characters, got {}", min, len)
            }
            ConfigError::NoSourceEnabled => {
                write!(f, "headers, query and cookies cannot all be disabled")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub request_timeout: Duration,

    pub auth: AuthOptions,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("request_timeout", &self.request_timeout)
            .field("auth", &self.auth)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (env in production, a map in tests).
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match get("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = get("APP_ENV")
            .map(|s| AppEnv::parse(&s))
            .unwrap_or(AppEnv::Development);

        let request_timeout = match get("REQUEST_TIMEOUT_SECONDS") {
            Some(s) => s
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"))?,
            None => Duration::from_secs(30),
        };

        let secret = get("AUTH_SECRET").ok_or(ConfigError::Missing("AUTH_SECRET"))?;

        let mut auth = AuthOptions::new(secret)
            .with_disable_headers(parse_flag(get("AUTH_DISABLE_HEADERS"), "AUTH_DISABLE_HEADERS")?)
            .with_disable_query(parse_flag(get("AUTH_DISABLE_QUERY"), "AUTH_DISABLE_QUERY")?)
            .with_disable_cookies(parse_flag(get("AUTH_DISABLE_COOKIES"), "AUTH_DISABLE_COOKIES")?);

        if let Some(name) = get("AUTH_HEADER_NAME") {
            auth = auth.with_header_name(name.trim());
        }

        let required = RequireClaims::new(
            get("AUTH_REQUIRED_CLAIMS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        );
        if !required.is_empty() {
            auth = auth.with_extra_validation(required);
        }

        Ok(Self {
            addr,
            app_env,
            request_timeout,
            auth,
        })
    }
}

fn parse_flag(raw: Option<String>, key: &'static str) -> Result<bool, ConfigError> {
    let Some(raw) = raw else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        _ => Err(ConfigError::Invalid(key)),
    }
}
