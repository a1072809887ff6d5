/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, CORS 許可、Auth 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use jsonwebtoken::Algorithm;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("development").to_ascii_lowercase().as_str() {
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
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    // None -> in-memory drink store
    pub database_url: Option<String>,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub request_body_limit_bytes: usize,
    pub request_timeout_seconds: u64,

    pub auth_issuer: String,
    pub auth_audience: String,
    pub auth_jwks_url: Url,
    pub auth_algorithms: Vec<Algorithm>,
    pub access_token_leeway_seconds: u64,
    pub auth_jwks_cache_ttl_seconds: u64,
    pub auth_jwks_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| vars.get(key).map(|s| s.trim()).filter(|s| !s.is_empty());

        let port: u16 = match get("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 5000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url = get("DATABASE_URL").map(str::to_string);

        let app_env = AppEnv::parse(get("APP_ENV"));

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let request_body_limit_bytes =
            parse_or(get("REQUEST_BODY_LIMIT_BYTES"), 1024 * 1024, "REQUEST_BODY_LIMIT_BYTES")?;
        let request_timeout_seconds =
            parse_or(get("REQUEST_TIMEOUT_SECONDS"), 30, "REQUEST_TIMEOUT_SECONDS")?;

        let auth_issuer = get("AUTH_ISSUER")
            .ok_or(ConfigError::Missing("AUTH_ISSUER"))?
            .to_string();
        let issuer_url = Url::parse(&auth_issuer).map_err(|_| ConfigError::Invalid("AUTH_ISSUER"))?;

        let auth_audience = get("AUTH_AUDIENCE")
            .ok_or(ConfigError::Missing("AUTH_AUDIENCE"))?
            .to_string();

        let auth_jwks_url = match get("AUTH_JWKS_URL") {
            Some(s) => Url::parse(s).map_err(|_| ConfigError::Invalid("AUTH_JWKS_URL"))?,
            None => default_jwks_url(issuer_url).ok_or(ConfigError::Invalid("AUTH_ISSUER"))?,
        };

        let auth_algorithms = get("AUTH_ALGORITHMS")
            .unwrap_or("RS256")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Algorithm::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ConfigError::Invalid("AUTH_ALGORITHMS"))?;
        if auth_algorithms.is_empty() {
            return Err(ConfigError::Invalid("AUTH_ALGORITHMS"));
        }

        let access_token_leeway_seconds = parse_or(
            get("ACCESS_TOKEN_LEEWAY_SECONDS"),
            60,
            "ACCESS_TOKEN_LEEWAY_SECONDS",
        )?;
        let auth_jwks_cache_ttl_seconds = parse_or(
            get("AUTH_JWKS_CACHE_TTL_SECONDS"),
            300,
            "AUTH_JWKS_CACHE_TTL_SECONDS",
        )?;
        if auth_jwks_cache_ttl_seconds > MAX_JWKS_CACHE_TTL_SECONDS {
            return Err(ConfigError::Invalid("AUTH_JWKS_CACHE_TTL_SECONDS"));
        }
        let auth_jwks_timeout_seconds =
            parse_or(get("AUTH_JWKS_TIMEOUT_SECONDS"), 5, "AUTH_JWKS_TIMEOUT_SECONDS")?;
        if auth_jwks_timeout_seconds == 0 {
            return Err(ConfigError::Invalid("AUTH_JWKS_TIMEOUT_SECONDS"));
        }

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            request_body_limit_bytes,
            request_timeout_seconds,
            auth_issuer,
            auth_audience,
            auth_jwks_url,
            auth_algorithms,
            access_token_leeway_seconds,
            auth_jwks_cache_ttl_seconds,
            auth_jwks_timeout_seconds,
        })
    }
}

// one day
const MAX_JWKS_CACHE_TTL_SECONDS: u64 = 24 * 60 * 60;

fn parse_or<T: FromStr>(
    value: Option<&str>,
    default: T,
    key: &'static str,
) -> Result<T, ConfigError> {
    match value {
        Some(s) => s.parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

// `<issuer>/.well-known/jwks.json`, keeping any tenant path on the issuer
fn default_jwks_url(mut issuer: Url) -> Option<Url> {
    if !issuer.path().ends_with('/') {
        let path = format!("{}/", issuer.path());
        issuer.set_path(&path);
    }
    issuer.join(".well-known/jwks.json").ok()
}
