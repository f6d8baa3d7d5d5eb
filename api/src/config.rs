/*
 * Responsibility
 * - 環境変数 (.env を含む) からの設定読み込み: listen addr, 表示名, CORS 許可, JWT 検証パラメータ
 * - 設定値のバリデーション (不足なら起動失敗)
 * - 起動時に一度だけ組み立て、参照で各コンポーネントへ渡す (グローバルな singleton は持たない)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Key material used to verify bearer tokens.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthKey {
    /// HS256 shared secret.
    Secret(String),
    /// Ed25519 public key (EdDSA), PEM encoded.
    Ed25519PublicKeyPem(String),
}

impl fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        match self {
            Self::Secret(_) => f.write_str("Secret(..)"),
            Self::Ed25519PublicKeyPem(_) => f.write_str("Ed25519PublicKeyPem(..)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    pub key: AuthKey,
    pub leeway_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct HalifaxConfig {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    /// Display name used for the Swagger title and the root greeting.
    pub name: String,
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout: Duration,
    /// `None` disables bearer authentication entirely.
    pub auth: Option<AuthConfig>,
}

impl Default for HalifaxConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            app_env: AppEnv::Development,
            name: "Halifax".to_string(),
            cors_allowed_origins: Vec::new(),
            request_timeout: Duration::from_secs(30),
            auth: None,
        }
    }
}

impl HalifaxConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = parse_or(&lookup, "PORT", 3000)?;
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let name = lookup("APP_NAME")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Halifax".to_string());

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let timeout_seconds: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECONDS", 30)?;
        if timeout_seconds == 0 {
            return Err(ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"));
        }

        let auth = auth_from_lookup(&lookup)?;

        Ok(Self {
            addr,
            app_env,
            name,
            cors_allowed_origins,
            request_timeout: Duration::from_secs(timeout_seconds),
            auth,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_cors_allowed_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cors_allowed_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }
}

// Auth is enabled by the presence of AUTH_ISSUER; everything else is then required.
fn auth_from_lookup<F>(lookup: &F) -> Result<Option<AuthConfig>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(issuer) = non_empty(lookup("AUTH_ISSUER")) else {
        return Ok(None);
    };

    let audience = non_empty(lookup("AUTH_AUDIENCE")).ok_or(ConfigError::Missing("AUTH_AUDIENCE"))?;

    let secret = non_empty(lookup("AUTH_JWT_SECRET"));
    let public_key_pem =
        non_empty(lookup("AUTH_JWT_PUBLIC_KEY_PEM")).map(|pem| pem.replace("\\n", "\n"));

    let key = match (secret, public_key_pem) {
        (Some(secret), None) => AuthKey::Secret(secret),
        (None, Some(pem)) => AuthKey::Ed25519PublicKeyPem(pem),
        (None, None) => return Err(ConfigError::Missing("AUTH_JWT_SECRET")),
        (Some(_), Some(_)) => return Err(ConfigError::Invalid("AUTH_JWT_SECRET")),
    };

    let leeway_seconds = parse_or(lookup, "AUTH_LEEWAY_SECONDS", 60)?;

    Ok(Some(AuthConfig {
        issuer,
        audience,
        key,
        leeway_seconds,
    }))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match non_empty(lookup(key)) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}
