use reqwest::Url;
use std::env;
use std::time::Duration;

use crate::{context::RedirectConfig, error::ConfigError};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_LOGIN_URL: &str = "https://accounts-auth0.topcoder-dev.com/";
const DEFAULT_UNAUTHORIZED_URL: &str = "/";
const DEFAULT_PROFILE_TIMEOUT_MS: u64 = 5_000;
const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";

/// AppConfig
///
/// Configuration read once at startup and shared immutably through the
/// application state.
#[derive(Clone)]
pub struct AppConfig {
    // Runtime environment marker. Controls the local auth bypass and defaults.
    pub env: Env,
    // HS256 secret used to validate bearer tokens.
    pub jwt_secret: String,
    pub bind_addr: String,
    // Login page; denied anonymous navigations are sent here with a retUrl.
    pub login_url: Url,
    // Where role/membership denials are sent.
    pub unauthorized_url: String,
    // Member API base. None locally means the in-memory demo profiles are used.
    pub member_api_url: Option<String>,
    // Upper bound on one profile lookup. Past it the session stays uninitialized.
    pub profile_timeout: Duration,
}

/// Keeps the JWT secret out of logs.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("jwt_secret", &"[REDACTED]")
            .field("bind_addr", &self.bind_addr)
            .field("login_url", &self.login_url.as_str())
            .field("unauthorized_url", &self.unauthorized_url)
            .field("member_api_url", &self.member_api_url)
            .field("profile_timeout", &self.profile_timeout)
            .finish()
    }
}

/// Env
///
/// Runtime context: local development or production.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Local settings that need no environment, for tests.
    fn default() -> Self {
        Self {
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            login_url: Url::parse(DEFAULT_LOGIN_URL).expect("default login url is valid"),
            unauthorized_url: DEFAULT_UNAUTHORIZED_URL.to_string(),
            member_api_url: None,
            profile_timeout: Duration::from_millis(DEFAULT_PROFILE_TIMEOUT_MS),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from the environment. Production refuses to start
    /// without an explicit JWT secret, login page and member API.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match (env, env::var("JWT_SECRET")) {
            (_, Ok(secret)) => secret,
            (Env::Production, Err(_)) => return Err(ConfigError::Missing("JWT_SECRET")),
            (Env::Local, Err(_)) => LOCAL_JWT_SECRET.to_string(),
        };

        let login_url = match (env, env::var("LOGIN_URL")) {
            (_, Ok(raw)) => Url::parse(&raw).map_err(|e| ConfigError::Invalid {
                var: "LOGIN_URL",
                reason: e.to_string(),
            })?,
            (Env::Production, Err(_)) => return Err(ConfigError::Missing("LOGIN_URL")),
            (Env::Local, Err(_)) => Url::parse(DEFAULT_LOGIN_URL).map_err(|e| {
                ConfigError::Invalid {
                    var: "LOGIN_URL",
                    reason: e.to_string(),
                }
            })?,
        };

        let member_api_url = match (env, env::var("MEMBER_API_URL")) {
            (_, Ok(url)) => Some(url),
            (Env::Production, Err(_)) => return Err(ConfigError::Missing("MEMBER_API_URL")),
            (Env::Local, Err(_)) => None,
        };

        let profile_timeout = match env::var("PROFILE_TIMEOUT_MS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| ConfigError::Invalid {
                    var: "PROFILE_TIMEOUT_MS",
                    reason: e.to_string(),
                })?,
            Err(_) => Duration::from_millis(DEFAULT_PROFILE_TIMEOUT_MS),
        };

        Ok(Self {
            env,
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            login_url,
            unauthorized_url: env::var("UNAUTHORIZED_URL")
                .unwrap_or_else(|_| DEFAULT_UNAUTHORIZED_URL.to_string()),
            member_api_url,
            profile_timeout,
        })
    }

    pub fn redirects(&self) -> RedirectConfig {
        RedirectConfig {
            login_url: self.login_url.clone(),
            unauthorized_url: self.unauthorized_url.clone(),
        }
    }
}
