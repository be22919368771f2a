//! Process configuration, read once from the environment at start-up.

use std::{net::SocketAddr, str::FromStr, time::Duration};

use crate::yiwugo::{
    auth::{client_credentials::AuthMode, token_manager::DEFAULT_EXPIRY_MARGIN},
    cache::{DEFAULT_CAPACITY, DEFAULT_TTL},
    endpoints::Endpoints,
};

pub const DEFAULT_API_BASE: &str = "https://open.yiwugo.com";
pub const DEFAULT_REFERER: &str = "https://www.yiwugo.com";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(12);

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("env var {key} has invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_base: String,
    pub referer: String,
    pub auth_mode: AuthMode,
    pub token_margin: Duration,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub http_timeout: Duration,
    pub port: u16,
    pub endpoints: Endpoints,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any variable source, `from_env` being the usual one.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let get = |key: &str| lookup(key).filter(|val| !val.trim().is_empty());

        let secs = |key: &'static str, default: Duration| -> Result<Duration, Error> {
            Ok(parse::<u64>(key, get(key))?.map_or(default, Duration::from_secs))
        };

        Ok(Self {
            client_id: get("YIWUGO_CLIENT_ID"),
            client_secret: get("YIWUGO_CLIENT_SECRET"),
            api_base: get("YIWUGO_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_owned()),
            referer: get("YIWUGO_REFERER").unwrap_or_else(|| DEFAULT_REFERER.to_owned()),
            auth_mode: parse("YIWUGO_AUTH_MODE", get("YIWUGO_AUTH_MODE"))?.unwrap_or_default(),
            token_margin: secs("YIWUGO_TOKEN_MARGIN_SECS", DEFAULT_EXPIRY_MARGIN)?,
            cache_ttl: secs("YIWUGO_CACHE_TTL_SECS", DEFAULT_TTL)?,
            cache_capacity: parse("YIWUGO_CACHE_CAPACITY", get("YIWUGO_CACHE_CAPACITY"))?
                .unwrap_or(DEFAULT_CAPACITY),
            http_timeout: secs("YIWUGO_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT)?,
            port: parse("PORT", get("PORT"))?.unwrap_or(DEFAULT_PORT),
            endpoints: Endpoints::default().with_overrides(&lookup),
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    pub fn token_url(&self) -> String {
        format!(
            "{}{}",
            self.api_base.trim_end_matches('/'),
            self.endpoints.token_path
        )
    }
}

fn parse<T>(key: &'static str, value: Option<String>) -> Result<Option<T>, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|value| {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|err| Error::Invalid {
                key,
                reason: err.to_string(),
                value,
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, val)| (key.to_string(), val.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config(&[]).unwrap();
        assert!(!config.has_credentials());
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.referer, DEFAULT_REFERER);
        assert_eq!(config.auth_mode, AuthMode::Query);
        assert_eq!(config.token_margin, Duration::from_secs(60));
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.port, 8080);
        assert_eq!(config.listen_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.token_url(), "https://open.yiwugo.com/oauth/token");
    }

    #[test]
    fn values_are_read_from_the_environment() {
        let config = config(&[
            ("YIWUGO_CLIENT_ID", "id"),
            ("YIWUGO_CLIENT_SECRET", "secret"),
            ("YIWUGO_API_BASE", "https://sandbox.example.com/"),
            ("YIWUGO_AUTH_MODE", "basic"),
            ("YIWUGO_TOKEN_MARGIN_SECS", "300"),
            ("YIWUGO_DETAIL_ID_PARAM", "productId"),
            ("PORT", "3000"),
        ])
        .unwrap();

        assert!(config.has_credentials());
        assert_eq!(config.auth_mode, AuthMode::Basic);
        assert_eq!(config.token_margin, Duration::from_secs(300));
        assert_eq!(config.endpoints.detail.id_param, "productId");
        assert_eq!(config.port, 3000);
        assert_eq!(
            config.token_url(),
            "https://sandbox.example.com/oauth/token"
        );
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        let config = config(&[("YIWUGO_CLIENT_ID", "id"), ("YIWUGO_CLIENT_SECRET", " ")]).unwrap();
        assert!(!config.has_credentials());
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let err = config(&[("PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));

        assert!(config(&[("YIWUGO_AUTH_MODE", "oauth1")]).is_err());
    }
}
