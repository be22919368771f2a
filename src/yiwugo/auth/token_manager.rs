use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, info};

use super::TokenProvider;

/// Default amount of token lifetime given up so a token never expires mid-flight.
pub const DEFAULT_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Caches the provider's token until shortly before it expires.
///
/// The slot stays locked while a new token is fetched, so callers that race
/// past an expired token wait for the one refresh instead of issuing their own.
pub struct TokenManager<Provider>
where
    Provider: TokenProvider,
{
    provider: Provider,
    margin: Duration,
    cached_token: Mutex<Option<Record>>,
}

#[derive(Debug, thiserror::Error)]
pub enum Error<RenewalError> {
    #[error("token provider: {0}")]
    Provider(#[source] RenewalError),
}

#[derive(Debug, Clone)]
pub struct Record {
    pub access_token: String,
    pub expires_at: Instant,
}

impl Record {
    pub fn from_expiring_token<T: super::ExpiringToken>(token: T, margin: Duration) -> Self {
        let expires_at = token.expires_at();
        let expires_at = expires_at.checked_sub(margin).unwrap_or_else(Instant::now);
        Self {
            access_token: token.access_token().to_owned(),
            expires_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

impl super::Token for Record {
    fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl<Provider> TokenManager<Provider>
where
    Provider: TokenProvider,
    <Provider as TokenProvider>::Token: super::ExpiringToken,
{
    pub fn new(provider: Provider) -> Self {
        Self::with_margin(provider, DEFAULT_EXPIRY_MARGIN)
    }

    pub fn with_margin(provider: Provider, margin: Duration) -> Self {
        let cached_token = Mutex::const_new(None);
        Self {
            provider,
            margin,
            cached_token,
        }
    }

    async fn fetch_new_token(&self) -> Result<Record, Error<Provider::Error>> {
        let token = self
            .provider
            .get_auth_token()
            .await
            .map_err(Error::Provider)?;
        let record = Record::from_expiring_token(token, self.margin);
        Ok(record)
    }

    pub async fn get_token(&self) -> Result<Record, Error<Provider::Error>> {
        let mut cached_token = self.cached_token.lock().await;

        if let Some(cached_token) = &*cached_token {
            if !cached_token.is_expired() {
                debug!(message = "Using preexisting token", token_expires_at = ?cached_token.expires_at);
                return Ok(cached_token.clone());
            }
            debug!(message = "Existing token expired, refreshing", token_expires_at = ?cached_token.expires_at);
        }

        info!(
            message = "No active token found, about to get a new one",
            token_is_stale = cached_token.is_some(),
        );

        let new_record = self.fetch_new_token().await?;
        cached_token.replace(new_record.clone());

        debug!(message = "Got new token", token_expires_at = ?new_record.expires_at);

        Ok(new_record)
    }
}

#[async_trait::async_trait]
impl<Provider> super::TokenProvider for TokenManager<Provider>
where
    Provider: TokenProvider,
    <Provider as TokenProvider>::Token: super::ExpiringToken,
{
    type Token = Record;
    type Error = Error<Provider::Error>;

    async fn get_auth_token(&self) -> Result<Self::Token, Self::Error> {
        let token = self.get_token().await?;
        Ok(token)
    }
}

impl<E> From<Error<E>> for crate::core::Error
where
    E: Into<crate::core::Error>,
{
    fn from(err: Error<E>) -> Self {
        match err {
            Error::Provider(err) => err.into(),
        }
    }
}
