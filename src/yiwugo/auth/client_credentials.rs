//! Authorize using the client credentials flow.

use std::{str::FromStr, time::Duration};

use serde::Deserialize;

use crate::yiwugo::utils::{check_status, ServerError};

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_EXPIRES_IN: u64 = 7200;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("client id/secret are not configured")]
    CredentialsMissing,
    #[error("reqwest: {0}")]
    Reqwest(#[source] reqwest::Error),
    #[error("server: {0}")]
    Server(#[from] ServerError),
    #[error("token response has no access_token")]
    MissingAccessToken,
}

impl Error {
    fn reqwest(err: reqwest::Error) -> Self {
        // The token URL can carry the client secret.
        Self::Reqwest(err.without_url())
    }
}

/// How the client id and secret travel to the token endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    /// `client_id` and `client_secret` as query parameters.
    #[default]
    Query,
    /// HTTP Basic `id:secret`, with `client_id` repeated as a query parameter.
    Basic,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown auth mode {0:?}, expected \"query\" or \"basic\"")]
pub struct AuthModeParsingError(String);

impl FromStr for AuthMode {
    type Err = AuthModeParsingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "query" => Ok(Self::Query),
            "basic" => Ok(Self::Basic),
            _ => Err(AuthModeParsingError(s.to_owned())),
        }
    }
}

pub struct ClientCredentials {
    pub client: reqwest::Client,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub token_url: String,
    pub mode: AuthMode,
}

impl ClientCredentials {
    fn credentials(&self) -> Result<(&str, &str), Error> {
        fn non_empty(val: &Option<String>) -> Option<&str> {
            val.as_deref().filter(|val| !val.is_empty())
        }
        match (non_empty(&self.client_id), non_empty(&self.client_secret)) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            _ => Err(Error::CredentialsMissing),
        }
    }

    fn build_request(&self) -> Result<reqwest::Request, Error> {
        let (client_id, client_secret) = self.credentials()?;

        let builder = self
            .client
            .post(&self.token_url)
            .header(reqwest::header::CONTENT_LENGTH, 0);

        let builder = match self.mode {
            AuthMode::Query => builder.query(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ]),
            AuthMode::Basic => builder
                .query(&[("grant_type", "client_credentials"), ("client_id", client_id)])
                .basic_auth(client_id, Some(client_secret)),
        };

        builder.build().map_err(Error::reqwest)
    }

    /// Perform the client credentials flow.
    pub async fn perform(&self) -> Result<AuthResponse, Error> {
        let req = self.build_request()?;
        let res = self.client.execute(req).await.map_err(Error::reqwest)?;
        let res = check_status(res).await?;
        let login_response = res.json().await.map_err(Error::reqwest)?;
        Ok(login_response)
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    /// The requested access token.
    access_token: Option<String>,
    /// The amount of time that an access token is valid (in seconds).
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub access_token: String,
    pub expires_at: std::time::Instant,
}

impl TryFrom<AuthResponse> for Token {
    type Error = Error;

    fn try_from(auth: AuthResponse) -> Result<Self, Self::Error> {
        let AuthResponse {
            access_token,
            expires_in,
        } = auth;
        let access_token = access_token
            .filter(|token| !token.is_empty())
            .ok_or(Error::MissingAccessToken)?;
        let expires_in = Duration::from_secs(expires_in.unwrap_or(DEFAULT_EXPIRES_IN));
        let expires_at = std::time::Instant::now() + expires_in;
        Ok(Self {
            access_token,
            expires_at,
        })
    }
}

#[async_trait::async_trait]
impl super::TokenProvider for ClientCredentials {
    type Token = Token;
    type Error = Error;

    async fn get_auth_token(&self) -> Result<Self::Token, Self::Error> {
        let auth_response = self.perform().await?;
        let token = Token::try_from(auth_response)?;
        Ok(token)
    }
}

impl super::Token for Token {
    fn access_token(&self) -> &str {
        self.access_token.as_str()
    }
}

impl super::ExpiringToken for Token {
    fn expires_at(&self) -> std::time::Instant {
        self.expires_at
    }
}

impl From<Error> for crate::core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::CredentialsMissing => Self::CredentialsMissing,
            Error::Server(ServerError { status_code, body }) => {
                Self::UpstreamAuth(format!("token endpoint returned {status_code}: {body}"))
            }
            err => Self::UpstreamAuth(err.to_string()),
        }
    }
}
