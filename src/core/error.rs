/// Everything a request can fail with, as seen by the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("client id/secret are not configured")]
    CredentialsMissing,
    #[error("failed to get access token: {0}")]
    UpstreamAuth(String),
    #[error("upstream call failed: {message}")]
    UpstreamCall {
        status: Option<u16>,
        body: Option<String>,
        message: String,
    },
    #[error("cannot fetch image: {0}")]
    ImageFetch(String),
    #[error("{0}")]
    Validation(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
