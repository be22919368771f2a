//! YiwuGo Open API gateway.

use futures::{StreamExt, TryStreamExt};
use reqwest::{header, Method, Url};
use serde_json::Value;
use tracing::{debug, info, warn};

use self::{
    auth::Token,
    cache::ResponseCache,
    endpoints::Endpoints,
    utils::{check_status, ServerError},
};

pub mod auth;
pub mod cache;
pub mod endpoints;
mod utils;

pub const USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Query parameters in the order they should be sent upstream.
pub type Params = Vec<(String, String)>;

pub struct Gateway<AuthTokenProvider> {
    pub client: reqwest::Client,
    pub base_url: String,
    pub referer: String,
    pub endpoints: Endpoints,
    pub auth_token_provider: AuthTokenProvider,
    pub cache: ResponseCache,
}

#[derive(Debug, thiserror::Error)]
pub enum Error<AuthError> {
    #[error("auth: {0}")]
    Auth(#[source] AuthError),
    #[error("reqwest: {0}")]
    Reqwest(#[source] reqwest::Error),
    #[error("server: {0}")]
    Server(#[from] ServerError),
    #[error("{status} response is not JSON: {source}")]
    InvalidBody {
        status: u16,
        body: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("cache key: {0}")]
    CacheKey(#[from] serde_urlencoded::ser::Error),
    #[error("not an absolute http(s) URL: {0}")]
    InvalidImageUrl(String),
}

impl<AuthError> Error<AuthError> {
    fn reqwest(err: reqwest::Error) -> Self {
        // The URL carries the access token.
        Self::Reqwest(err.without_url())
    }
}

impl<AuthTokenProvider> Gateway<AuthTokenProvider>
where
    AuthTokenProvider: auth::TokenProvider,
{
    fn build_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    /// Key for the response cache: the path plus the sorted parameters.
    /// The access token is left out so rotating it keeps cached entries usable.
    pub fn cache_key(
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<String, Error<AuthTokenProvider::Error>> {
        let mut sorted = params.to_vec();
        sorted.sort_unstable();
        let query = serde_urlencoded::to_string(sorted)?;
        Ok(format!("{path}?{query}"))
    }

    fn build_request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header(header::REFERER, &self.referer)
            .header(header::USER_AGENT, USER_AGENT)
    }

    async fn get_auth_token(&self) -> Result<String, Error<AuthTokenProvider::Error>> {
        let token = self
            .auth_token_provider
            .get_auth_token()
            .await
            .map_err(Error::Auth)?;
        Ok(token.access_token().to_owned())
    }

    /// GET `path` with the access token and `params`, serving repeats from the cache.
    /// Parameters with empty values are not sent.
    pub async fn call(
        &self,
        path: &str,
        params: Params,
    ) -> Result<Value, Error<AuthTokenProvider::Error>> {
        let auth_token = self.get_auth_token().await?;

        let params: Vec<(&str, &str)> = params
            .iter()
            .filter(|(_, val)| !val.is_empty())
            .map(|(key, val)| (key.as_str(), val.as_str()))
            .collect();

        let key = Self::cache_key(path, &params)?;
        if let Some(cached) = self.cache.get(&key) {
            debug!(message = "Serving cached response", key = %key);
            return Ok(cached);
        }

        info!(message = "Calling upstream", path, params = ?params);

        let request = self
            .build_request(Method::GET, &self.build_url(path))
            .query(&[("access_token", auth_token.as_str())])
            .query(&params)
            .build()
            .map_err(Error::reqwest)?;

        let res = self.exec(request).await?;
        let value = Self::parse_json(res).await?;

        self.cache.insert(key, value.clone());
        Ok(value)
    }

    /// Fetch an arbitrary image with the marketplace `Referer`. Never cached.
    /// The body is handed back as a stream and never buffered whole.
    pub async fn fetch_image(
        &self,
        url: &str,
    ) -> Result<crate::core::Image, Error<AuthTokenProvider::Error>> {
        let is_web_url = Url::parse(url)
            .map(|parsed| matches!(parsed.scheme(), "http" | "https") && parsed.has_host())
            .unwrap_or(false);
        if !is_web_url {
            return Err(Error::InvalidImageUrl(url.to_owned()));
        }

        let request = self
            .build_request(Method::GET, url)
            .build()
            .map_err(Error::reqwest)?;
        let res = self.exec(request).await?;

        let content_type = res
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|val| val.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_owned();
        let body = res
            .bytes_stream()
            .map_err(|err| std::io::Error::other(err.without_url()))
            .boxed();

        Ok(crate::core::Image { content_type, body })
    }

    async fn exec(
        &self,
        request: reqwest::Request,
    ) -> Result<reqwest::Response, Error<AuthTokenProvider::Error>> {
        let res = self.client.execute(request).await.map_err(Error::reqwest)?;
        let res = check_status(res).await?;
        Ok(res)
    }

    async fn parse_json(res: reqwest::Response) -> Result<Value, Error<AuthTokenProvider::Error>> {
        let status = res.status().as_u16();
        let body = res.text().await.map_err(Error::reqwest)?;
        serde_json::from_str(&body).map_err(|source| Error::InvalidBody {
            status,
            body,
            source,
        })
    }

    fn list_params(
        endpoint: &endpoints::ListEndpoint,
        query: &crate::core::SearchQuery,
    ) -> Params {
        vec![
            (endpoint.keyword_param.clone(), query.keyword.clone()),
            (endpoint.page_param.clone(), query.page.to_string()),
            (endpoint.page_size_param.clone(), query.page_size.to_string()),
        ]
    }

    fn item_params(endpoint: &endpoints::ItemEndpoint, id: &str) -> Params {
        vec![(endpoint.id_param.clone(), id.to_owned())]
    }
}

impl<AuthError> From<Error<AuthError>> for crate::core::Error
where
    AuthError: Into<crate::core::Error>,
{
    fn from(err: Error<AuthError>) -> Self {
        match err {
            Error::Auth(err) => err.into(),
            Error::Server(ServerError { status_code, body }) => Self::UpstreamCall {
                status: Some(status_code),
                body: Some(body),
                message: format!("upstream returned {status_code}"),
            },
            Error::InvalidBody { status, body, .. } => Self::UpstreamCall {
                status: Some(status),
                body: Some(body),
                message: format!("upstream {status} response is not JSON"),
            },
            Error::Reqwest(err) => Self::UpstreamCall {
                status: err.status().map(|status| status.as_u16()),
                body: None,
                message: err.to_string(),
            },
            Error::InvalidImageUrl(url) => {
                Self::Validation(format!("not an absolute http(s) URL: {url}"))
            }
            Error::CacheKey(err) => Self::UpstreamCall {
                status: None,
                body: None,
                message: format!("cache key: {err}"),
            },
        }
    }
}

#[async_trait::async_trait]
impl<AuthTokenProvider> crate::core::Catalog for Gateway<AuthTokenProvider>
where
    AuthTokenProvider: auth::TokenProvider,
    <AuthTokenProvider as auth::TokenProvider>::Error: Into<crate::core::Error>,
{
    async fn search(&self, query: &crate::core::SearchQuery) -> Result<Value, crate::core::Error> {
        let endpoint = &self.endpoints.search;
        let value = self
            .call(&endpoint.path, Self::list_params(endpoint, query))
            .await?;
        Ok(value)
    }

    async fn product(&self, id: &crate::core::ProductIdRef) -> Result<Value, crate::core::Error> {
        let endpoint = &self.endpoints.detail;
        let value = self
            .call(&endpoint.path, Self::item_params(endpoint, id))
            .await?;
        Ok(value)
    }

    async fn skus(&self, id: &crate::core::ProductIdRef) -> Result<Value, crate::core::Error> {
        let endpoint = &self.endpoints.skus;
        let value = self
            .call(&endpoint.path, Self::item_params(endpoint, id))
            .await?;
        Ok(value)
    }

    async fn categories(&self) -> Result<Value, crate::core::Error> {
        let value = self
            .call(&self.endpoints.categories_path, Params::new())
            .await?;
        Ok(value)
    }

    async fn recommend(&self, keyword: &str) -> Result<Value, crate::core::Error> {
        let endpoint = &self.endpoints.suggest;
        let params = vec![(endpoint.keyword_param.clone(), keyword.to_owned())];
        let value = self.call(&endpoint.path, params).await?;
        Ok(value)
    }

    async fn image(&self, url: &str) -> Result<crate::core::Image, crate::core::Error> {
        self.fetch_image(url).await.map_err(|err| match err {
            Error::InvalidImageUrl(_) => err.into(),
            err => {
                warn!(message = "Image relay failed", error = %err);
                crate::core::Error::ImageFetch(err.to_string())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestGateway = Gateway<auth::client_credentials::ClientCredentials>;

    #[test]
    fn cache_key_sorts_params_and_ignores_order() {
        let a = TestGateway::cache_key("/open/cn_product/list", &[("q", "bag"), ("page", "2")])
            .unwrap();
        let b = TestGateway::cache_key("/open/cn_product/list", &[("page", "2"), ("q", "bag")])
            .unwrap();
        assert_eq!(a, "/open/cn_product/list?page=2&q=bag");
        assert_eq!(a, b);
    }

    #[test]
    fn cache_key_encodes_values() {
        let key = TestGateway::cache_key("/search/suggest.do", &[("q", "手袋 & bag")]).unwrap();
        assert_eq!(
            key,
            "/search/suggest.do?q=%E6%89%8B%E8%A2%8B+%26+bag"
        );
    }

    #[test]
    fn cache_key_failure_maps_to_upstream_call() {
        let err: Error<auth::client_credentials::Error> =
            serde_urlencoded::ser::Error::Custom("unsupported value".into()).into();
        match crate::core::Error::from(err) {
            crate::core::Error::UpstreamCall {
                status: None,
                body: None,
                message,
            } => assert_eq!(message, "cache key: unsupported value"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
