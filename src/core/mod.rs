use bytes::Bytes;
use futures::stream::BoxStream;
use serde_json::Value;

pub mod error;

pub use self::error::Error;

pub struct Core {
    pub catalog: Box<dyn Catalog>,
}

impl Core {
    pub fn new(catalog: impl Catalog + 'static) -> Self {
        Self {
            catalog: Box::new(catalog),
        }
    }

    pub fn catalog(&self) -> &dyn Catalog {
        self.catalog.as_ref()
    }
}

pub type ProductIdRef = str;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: String,
    pub page: u32,
    pub page_size: u32,
}

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 60;

impl SearchQuery {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

pub type ByteStream = BoxStream<'static, Result<Bytes, std::io::Error>>;

/// Raw image relayed from the marketplace CDN, streamed as it arrives.
pub struct Image {
    pub content_type: String,
    pub body: ByteStream,
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Marketplace operations exposed over HTTP.
///
/// JSON results are the upstream bodies, untouched.
#[async_trait::async_trait]
pub trait Catalog: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Value, Error>;
    async fn product(&self, id: &ProductIdRef) -> Result<Value, Error>;
    async fn skus(&self, id: &ProductIdRef) -> Result<Value, Error>;
    async fn categories(&self) -> Result<Value, Error>;
    async fn recommend(&self, keyword: &str) -> Result<Value, Error>;

    async fn image(&self, url: &str) -> Result<Image, Error>;
}
