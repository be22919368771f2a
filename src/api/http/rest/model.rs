use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Success wrapper. Clients of the older proxy read `success`, newer ones `ok`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub ok: bool,
    pub success: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Envelope<T> {
    pub fn ok(body: T) -> Self {
        Self {
            ok: true,
            success: true,
            body,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub success: bool,
    pub error: Value,
}

impl ErrorBody {
    pub fn new(error: Value) -> Self {
        Self {
            ok: false,
            success: false,
            error,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub msg: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub keyword: String,
    pub page: u32,
    pub data: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductList {
    pub keyword: String,
    pub page: u32,
    pub page_size: u32,
    pub raw: Value,
}

#[derive(Debug, Serialize)]
pub struct Item {
    pub id: String,
    pub raw: Value,
}

#[derive(Debug, Serialize)]
pub struct Detail {
    pub id: String,
    pub data: Value,
}

#[derive(Debug, Serialize)]
pub struct Raw {
    pub raw: Value,
}

#[derive(Debug, Serialize)]
pub struct Recommendation {
    pub keyword: String,
    pub raw: Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KeywordParams {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IdParams {
    pub id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ImageParams {
    pub url: Option<String>,
}
