use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Extension, Path, Query},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use super::model::{
    Detail, Envelope, Health, IdParams, ImageParams, Item, KeywordParams, ProductList, Raw,
    Recommendation, SearchParams, SearchResult,
};
use crate::core::{Core, Error, SearchQuery, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};

pub const DEFAULT_RECOMMEND_KEYWORD: &str = "hot";

type JsonResult<T> = Result<Json<Envelope<T>>, Error>;

fn params<T: DeserializeOwned>(query: Result<Query<T>, QueryRejection>) -> Result<T, Error> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| Error::validation(rejection.body_text()))
}

fn required(name: &str, value: Option<String>) -> Result<String, Error> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Error::validation(format!("Missing {name}")))
}

fn positive(name: &str, value: Option<String>, default: u32) -> Result<u32, Error> {
    let Some(value) = value.filter(|value| !value.trim().is_empty()) else {
        return Ok(default);
    };
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::validation(format!(
            "{name} must be a positive integer, got {value:?}"
        ))),
    }
}

fn search_query(keyword: String, params: SearchParams) -> Result<SearchQuery, Error> {
    Ok(SearchQuery {
        keyword,
        page: positive("page", params.page, DEFAULT_PAGE)?,
        page_size: positive("pageSize", params.page_size, DEFAULT_PAGE_SIZE)?,
    })
}

pub async fn health() -> Json<Envelope<Health>> {
    Json(Envelope::ok(Health {
        msg: "YiwuGo proxy is running",
    }))
}

pub async fn search(
    Extension(core): Extension<Arc<Core>>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> JsonResult<SearchResult> {
    let mut params = params(query)?;
    let keyword = required("q", params.q.take())?;
    let query = search_query(keyword, params)?;

    let data = core.catalog().search(&query).await?;

    Ok(Json(Envelope::ok(SearchResult {
        keyword: query.keyword,
        page: query.page,
        data,
    })))
}

pub async fn products(
    Extension(core): Extension<Arc<Core>>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> JsonResult<ProductList> {
    let mut params = params(query)?;
    let keyword = params.q.take().unwrap_or_default().trim().to_owned();
    let query = search_query(keyword, params)?;

    let raw = core.catalog().search(&query).await?;

    Ok(Json(Envelope::ok(ProductList {
        keyword: query.keyword,
        page: query.page,
        page_size: query.page_size,
        raw,
    })))
}

pub async fn product(
    Extension(core): Extension<Arc<Core>>,
    Path(id): Path<String>,
) -> JsonResult<Item> {
    let id = required("id", Some(id))?;
    let raw = core.catalog().product(&id).await?;
    Ok(Json(Envelope::ok(Item { id, raw })))
}

pub async fn detail(
    Extension(core): Extension<Arc<Core>>,
    query: Result<Query<IdParams>, QueryRejection>,
) -> JsonResult<Detail> {
    let id = required("id", params(query)?.id)?;
    let data = core.catalog().product(&id).await?;
    Ok(Json(Envelope::ok(Detail { id, data })))
}

pub async fn skus(
    Extension(core): Extension<Arc<Core>>,
    Path(id): Path<String>,
) -> JsonResult<Item> {
    let id = required("id", Some(id))?;
    let raw = core.catalog().skus(&id).await?;
    Ok(Json(Envelope::ok(Item { id, raw })))
}

pub async fn categories(Extension(core): Extension<Arc<Core>>) -> JsonResult<Raw> {
    let raw = core.catalog().categories().await?;
    Ok(Json(Envelope::ok(Raw { raw })))
}

pub async fn recommend(
    Extension(core): Extension<Arc<Core>>,
    query: Result<Query<KeywordParams>, QueryRejection>,
) -> JsonResult<Recommendation> {
    let keyword = params(query)?
        .q
        .map(|q| q.trim().to_owned())
        .filter(|q| !q.is_empty())
        .unwrap_or_else(|| DEFAULT_RECOMMEND_KEYWORD.to_owned());

    let raw = core.catalog().recommend(&keyword).await?;

    Ok(Json(Envelope::ok(Recommendation { keyword, raw })))
}

pub async fn image(
    Extension(core): Extension<Arc<Core>>,
    query: Result<Query<ImageParams>, QueryRejection>,
) -> Result<Response, Error> {
    let url = required("url", params(query)?.url)?;
    let image = core.catalog().image(&url).await?;
    Ok((
        [(header::CONTENT_TYPE, image.content_type)],
        Body::from_stream(image.body),
    )
        .into_response())
}
