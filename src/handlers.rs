use crate::errors::AppError;
use crate::fetcher::get_popular_urls;
use crate::models::{HealthResponse, PageQuery, UrlStats, UrlsResponse};
use crate::range::resolve_range;
use crate::state::AppState;
use crate::table::SortSpec;
use crate::ui::{render_index, render_tweets};
use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};

pub async fn index(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Html<String> {
    let range = resolve_range(query.range.as_deref());
    let sort = SortSpec::from_query(query.sort.as_deref(), query.order.as_deref());
    let result = get_popular_urls(&state, range).await;
    Html(render_index(range, &result, sort))
}

pub async fn tweets(State(state): State<AppState>, Path(url_id): Path<String>) -> Html<String> {
    let record = parse_index(&url_id).and_then(|index| state.store.lookup(index));
    Html(render_tweets(&url_id, record.as_ref()))
}

pub async fn get_urls(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<UrlsResponse>, AppError> {
    let range = resolve_range(query.range.as_deref());
    let result = get_popular_urls(&state, range).await;
    Ok(Json(UrlsResponse {
        range,
        updated_at: result.updated_at,
        urls: result.records.clone(),
    }))
}

pub async fn get_url(State(state): State<AppState>, Path(url_id): Path<String>) -> Result<Json<UrlStats>, AppError> {
    let index = parse_index(&url_id).ok_or_else(|| AppError::bad_request("url id must be a non-negative integer"))?;
    let record = state
        .store
        .lookup(index)
        .ok_or_else(|| AppError::not_found(format!("url {url_id} not found")))?;
    Ok(Json(record))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.store.snapshot();
    Json(HealthResponse {
        phase: snapshot.phase().as_str().to_string(),
        records: snapshot.result().map_or(0, |result| result.records.len()),
    })
}

fn parse_index(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()
}
