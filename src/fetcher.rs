use crate::firestore::{Document, StoreError, Value};
use crate::models::{FetchResult, UrlStats};
use crate::range::RangeKey;
use crate::session::bearer_token;
use crate::state::AppState;
use crate::store::{PageEvent, Phase};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{error, info, warn};

const URLS_FIELD: &str = "urls";

/// Loads the statistics document for `range` and publishes it to the shared
/// store. A sign-in still in flight is awaited first. Anything short of a
/// readable document yields an empty result; a missing document also clears
/// the store, transport and decode failures leave it untouched.
pub async fn get_popular_urls(state: &AppState, range: RangeKey) -> Arc<FetchResult> {
    let phase = match timeout(state.sign_in_wait, state.store.settled()).await {
        Ok(phase) => phase,
        Err(_) => {
            warn!(range = %range, "sign-in still pending, serving an empty page");
            state.store.phase()
        }
    };
    if phase != Phase::Ready {
        return Arc::new(FetchResult::empty(range));
    }
    let Some(bearer) = bearer_token(state).await else {
        return Arc::new(FetchResult::empty(range));
    };

    let document = match state
        .firestore
        .get_document(&state.collection, range.as_str(), &bearer)
        .await
    {
        Ok(document) => document,
        Err(err) => {
            error!(range = %range, "failed to load popular urls: {err}");
            return Arc::new(FetchResult::empty(range));
        }
    };

    if document.is_none() {
        error!(range = %range, "the document doesn't exist");
    }

    let result = match normalize_document(range, document) {
        Ok(result) => Arc::new(result),
        Err(err) => {
            error!(range = %range, "failed to decode popular urls: {err}");
            return Arc::new(FetchResult::empty(range));
        }
    };

    info!(range = %range, count = result.records.len(), "loaded popular urls");
    state.store.apply(PageEvent::Fetched(Arc::clone(&result)));
    result
}

/// Turns the raw document into indexed records. An absent document is an
/// empty result, not an error.
pub fn normalize_document(range: RangeKey, document: Option<Document>) -> Result<FetchResult, StoreError> {
    let Some(mut document) = document else {
        return Ok(FetchResult::empty(range));
    };

    let records: Vec<UrlStats> = match document.take_field(URLS_FIELD) {
        Some(value @ Value::ArrayValue(_)) => serde_json::from_value(value.into_json())?,
        Some(_) => {
            warn!(document = %document.name, "`{URLS_FIELD}` is not an array");
            Vec::new()
        }
        None => {
            warn!(document = %document.name, "document has no `{URLS_FIELD}` field");
            Vec::new()
        }
    };

    Ok(FetchResult::new(range, records, document.update_time))
}
