use crate::config::Config;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Number, Value as Json};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    #[error("store returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed document: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Typed value as encoded by the Firestore REST API. Exactly one key is
/// present per value object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BooleanValue(bool),
    /// int64 travels as a decimal string.
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(GeoPoint),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeoPoint {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MapValue {
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

impl Value {
    /// Strips the type tags, yielding plain JSON that serde can map onto
    /// domain structs.
    pub fn into_json(self) -> Json {
        match self {
            Value::NullValue(()) => Json::Null,
            Value::BooleanValue(value) => Json::Bool(value),
            Value::IntegerValue(raw) => match raw.parse::<i64>() {
                Ok(value) => Json::Number(value.into()),
                Err(_) => Json::String(raw),
            },
            Value::DoubleValue(value) => Number::from_f64(value).map(Json::Number).unwrap_or(Json::Null),
            Value::TimestampValue(value)
            | Value::StringValue(value)
            | Value::BytesValue(value)
            | Value::ReferenceValue(value) => Json::String(value),
            Value::GeoPointValue(point) => {
                let mut object = Map::new();
                object.insert("latitude".into(), Number::from_f64(point.latitude).map_or(Json::Null, Json::Number));
                object.insert("longitude".into(), Number::from_f64(point.longitude).map_or(Json::Null, Json::Number));
                Json::Object(object)
            }
            Value::ArrayValue(array) => Json::Array(array.values.into_iter().map(Value::into_json).collect()),
            Value::MapValue(map) => fields_to_json(map.fields),
        }
    }
}

pub fn fields_to_json(fields: BTreeMap<String, Value>) -> Json {
    Json::Object(fields.into_iter().map(|(key, value)| (key, value.into_json())).collect())
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
}

impl Document {
    pub fn take_field(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }
}

/// Error envelope shared by the Google REST APIs.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Reads the Google error envelope from a failed response, falling back to
/// the raw body text.
pub(crate) async fn read_api_error(response: Response) -> (StatusCode, Option<ApiError>, String) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) => {
            let message = parsed.error.message.clone();
            (status, Some(parsed.error), message)
        }
        Err(_) => (status, None, body),
    }
}

#[derive(Clone)]
pub struct FirestoreClient {
    http: Client,
    base_url: String,
    project_id: String,
}

impl FirestoreClient {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.firestore_url.clone(),
            project_id: config.project_id.clone(),
        }
    }

    pub fn document_url(&self, collection: &str, key: &str) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}/{}",
            self.base_url, self.project_id, collection, key
        )
    }

    /// Point lookup of one document. `Ok(None)` means the document does not
    /// exist.
    pub async fn get_document(&self, collection: &str, key: &str, bearer: &str) -> Result<Option<Document>, StoreError> {
        let response = self
            .http
            .get(self.document_url(collection, key))
            .bearer_auth(bearer)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let (status, _, message) = read_api_error(response).await;
            return Err(StoreError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        Ok(Some(serde_json::from_slice(&body)?))
    }
}
