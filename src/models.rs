use crate::range::RangeKey;
use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// One aggregated row describing mentions of a URL within a range. Null
/// fields read as their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UrlStats {
    #[serde(deserialize_with = "nullable")]
    pub mentioned_url: String,
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    #[serde(deserialize_with = "count")]
    pub mentions_count: u64,
    #[serde(deserialize_with = "count")]
    pub influencer_mentions_count: u64,
    #[serde(deserialize_with = "count")]
    pub quote_count: u64,
    #[serde(deserialize_with = "count")]
    pub retweet_count: u64,
    #[serde(deserialize_with = "nullable")]
    pub mentioned_by_influencers: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub tweet_urls: Vec<String>,
    /// Position within the fetch that produced this record.
    #[serde(skip_deserializing)]
    pub index: usize,
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Counts arrive as integers, whole-number doubles or numeric strings.
fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    enum RawCount {
        Int(u64),
        Float(f64),
        Text(String),
    }

    match Option::<RawCount>::deserialize(deserializer)? {
        None => Ok(0),
        Some(RawCount::Int(value)) => Ok(value),
        Some(RawCount::Float(value)) if value >= 0.0 && value.fract() == 0.0 && value < u64::MAX as f64 => {
            Ok(value as u64)
        }
        Some(RawCount::Text(value)) => value
            .trim()
            .parse::<u64>()
            .map_err(|err| D::Error::custom(format!("invalid count {value:?}: {err}"))),
        Some(other) => Err(D::Error::custom(format!("invalid count {other:?}"))),
    }
}

impl UrlStats {
    pub fn link_text(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.mentioned_url
        } else {
            &self.title
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchResult {
    pub range: Option<RangeKey>,
    pub records: Vec<UrlStats>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl FetchResult {
    pub fn new(range: RangeKey, mut records: Vec<UrlStats>, updated_at: Option<DateTime<Utc>>) -> Self {
        assign_indices(&mut records);
        Self {
            range: Some(range),
            records,
            updated_at,
        }
    }

    pub fn empty(range: RangeKey) -> Self {
        Self {
            range: Some(range),
            ..Self::default()
        }
    }

    pub fn get(&self, index: usize) -> Option<&UrlStats> {
        self.records.get(index).filter(|record| record.index == index)
    }
}

pub fn assign_indices(records: &mut [UrlStats]) {
    for (index, record) in records.iter_mut().enumerate() {
        record.index = index;
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    pub range: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UrlsResponse {
    pub range: RangeKey,
    pub updated_at: Option<DateTime<Utc>>,
    pub urls: Vec<UrlStats>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub phase: String,
    pub records: usize,
}
