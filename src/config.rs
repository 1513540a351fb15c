use std::{env, time::Duration};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_PROJECT_ID: &str = "web3twitterdata";
const DEFAULT_COLLECTION: &str = "urlsData";
const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com";
const DEFAULT_SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com";
const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub api_key: String,
    pub project_id: String,
    pub collection: String,
    pub identity_url: String,
    pub secure_token_url: String,
    pub firestore_url: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let text = |key: &str, default: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let base_url = |key: &str, default: &str| text(key, default).trim_end_matches('/').to_string();

        Self {
            port: lookup("PORT")
                .and_then(|value| value.trim().parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
            api_key: text("FIREBASE_API_KEY", ""),
            project_id: text("FIREBASE_PROJECT_ID", DEFAULT_PROJECT_ID),
            collection: text("URLS_COLLECTION", DEFAULT_COLLECTION),
            identity_url: base_url("IDENTITY_BASE_URL", DEFAULT_IDENTITY_URL),
            secure_token_url: base_url("SECURE_TOKEN_BASE_URL", DEFAULT_SECURE_TOKEN_URL),
            firestore_url: base_url("FIRESTORE_BASE_URL", DEFAULT_FIRESTORE_URL),
            timeout: Duration::from_secs(
                lookup("STORE_TIMEOUT_SECS")
                    .and_then(|value| value.trim().parse::<u64>().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        }
    }
}
