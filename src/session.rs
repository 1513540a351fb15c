use crate::config::Config;
use crate::firestore::read_api_error;
use crate::state::AppState;
use crate::store::PageEvent;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};

/// Tokens this close to expiry are refreshed before use.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Structured sign-in failure: a stable code plus the service's message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct AuthFailure {
    pub code: String,
    pub message: String,
}

impl AuthFailure {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    fn from_request(err: reqwest::Error) -> Self {
        Self::new("auth/network-request-failed", err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) >= self.expires_at
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    id_token: String,
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
    #[serde(default)]
    local_id: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
    #[serde(default)]
    user_id: String,
}

const DEFAULT_EXPIRY_SECS: i64 = 3600;

/// `expiresIn` is a decimal string of seconds; an hour when absent or out of
/// range.
fn expiry_from(now: DateTime<Utc>, expires_in: Option<&str>) -> DateTime<Utc> {
    let default = now + Duration::seconds(DEFAULT_EXPIRY_SECS);
    expires_in
        .and_then(|value| value.trim().parse::<i64>().ok())
        .and_then(Duration::try_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(default)
}

/// Maps an identity-service error to the codes the Firebase SDKs report.
fn failure_code(message: &str, status: Option<&str>, http_status: u16) -> String {
    let reason = message.split([' ', ':']).next().unwrap_or_default();
    let code = match reason {
        "ADMIN_ONLY_OPERATION" => "auth/admin-restricted-operation",
        "OPERATION_NOT_ALLOWED" => "auth/operation-not-allowed",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "auth/too-many-requests",
        "API_KEY_INVALID" => "auth/invalid-api-key",
        "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" => "auth/user-token-expired",
        "USER_DISABLED" => "auth/user-disabled",
        _ => "",
    };
    if !code.is_empty() {
        return code.to_string();
    }
    match status {
        Some(status) if !status.is_empty() => format!("auth/{}", status.to_ascii_lowercase().replace('_', "-")),
        _ => format!("auth/http-{http_status}"),
    }
}

#[derive(Clone)]
pub struct IdentityClient {
    http: Client,
    identity_url: String,
    secure_token_url: String,
    api_key: String,
}

impl IdentityClient {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            identity_url: config.identity_url.clone(),
            secure_token_url: config.secure_token_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    pub async fn sign_in_anonymously(&self) -> Result<Session, AuthFailure> {
        let url = format!("{}/v1/accounts:signUp", self.identity_url);
        let response = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({ "returnSecureToken": true }))
            .send()
            .await
            .map_err(AuthFailure::from_request)?;

        if !response.status().is_success() {
            return Err(failure_from(response).await);
        }

        let body: SignUpResponse = response.json().await.map_err(AuthFailure::from_request)?;
        Ok(Session {
            user_id: body.local_id,
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_at: expiry_from(Utc::now(), body.expires_in.as_deref()),
        })
    }

    pub async fn refresh(&self, session: &Session) -> Result<Session, AuthFailure> {
        let url = format!("{}/v1/token", self.secure_token_url);
        let response = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "grant_type": "refresh_token",
                "refresh_token": session.refresh_token,
            }))
            .send()
            .await
            .map_err(AuthFailure::from_request)?;

        if !response.status().is_success() {
            return Err(failure_from(response).await);
        }

        let body: RefreshResponse = response.json().await.map_err(AuthFailure::from_request)?;
        Ok(Session {
            user_id: if body.user_id.is_empty() { session.user_id.clone() } else { body.user_id },
            id_token: body.id_token,
            refresh_token: if body.refresh_token.is_empty() {
                session.refresh_token.clone()
            } else {
                body.refresh_token
            },
            expires_at: expiry_from(Utc::now(), body.expires_in.as_deref()),
        })
    }
}

async fn failure_from(response: reqwest::Response) -> AuthFailure {
    let (http_status, api_error, message) = read_api_error(response).await;
    let status = api_error.as_ref().and_then(|err| err.status.as_deref());
    let http_status = api_error
        .as_ref()
        .and_then(|err| err.code)
        .and_then(|code| u16::try_from(code).ok())
        .unwrap_or(http_status.as_u16());
    AuthFailure::new(failure_code(&message, status, http_status), message)
}

/// Establishes the anonymous session once. Failures are logged and leave the
/// page permanently empty.
pub async fn initialize(state: &AppState) {
    state.store.apply(PageEvent::SignInStarted);
    match state.identity.sign_in_anonymously().await {
        Ok(session) => {
            info!(user_id = %session.user_id, "user signed in");
            *state.session.lock().await = Some(session);
            state.store.apply(PageEvent::SignedIn);
        }
        Err(failure) => {
            error!(code = %failure.code, message = %failure.message, "failed to anonymously sign in the user");
            state.store.apply(PageEvent::SignInFailed(failure));
        }
    }
}

/// Current ID token, refreshed first when it is about to expire.
pub async fn bearer_token(state: &AppState) -> Option<String> {
    let mut guard = state.session.lock().await;
    let session = guard.as_mut()?;
    if session.needs_refresh(Utc::now()) {
        match state.identity.refresh(session).await {
            Ok(fresh) => *session = fresh,
            Err(failure) => {
                warn!(code = %failure.code, message = %failure.message, "failed to refresh session token");
                return None;
            }
        }
    }
    Some(session.id_token.clone())
}
