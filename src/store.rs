use crate::models::{FetchResult, UrlStats};
use crate::session::AuthFailure;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Page lifecycle. `Failed` is terminal: no event leaves it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PageState {
    #[default]
    Unauthenticated,
    Authenticating,
    Ready(Arc<FetchResult>),
    Failed(AuthFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unauthenticated,
    Authenticating,
    Ready,
    Failed,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Unauthenticated => "unauthenticated",
            Phase::Authenticating => "authenticating",
            Phase::Ready => "ready",
            Phase::Failed => "failed",
        }
    }
}

impl PageState {
    pub fn phase(&self) -> Phase {
        match self {
            PageState::Unauthenticated => Phase::Unauthenticated,
            PageState::Authenticating => Phase::Authenticating,
            PageState::Ready(_) => Phase::Ready,
            PageState::Failed(_) => Phase::Failed,
        }
    }

    pub fn result(&self) -> Option<&Arc<FetchResult>> {
        match self {
            PageState::Ready(result) => Some(result),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum PageEvent {
    SignInStarted,
    SignedIn,
    SignInFailed(AuthFailure),
    Fetched(Arc<FetchResult>),
}

impl PageEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PageEvent::SignInStarted => "sign_in_started",
            PageEvent::SignedIn => "signed_in",
            PageEvent::SignInFailed(_) => "sign_in_failed",
            PageEvent::Fetched(_) => "fetched",
        }
    }
}

/// Returns the next state, or `None` when the event does not apply to the
/// current state.
pub fn transition(state: &PageState, event: PageEvent) -> Option<PageState> {
    match (state, event) {
        (PageState::Unauthenticated, PageEvent::SignInStarted) => Some(PageState::Authenticating),
        (PageState::Authenticating, PageEvent::SignedIn) => Some(PageState::Ready(Arc::default())),
        (PageState::Authenticating, PageEvent::SignInFailed(failure)) => Some(PageState::Failed(failure)),
        (PageState::Ready(_), PageEvent::Fetched(result)) => Some(PageState::Ready(result)),
        _ => None,
    }
}

/// Shared slot holding the page state and the most recent fetch result.
/// `apply` is the only write path; every accepted event notifies subscribers.
#[derive(Clone)]
pub struct AppStore {
    tx: Arc<watch::Sender<PageState>>,
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AppStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(PageState::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn apply(&self, event: PageEvent) -> bool {
        self.tx.send_if_modified(|state| {
            let name = event.name();
            match transition(state, event) {
                Some(next) => {
                    *state = next;
                    true
                }
                None => {
                    debug!(phase = state.phase().as_str(), event = name, "ignored page event");
                    false
                }
            }
        })
    }

    pub fn snapshot(&self) -> PageState {
        self.tx.borrow().clone()
    }

    pub fn phase(&self) -> Phase {
        self.tx.borrow().phase()
    }

    pub fn is_ready(&self) -> bool {
        self.phase() == Phase::Ready
    }

    /// Latest published fetch result, if the page is ready.
    pub fn current(&self) -> Option<Arc<FetchResult>> {
        self.tx.borrow().result().cloned()
    }

    pub fn lookup(&self, index: usize) -> Option<UrlStats> {
        self.current().and_then(|result| result.get(index).cloned())
    }

    pub fn subscribe(&self) -> watch::Receiver<PageState> {
        self.tx.subscribe()
    }

    /// Resolves once sign-in has finished, successfully or not.
    pub async fn settled(&self) -> Phase {
        let mut rx = self.tx.subscribe();
        match rx.wait_for(|state| matches!(state.phase(), Phase::Ready | Phase::Failed)).await {
            Ok(state) => state.phase(),
            Err(_) => self.phase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::RangeKey;

    fn failure() -> AuthFailure {
        AuthFailure::new("auth/operation-not-allowed", "OPERATION_NOT_ALLOWED")
    }

    fn result_with(count: usize) -> Arc<FetchResult> {
        let records = (0..count)
            .map(|i| UrlStats {
                mentioned_url: format!("https://example.com/{i}"),
                ..UrlStats::default()
            })
            .collect();
        Arc::new(FetchResult::new(RangeKey::LastWeek, records, None))
    }

    #[test]
    fn happy_path_reaches_populated_ready() {
        let store = AppStore::new();
        assert_eq!(store.phase(), Phase::Unauthenticated);
        assert!(store.apply(PageEvent::SignInStarted));
        assert_eq!(store.phase(), Phase::Authenticating);
        assert!(store.apply(PageEvent::SignedIn));
        assert!(store.current().unwrap().records.is_empty());
        assert!(store.apply(PageEvent::Fetched(result_with(3))));
        assert_eq!(store.current().unwrap().records.len(), 3);
    }

    #[test]
    fn failed_is_terminal() {
        let store = AppStore::new();
        store.apply(PageEvent::SignInStarted);
        store.apply(PageEvent::SignInFailed(failure()));
        assert_eq!(store.phase(), Phase::Failed);
        assert!(!store.apply(PageEvent::SignInStarted));
        assert!(!store.apply(PageEvent::SignedIn));
        assert!(!store.apply(PageEvent::Fetched(result_with(1))));
        assert_eq!(store.phase(), Phase::Failed);
        assert!(store.lookup(0).is_none());
    }

    #[test]
    fn fetch_before_sign_in_is_ignored() {
        let store = AppStore::new();
        assert!(!store.apply(PageEvent::Fetched(result_with(2))));
        assert_eq!(store.phase(), Phase::Unauthenticated);
        assert!(transition(&PageState::Authenticating, PageEvent::SignInStarted).is_none());
    }

    #[test]
    fn lookup_only_sees_latest_fetch() {
        let store = AppStore::new();
        assert!(store.lookup(0).is_none());
        store.apply(PageEvent::SignInStarted);
        store.apply(PageEvent::SignedIn);
        store.apply(PageEvent::Fetched(result_with(3)));
        assert_eq!(store.lookup(2).unwrap().index, 2);
        assert!(store.lookup(5).is_none());

        store.apply(PageEvent::Fetched(result_with(1)));
        assert!(store.lookup(2).is_none());
        assert_eq!(store.lookup(0).unwrap().mentioned_url, "https://example.com/0");
    }

    #[tokio::test]
    async fn settled_waits_for_sign_in_to_finish() {
        let store = AppStore::new();
        store.apply(PageEvent::SignInStarted);

        let signer = store.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            signer.apply(PageEvent::SignedIn);
        });

        assert_eq!(store.settled().await, Phase::Ready);

        let failed = AppStore::new();
        failed.apply(PageEvent::SignInStarted);
        failed.apply(PageEvent::SignInFailed(failure()));
        assert_eq!(failed.settled().await, Phase::Failed);
    }

    #[tokio::test]
    async fn subscribers_are_notified_of_transitions() {
        let store = AppStore::new();
        let mut rx = store.subscribe();
        store.apply(PageEvent::SignInStarted);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().phase(), Phase::Authenticating);

        store.apply(PageEvent::SignedIn);
        store.apply(PageEvent::Fetched(result_with(2)));
        rx.changed().await.unwrap();
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.result().unwrap().records.len(), 2);
        assert!(!rx.has_changed().unwrap());
    }
}
