use crate::config::Config;
use crate::firestore::FirestoreClient;
use crate::session::{IdentityClient, Session};
use crate::store::AppStore;
use reqwest::Client;
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub collection: String,
    /// How long a page load waits for an in-flight sign-in.
    pub sign_in_wait: Duration,
    pub identity: IdentityClient,
    pub firestore: FirestoreClient,
    pub session: Arc<Mutex<Option<Session>>>,
    pub store: AppStore,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            collection: config.collection.clone(),
            sign_in_wait: config.timeout,
            identity: IdentityClient::new(http.clone(), config),
            firestore: FirestoreClient::new(http, config),
            session: Arc::new(Mutex::new(None)),
            store: AppStore::new(),
        })
    }
}
