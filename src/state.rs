//! Top-level wiring of the sync layer.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::QueryStore;
use crate::config::Settings;
use crate::external::{ApiTransport, HttpApi, TokenStore};
use crate::repositories::Repositories;
use crate::services::{SearchService, Services};

/// Everything a client view layer needs: the shared query store, the typed
/// read path, the mutation services and the debounced search path, all
/// wired to one transport and one token store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<QueryStore>,
    pub tokens: TokenStore,
    pub api: Arc<dyn ApiTransport>,
    pub repositories: Repositories,
    pub services: Services,
    pub search: SearchService,
}

impl AppState {
    /// Builds the full stack against the configured REST endpoint.
    pub fn new(settings: &Settings) -> Self {
        let tokens = TokenStore::new();
        let api: Arc<dyn ApiTransport> = Arc::new(HttpApi::new(&settings.api, tokens.clone()));
        Self::with_transport(settings, api, tokens)
    }

    /// Builds the stack around an arbitrary transport. Used by tests to
    /// substitute a canned transport for the HTTP client.
    pub fn with_transport(
        settings: &Settings,
        api: Arc<dyn ApiTransport>,
        tokens: TokenStore,
    ) -> Self {
        let store = QueryStore::new();
        let repositories = Repositories::new(store.clone(), api.clone(), tokens.clone());
        let services = Services::new(store.clone(), api.clone(), tokens.clone());
        let search = SearchService::new(
            api.clone(),
            Duration::from_millis(settings.search.debounce_ms),
        );
        Self {
            store,
            tokens,
            api,
            repositories,
            services,
            search,
        }
    }
}
