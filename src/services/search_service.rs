//! Trailing-debounced search.
//!
//! Keystrokes arrive through [`SearchService::on_input`]; each one restarts
//! the debounce window, and only the term standing when a full window
//! elapses reaches the network. Results are published on a watch channel
//! the search view subscribes to.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;

use crate::error::{AppError, AppResult};
use crate::external::ApiTransport;
use crate::models::{SearchEnvelope, SearchResults};

/// Snapshot of the search view's state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub term: String,
    pub loading: bool,
    pub results: Option<SearchResults>,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct SearchService {
    api: Arc<dyn ApiTransport>,
    delay: Duration,
    // Bumped on every keystroke; a sleeping task that wakes to a newer
    // generation was superseded and stands down.
    generation: Arc<AtomicU64>,
    tx: watch::Sender<SearchState>,
}

impl SearchService {
    pub fn new(api: Arc<dyn ApiTransport>, delay: Duration) -> Self {
        let (tx, _) = watch::channel(SearchState::default());
        Self {
            api,
            delay,
            generation: Arc::new(AtomicU64::new(0)),
            tx,
        }
    }

    /// State stream for the search view.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.tx.subscribe()
    }

    /// Feeds one keystroke's worth of input.
    ///
    /// An empty (or whitespace) term cancels any pending request and resets
    /// the published state immediately; anything else schedules a fetch for
    /// after the debounce window.
    pub fn on_input(&self, term: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let term = term.trim().to_string();
        if term.is_empty() {
            self.tx.send_replace(SearchState::default());
            return;
        }

        let api = self.api.clone();
        let delay = self.delay;
        let current = self.generation.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if current.load(Ordering::SeqCst) != generation {
                return;
            }
            tx.send_replace(SearchState {
                term: term.clone(),
                loading: true,
                results: None,
                error: None,
            });

            let outcome = fetch_results(&*api, &term).await;
            // A keystroke may have landed while the request was in flight;
            // its task owns the channel now.
            if current.load(Ordering::SeqCst) != generation {
                return;
            }
            let state = match outcome {
                Ok(results) => SearchState {
                    term,
                    loading: false,
                    results: Some(results),
                    error: None,
                },
                Err(err) => SearchState {
                    term,
                    loading: false,
                    results: None,
                    error: Some(err.display_message()),
                },
            };
            tx.send_replace(state);
        });
    }
}

async fn fetch_results(api: &dyn ApiTransport, term: &str) -> AppResult<SearchResults> {
    let value = api.get_json(&format!("/search?q={term}")).await?;
    let envelope: SearchEnvelope =
        serde_json::from_value(value).map_err(AppError::from)?;
    Ok(envelope.results)
}
