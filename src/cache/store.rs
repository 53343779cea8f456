use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use futures::future::BoxFuture;
use serde_json::Value;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::entry::{CacheEntry, Paginated};
use crate::cache::key::QueryKey;
use crate::error::{AppError, AppResult};
use crate::models::{Cursor, Page};

/// Fetch function for a simple (non-paginated) entry.
pub type SimpleFetcher = Arc<dyn Fn() -> BoxFuture<'static, AppResult<Value>> + Send + Sync>;

/// Fetch function for one page of a paginated entry, given its cursor.
pub type PageFetcher = Arc<dyn Fn(Cursor) -> BoxFuture<'static, AppResult<Page>> + Send + Sync>;

#[derive(Clone)]
enum Fetcher {
    Simple(SimpleFetcher),
    Paginated(PageFetcher),
}

/// Per-key bookkeeping. `in_flight` is the single-flight flag: it is only
/// flipped under the map guard and never held across an await point.
struct EntryState {
    entry: Option<CacheEntry>,
    stale: bool,
    in_flight: bool,
    error: Option<String>,
    fetcher: Option<Fetcher>,
    version: watch::Sender<u64>,
}

impl EntryState {
    fn new() -> Self {
        Self {
            entry: None,
            stale: false,
            in_flight: false,
            error: None,
            fetcher: None,
            version: watch::channel(0).0,
        }
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

/// What a simple-query caller should do after inspecting entry state.
enum Plan {
    Ready(Value),
    PagesReady,
    Wait(watch::Receiver<u64>),
    Run(Option<Vec<Cursor>>),
}

/// Process-wide keyed cache for query results.
///
/// Shared mutable state: any holder of the store may read or write any key;
/// correctness depends on callers addressing entries through the typed
/// `QueryKey` builders. Racing writers against the same key are
/// last-writer-wins.
pub struct QueryStore {
    entries: DashMap<QueryKey, EntryState>,
    this: Weak<QueryStore>,
}

impl QueryStore {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            entries: DashMap::new(),
            this: weak.clone(),
        })
    }

    // ------------------------------------------------------------------
    // Synchronous reads
    // ------------------------------------------------------------------

    /// Returns the cached entry, if any. No network I/O.
    pub fn get(&self, key: &QueryKey) -> Option<CacheEntry> {
        self.entries.get(key).and_then(|state| state.entry.clone())
    }

    /// Read-path error message for the view, if the last fetch failed.
    pub fn error(&self, key: &QueryKey) -> Option<String> {
        self.entries.get(key).and_then(|state| state.error.clone())
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.entries.get(key).map(|state| state.stale).unwrap_or(false)
    }

    /// Cloned page sequence of a paginated entry.
    pub fn pages(&self, key: &QueryKey) -> Option<Vec<Page>> {
        match self.get(key) {
            Some(CacheEntry::Paginated(paginated)) => Some(paginated.pages),
            _ => None,
        }
    }

    pub fn has_next_page(&self, key: &QueryKey) -> bool {
        match self.get(key) {
            Some(CacheEntry::Paginated(paginated)) => paginated.has_next_page(),
            _ => false,
        }
    }

    /// Change notifications for a key; the receiver wakes whenever the
    /// entry is written. Used by the view layer to re-render.
    pub fn watch(&self, key: &QueryKey) -> watch::Receiver<u64> {
        self.entries
            .entry(key.clone())
            .or_insert_with(EntryState::new)
            .version
            .subscribe()
    }

    // ------------------------------------------------------------------
    // Synchronous writes
    // ------------------------------------------------------------------

    /// Applies a pure read-modify-write to the entry under `key`.
    ///
    /// The updater receives the current entry (absent when never fetched)
    /// and returns the replacement; returning `None` leaves the entry
    /// unchanged, which is how patches bail out on missing or mis-shaped
    /// entries. The updater runs under the map guard and must not perform
    /// I/O or re-enter the store.
    pub fn set(
        &self,
        key: &QueryKey,
        updater: impl FnOnce(Option<CacheEntry>) -> Option<CacheEntry>,
    ) {
        let mut state = self
            .entries
            .entry(key.clone())
            .or_insert_with(EntryState::new);
        if let Some(entry) = updater(state.entry.clone()) {
            state.entry = Some(entry);
            state.bump();
        }
    }

    /// Deletes the entry entirely, fetcher included. Used only for
    /// sign-out.
    pub fn remove(&self, key: &QueryKey) {
        self.entries.remove(key);
    }

    // ------------------------------------------------------------------
    // Invalidation
    // ------------------------------------------------------------------

    /// Marks the entry stale and schedules a background refetch through its
    /// registered fetcher. Does not block; keys without a fetcher are only
    /// marked.
    pub fn invalidate(&self, key: &QueryKey) {
        let should_refetch = match self.entries.get_mut(key) {
            Some(mut state) => {
                state.stale = true;
                state.fetcher.is_some() && !state.in_flight
            }
            None => false,
        };
        if should_refetch {
            self.spawn_refetch(key.clone());
        }
    }

    /// Invalidates every entry whose key starts with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &QueryKey) {
        let keys: Vec<QueryKey> = self
            .entries
            .iter()
            .map(|state| state.key().clone())
            .filter(|key| key.starts_with(prefix))
            .collect();
        for key in keys {
            self.invalidate(&key);
        }
    }

    /// Broad invalidation: every known entry is marked stale and refetched.
    pub fn invalidate_all(&self) {
        let keys: Vec<QueryKey> = self.entries.iter().map(|state| state.key().clone()).collect();
        for key in keys {
            self.invalidate(&key);
        }
    }

    fn spawn_refetch(&self, key: QueryKey) {
        let Some(store) = self.this.upgrade() else {
            return;
        };
        tokio::spawn(async move {
            if let Err(err) = store.refetch(&key).await {
                debug!(key = %key, error = %err, "background refetch failed");
            }
        });
    }

    /// Re-runs the registered fetcher for `key`, replacing the entry. For
    /// paginated entries every known page is refetched sequentially with
    /// its stored cursor.
    async fn refetch(&self, key: &QueryKey) -> AppResult<()> {
        let fetcher = {
            let Some(mut state) = self.entries.get_mut(key) else {
                return Ok(());
            };
            if state.in_flight {
                return Ok(());
            }
            let Some(fetcher) = state.fetcher.clone() else {
                return Ok(());
            };
            state.in_flight = true;
            fetcher
        };

        match fetcher {
            Fetcher::Simple(fetch) => {
                let result = fetch().await;
                self.finish_simple(key, result).map(|_| ())
            }
            Fetcher::Paginated(fetch) => {
                let params = self.known_params(key).unwrap_or_else(|| vec![0]);
                self.run_paginated(key, &fetch, params).await
            }
        }
    }

    fn known_params(&self, key: &QueryKey) -> Option<Vec<Cursor>> {
        match self.get(key) {
            Some(CacheEntry::Paginated(paginated)) if !paginated.page_params.is_empty() => {
                Some(paginated.page_params)
            }
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Fetching
    // ------------------------------------------------------------------

    /// Resolves a simple query: returns the fresh cached value without I/O,
    /// otherwise performs a single-flight fetch. A concurrent caller for
    /// the same key waits for the in-flight result instead of issuing a
    /// duplicate request. The fetcher is registered (and refreshed) for
    /// later invalidation refetches.
    pub async fn fetch_simple(&self, key: &QueryKey, fetcher: SimpleFetcher) -> AppResult<Value> {
        loop {
            let plan = {
                let mut state = self
                    .entries
                    .entry(key.clone())
                    .or_insert_with(EntryState::new);
                state.fetcher = Some(Fetcher::Simple(fetcher.clone()));
                if state.in_flight {
                    Plan::Wait(state.version.subscribe())
                } else if !state.stale
                    && let Some(CacheEntry::Simple(value)) = &state.entry
                {
                    Plan::Ready(value.clone())
                } else {
                    state.in_flight = true;
                    Plan::Run(None)
                }
            };

            match plan {
                Plan::Ready(value) => return Ok(value),
                Plan::PagesReady => unreachable!("simple fetch never plans pages"),
                Plan::Wait(mut rx) => {
                    // Wakes when the in-flight fetch completes; the loop
                    // then re-reads the entry.
                    let _ = rx.changed().await;
                }
                Plan::Run(_) => {
                    let result = fetcher().await;
                    return self.finish_simple(key, result);
                }
            }
        }
    }

    fn finish_simple(&self, key: &QueryKey, result: AppResult<Value>) -> AppResult<Value> {
        let mut state = self
            .entries
            .entry(key.clone())
            .or_insert_with(EntryState::new);
        state.in_flight = false;
        match &result {
            Ok(value) => {
                state.entry = Some(CacheEntry::Simple(value.clone()));
                state.stale = false;
                state.error = None;
            }
            Err(err) => {
                // A stale entry stays stale so the next read retries.
                state.error = Some(err.display_message());
            }
        }
        state.bump();
        result
    }

    /// Ensures the first page of a paginated entry is loaded, registering
    /// `fetcher` for subsequent pages and invalidation refetches. Fresh
    /// cached pages short-circuit without I/O; a stale entry refetches
    /// every known page.
    pub async fn fetch_first_page(&self, key: &QueryKey, fetcher: PageFetcher) -> AppResult<()> {
        loop {
            let plan = {
                let mut state = self
                    .entries
                    .entry(key.clone())
                    .or_insert_with(EntryState::new);
                state.fetcher = Some(Fetcher::Paginated(fetcher.clone()));
                if state.in_flight {
                    Plan::Wait(state.version.subscribe())
                } else if !state.stale
                    && matches!(state.entry, Some(CacheEntry::Paginated(_)))
                {
                    Plan::PagesReady
                } else {
                    state.in_flight = true;
                    let params = match &state.entry {
                        Some(CacheEntry::Paginated(p)) if !p.page_params.is_empty() => {
                            Some(p.page_params.clone())
                        }
                        _ => None,
                    };
                    Plan::Run(params)
                }
            };

            match plan {
                Plan::PagesReady => return Ok(()),
                Plan::Ready(_) => unreachable!("paginated fetch never plans a simple value"),
                Plan::Wait(mut rx) => {
                    let _ = rx.changed().await;
                }
                Plan::Run(params) => {
                    let params = params.unwrap_or_else(|| vec![0]);
                    return self.run_paginated(key, &fetcher, params).await;
                }
            }
        }
    }

    /// Fetches the next page if one is known and no fetch is in flight for
    /// this key. The coalescing rule: a second call while one is
    /// outstanding is a no-op, so double-triggering the scroll sentinel
    /// appends exactly one page.
    pub async fn fetch_next_page(&self, key: &QueryKey) -> AppResult<()> {
        let (fetch, cursor) = {
            let Some(mut state) = self.entries.get_mut(key) else {
                return Ok(());
            };
            if state.in_flight {
                return Ok(());
            }
            let Some(CacheEntry::Paginated(paginated)) = &state.entry else {
                return Ok(());
            };
            let Some(cursor) = paginated.next_cursor() else {
                return Ok(());
            };
            let Some(Fetcher::Paginated(fetch)) = state.fetcher.clone() else {
                return Ok(());
            };
            state.in_flight = true;
            (fetch, cursor)
        };

        let result = fetch(cursor).await;

        let mut state = self
            .entries
            .entry(key.clone())
            .or_insert_with(EntryState::new);
        state.in_flight = false;
        match result {
            Ok(page) => {
                if let Some(CacheEntry::Paginated(paginated)) = &mut state.entry {
                    paginated.push_page(page, cursor);
                }
                state.error = None;
                state.bump();
                Ok(())
            }
            Err(err) => {
                state.error = Some(err.display_message());
                state.bump();
                Err(err)
            }
        }
    }

    async fn run_paginated(
        &self,
        key: &QueryKey,
        fetch: &PageFetcher,
        params: Vec<Cursor>,
    ) -> AppResult<()> {
        let mut paginated = Paginated::default();
        let mut failure: Option<AppError> = None;
        for cursor in params {
            match fetch(cursor).await {
                Ok(page) => paginated.push_page(page, cursor),
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        let mut state = self
            .entries
            .entry(key.clone())
            .or_insert_with(EntryState::new);
        state.in_flight = false;
        match failure {
            None => {
                state.entry = Some(CacheEntry::Paginated(paginated));
                state.stale = false;
                state.error = None;
                state.bump();
                Ok(())
            }
            Some(err) => {
                // Keep whatever was cached before the failed refetch, and
                // keep it stale so the next read retries.
                state.error = Some(err.display_message());
                state.bump();
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------
    // Background polling
    // ------------------------------------------------------------------

    /// Invalidates `key` on a fixed interval until the token is cancelled,
    /// driving the registered fetcher to keep the entry current (unread
    /// notification count, the open conversation).
    pub fn spawn_refetch_interval(
        &self,
        key: &QueryKey,
        period: Duration,
        token: CancellationToken,
    ) -> Option<tokio::task::JoinHandle<()>> {
        let Some(store) = self.this.upgrade() else {
            warn!(key = %key, "store dropped before poller start");
            return None;
        };
        let key = key.clone();
        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick fires immediately; skip it so the initial
            // fetch stays with the caller.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => store.invalidate(&key),
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn counting_simple(counter: Arc<AtomicU64>, value: Value) -> SimpleFetcher {
        Arc::new(move || {
            let counter = counter.clone();
            let value = value.clone();
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(value)
            })
        })
    }

    /// Pages of one item each; `id` mirrors the cursor. Cursors advance by
    /// one until `last`.
    fn counting_pages(counter: Arc<AtomicU64>, last: Cursor, delay_ms: u64) -> PageFetcher {
        Arc::new(move |cursor| {
            let counter = counter.clone();
            Box::pin(async move {
                if delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                counter.fetch_add(1, Ordering::SeqCst);
                let next = if cursor < last { Some(cursor + 1) } else { None };
                Ok(Page::new(vec![json!({"id": cursor})], next))
            })
        })
    }

    #[tokio::test]
    async fn test_fetch_simple_caches_value() {
        let store = QueryStore::new();
        let counter = Arc::new(AtomicU64::new(0));
        let key = QueryKey::notifs_count();
        let fetcher = counting_simple(counter.clone(), json!({"count": 2}));

        let first = store.fetch_simple(&key, fetcher.clone()).await.unwrap();
        let second = store.fetch_simple(&key, fetcher).await.unwrap();

        assert_eq!(first, json!({"count": 2}));
        assert_eq!(second, json!({"count": 2}));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_simple_fetch_is_single_flight() {
        let store = QueryStore::new();
        let counter = Arc::new(AtomicU64::new(0));
        let key = QueryKey::auth();
        let slow: SimpleFetcher = {
            let counter = counter.clone();
            Arc::new(move || {
                let counter = counter.clone();
                Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(json!({"id": 1}))
                })
            })
        };

        let (a, b) = tokio::join!(
            store.fetch_simple(&key, slow.clone()),
            store.fetch_simple(&key, slow)
        );

        assert_eq!(a.unwrap(), json!({"id": 1}));
        assert_eq!(b.unwrap(), json!({"id": 1}));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_fetch_next_page_appends_once() {
        let store = QueryStore::new();
        let counter = Arc::new(AtomicU64::new(0));
        let key = QueryKey::home_feed();
        let fetcher = counting_pages(counter.clone(), 5, 20);

        store.fetch_first_page(&key, fetcher).await.unwrap();
        assert_eq!(store.pages(&key).unwrap().len(), 1);

        // Two rapid calls while the first is outstanding: the second must
        // be coalesced into a no-op.
        let (a, b) = tokio::join!(store.fetch_next_page(&key), store.fetch_next_page(&key));
        a.unwrap();
        b.unwrap();

        assert_eq!(store.pages(&key).unwrap().len(), 2);
        // one first-page fetch + exactly one next-page fetch
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_next_page_without_cursor_is_noop() {
        let store = QueryStore::new();
        let counter = Arc::new(AtomicU64::new(0));
        let key = QueryKey::notifs();
        // last = 0: first page announces no next cursor
        let fetcher = counting_pages(counter.clone(), 0, 0);

        store.fetch_first_page(&key, fetcher).await.unwrap();
        assert!(!store.has_next_page(&key));

        store.fetch_next_page(&key).await.unwrap();
        assert_eq!(store.pages(&key).unwrap().len(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_schedules_background_refetch() {
        let store = QueryStore::new();
        let counter = Arc::new(AtomicU64::new(0));
        let key = QueryKey::all_tags();
        let fetcher = counting_simple(counter.clone(), json!([{"id": 1, "name": "rust"}]));

        store.fetch_simple(&key, fetcher).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        store.invalidate(&key);
        // let the spawned refetch run
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert!(!store.is_stale(&key));
    }

    #[tokio::test(start_paused = true)]
    async fn test_paginated_refetch_replays_all_known_pages() {
        let store = QueryStore::new();
        let counter = Arc::new(AtomicU64::new(0));
        let key = QueryKey::tag_to_follow();
        let fetcher = counting_pages(counter.clone(), 5, 0);

        store.fetch_first_page(&key, fetcher).await.unwrap();
        store.fetch_next_page(&key).await.unwrap();
        store.fetch_next_page(&key).await.unwrap();
        assert_eq!(store.pages(&key).unwrap().len(), 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);

        store.invalidate(&key);
        tokio::time::sleep(Duration::from_millis(10)).await;

        // all three known cursors were replayed
        assert_eq!(counter.load(Ordering::SeqCst), 6);
        assert_eq!(store.pages(&key).unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refetch_keeps_entry_stale_and_retries() {
        let store = QueryStore::new();
        let calls = Arc::new(AtomicU64::new(0));
        let failing = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let fetcher: SimpleFetcher = {
            let calls = calls.clone();
            let failing = failing.clone();
            Arc::new(move || {
                let calls = calls.clone();
                let failing = failing.clone();
                Box::pin(async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    if failing.load(Ordering::SeqCst) {
                        Err(AppError::Api {
                            status: 500,
                            error: "Internal Server Error".to_string(),
                            message: "server down".to_string(),
                        })
                    } else {
                        Ok(json!({"count": 1}))
                    }
                })
            })
        };
        let key = QueryKey::notifs_count();
        store.fetch_simple(&key, fetcher.clone()).await.unwrap();

        // The server goes down across an invalidation refetch.
        failing.store(true, Ordering::SeqCst);
        store.invalidate(&key);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(store.is_stale(&key));
        assert_eq!(store.error(&key).as_deref(), Some("server down"));

        // The next read must retry rather than serve the stale value.
        failing.store(false, Ordering::SeqCst);
        let value = store.fetch_simple(&key, fetcher).await.unwrap();
        assert_eq!(value, json!({"count": 1}));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(!store.is_stale(&key));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_prefix_hits_matching_keys_only() {
        let store = QueryStore::new();
        let alice = QueryKey::chat("alice");
        let bob = QueryKey::chat("bob");
        let chats = QueryKey::chats();
        for key in [&alice, &bob, &chats] {
            store.set(key, |_| Some(CacheEntry::Simple(json!([]))));
        }

        store.invalidate_prefix(&QueryKey::chat_prefix());
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(store.is_stale(&alice));
        assert!(store.is_stale(&bob));
        // "messages" does not share the "chat" prefix
        assert!(!store.is_stale(&chats));
    }

    #[tokio::test]
    async fn test_remove_clears_identity() {
        let store = QueryStore::new();
        let key = QueryKey::auth();
        store.set(&key, |_| Some(CacheEntry::Simple(json!({"id": 7}))));
        assert!(store.get(&key).is_some());

        store.remove(&key);
        assert!(store.get(&key).is_none());
    }

    #[tokio::test]
    async fn test_set_updater_none_leaves_entry_absent() {
        let store = QueryStore::new();
        let key = QueryKey::chat("alice");
        store.set(&key, |old| {
            assert!(old.is_none());
            None
        });
        assert!(store.get(&key).is_none());
    }

    #[tokio::test]
    async fn test_fetch_error_recorded_for_view() {
        let store = QueryStore::new();
        let key = QueryKey::user("ghost");
        let fetcher: SimpleFetcher = Arc::new(|| {
            Box::pin(async {
                Err(AppError::Api {
                    status: 404,
                    error: "Not Found".to_string(),
                    message: "No such user".to_string(),
                })
            })
        });

        let result = store.fetch_simple(&key, fetcher).await;
        assert!(result.is_err());
        assert_eq!(store.error(&key).as_deref(), Some("No such user"));
        assert!(store.get(&key).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_interval_polls_until_cancelled() {
        let store = QueryStore::new();
        let counter = Arc::new(AtomicU64::new(0));
        let key = QueryKey::notifs_count();
        let fetcher = counting_simple(counter.clone(), json!({"count": 0}));

        store.fetch_simple(&key, fetcher).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        let token = CancellationToken::new();
        let handle = store
            .spawn_refetch_interval(&key, Duration::from_millis(100), token.clone())
            .unwrap();

        tokio::time::sleep(Duration::from_millis(350)).await;
        let polled = counter.load(Ordering::SeqCst);
        assert!(polled >= 3, "expected at least 3 poll fetches, got {polled}");

        token.cancel();
        handle.await.unwrap();
        let after_cancel = counter.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(counter.load(Ordering::SeqCst), after_cancel);
    }
}
