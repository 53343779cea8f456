//! User repository: the authenticated user, profiles, and follow lists.

use std::sync::Arc;

use crate::cache::{QueryKey, QueryStore};
use crate::error::{AppError, AppResult};
use crate::external::{ApiTransport, TokenStore};
use crate::models::{User, UserSummary};
use crate::repositories::{page_fetcher, typed_pages, value_fetcher};

#[derive(Clone)]
pub struct UserRepository {
    store: Arc<QueryStore>,
    api: Arc<dyn ApiTransport>,
    tokens: TokenStore,
}

impl UserRepository {
    pub fn new(store: Arc<QueryStore>, api: Arc<dyn ApiTransport>, tokens: TokenStore) -> Self {
        Self { store, api, tokens }
    }

    /// The authenticated user. Disabled while no token is held: returns
    /// `Unauthorized` without touching the network, so signed-out views
    /// never trigger spurious `/users/auth` calls.
    pub async fn auth(&self) -> AppResult<User> {
        if !self.tokens.is_present() {
            return Err(AppError::Unauthorized {
                message: "Not signed in".to_string(),
            });
        }
        let value = self
            .store
            .fetch_simple(
                &QueryKey::auth(),
                value_fetcher(self.api.clone(), "/users/auth".to_string()),
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Synchronous auth snapshot from the cache; used for dependent reads
    /// such as "is the caller the author of this message".
    pub fn cached_auth(&self) -> Option<User> {
        let entry = self.store.get(&QueryKey::auth())?;
        serde_json::from_value(entry.as_simple()?.clone()).ok()
    }

    /// A user's public profile page data.
    pub async fn user(&self, username: &str) -> AppResult<User> {
        let key = QueryKey::user(username);
        let path = format!("/profile/{username}");
        let value = self
            .store
            .fetch_simple(&key, value_fetcher(self.api.clone(), path))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Who-to-follow widget: a flat list of user summaries.
    pub async fn to_follow(&self) -> AppResult<Vec<UserSummary>> {
        let value = self
            .store
            .fetch_simple(
                &QueryKey::to_follow(),
                value_fetcher(self.api.clone(), "/users/to-follow".to_string()),
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Paginated follower list for a profile.
    pub async fn followers(&self, username: &str) -> AppResult<Vec<Vec<UserSummary>>> {
        self.infinite_users(
            &QueryKey::followers(username),
            &format!("/profile/{username}/followers"),
        )
        .await
    }

    /// Paginated following list for a profile.
    pub async fn following(&self, username: &str) -> AppResult<Vec<Vec<UserSummary>>> {
        self.infinite_users(
            &QueryKey::following(username),
            &format!("/profile/{username}/following"),
        )
        .await
    }

    async fn infinite_users(
        &self,
        key: &QueryKey,
        path: &str,
    ) -> AppResult<Vec<Vec<UserSummary>>> {
        self.store
            .fetch_first_page(key, page_fetcher(self.api.clone(), path.to_string()))
            .await?;
        typed_pages(&self.store, key)
    }

    pub async fn fetch_next_page(&self, key: &QueryKey) -> AppResult<()> {
        self.store.fetch_next_page(key).await
    }

    pub fn has_next_page(&self, key: &QueryKey) -> bool {
        self.store.has_next_page(key)
    }
}
