//! Service layer: the mutation coordinator.
//!
//! Every write intent follows the same three-phase contract: validate the
//! arguments locally, apply a synchronous optimistic patch to the query
//! store, then issue the network call and settle by invalidating the
//! affected keys. Network failures are logged and swallowed; the
//! optimistic state is never rolled back and the next invalidation refetch
//! reconciles it with server truth.

mod auth_service;
mod message_service;
mod notification_service;
mod post_service;
mod search_service;
mod tag_service;
mod user_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth_service::AuthService;
pub use message_service::{DeleteScope, MessageService};
pub use notification_service::NotificationService;
pub use post_service::{LikeTarget, PostService};
pub use search_service::{SearchService, SearchState};
pub use tag_service::TagService;
pub use user_service::{FollowTarget, UserService};

use std::sync::Arc;

use crate::cache::QueryStore;
use crate::error::AppError;
use crate::external::{ApiTransport, TokenStore};

/// Aggregates all mutation services for convenient access.
///
/// Cloning is cheap since the store and transport are behind `Arc`.
#[derive(Clone)]
pub struct Services {
    pub posts: PostService,
    pub users: UserService,
    pub tags: TagService,
    pub messages: MessageService,
    pub notifications: NotificationService,
    pub auth: AuthService,
}

impl Services {
    /// Creates a new Services instance sharing one store and transport.
    pub fn new(
        store: Arc<QueryStore>,
        api: Arc<dyn ApiTransport>,
        tokens: TokenStore,
    ) -> Self {
        Self {
            posts: PostService::new(store.clone(), api.clone()),
            users: UserService::new(store.clone(), api.clone()),
            tags: TagService::new(store.clone(), api.clone()),
            messages: MessageService::new(store.clone(), api.clone()),
            notifications: NotificationService::new(store.clone(), api.clone()),
            auth: AuthService::new(store, api, tokens),
        }
    }
}

/// Write-path failures are logged for the error-reporting collaborator and
/// never propagate to the caller.
pub(crate) fn log_mutation_error(operation: &str, err: &AppError) {
    tracing::error!(operation, error = %err, "mutation failed");
}
