//! Chat mutations: sending and deleting messages.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::cache::{CacheEntry, QueryKey, QueryStore};
use crate::error::{AppError, AppResult};
use crate::external::ApiTransport;
use crate::models::Recipient;
use crate::services::log_mutation_error;
use crate::utils::time::{message_timestamp, temp_id};
use crate::utils::validate::validate_message_body;

/// Who a deleted message disappears for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteScope {
    /// Remove the message for both participants. Only the author may do
    /// this.
    Everyone,
    /// Hide the message for the current user only.
    SelfOnly,
}

#[derive(Clone)]
pub struct MessageService {
    store: Arc<QueryStore>,
    api: Arc<dyn ApiTransport>,
}

impl MessageService {
    pub fn new(store: Arc<QueryStore>, api: Arc<dyn ApiTransport>) -> Self {
        Self { store, api }
    }

    /// Sends a chat message to `to`.
    ///
    /// A synthesized unread message is prepended to the newest page of the
    /// conversation (pages run newest-first), then the request goes out and
    /// only the conversation key settles.
    ///
    /// # Arguments
    ///
    /// * `body` - message text
    /// * `to` - the peer the message goes to
    /// * `from` - the sender's user id, stamped on the synthesized item so
    ///   the view renders it on the outgoing side
    pub async fn send_message(
        &self,
        body: &str,
        to: &Recipient,
        from: Option<i64>,
    ) -> AppResult<()> {
        validate_message_body(body)?;
        let key = QueryKey::chat(&to.username);
        let item = json!({
            "id": temp_id(),
            "body": body,
            "author_id": from,
            "isRead": false,
            "created_on": message_timestamp(&jiff::Zoned::now()),
        });
        self.store.set(&key, move |old| {
            let Some(CacheEntry::Paginated(mut paginated)) = old else {
                return None;
            };
            paginated.prepend_first(item);
            Some(CacheEntry::Paginated(paginated))
        });

        let result = self
            .api
            .post_json(&format!("/messages?user={}", to.id), json!({ "body": body }))
            .await;
        if let Err(err) = &result {
            log_mutation_error("send_message", err);
        }
        self.store.invalidate(&key);
        Ok(())
    }

    /// Deletes a message from the conversation with `username`.
    ///
    /// [`DeleteScope::Everyone`] requires the cached message's author to
    /// match the cached authenticated user; anything else is rejected
    /// before any cache patch or network call. The message is removed from
    /// its page optimistically, then both the conversation and the chat
    /// list settle.
    pub async fn delete_message(
        &self,
        message_id: i64,
        page_index: usize,
        username: &str,
        scope: DeleteScope,
    ) -> AppResult<()> {
        let key = QueryKey::chat(username);
        if scope == DeleteScope::Everyone {
            let author = self.cached_message_author(&key, page_index, message_id);
            let viewer = self.cached_auth_id();
            match (author, viewer) {
                (Some(author), Some(viewer)) if author == viewer => {}
                _ => {
                    return Err(AppError::Forbidden {
                        message: "Only the author can delete a message for everyone".to_string(),
                    });
                }
            }
        }

        self.store.set(&key, move |old| {
            let Some(CacheEntry::Paginated(mut paginated)) = old else {
                return None;
            };
            paginated.remove_from_page(page_index, |item| {
                item.get("id").and_then(Value::as_i64) == Some(message_id)
            });
            Some(CacheEntry::Paginated(paginated))
        });

        let path = match scope {
            DeleteScope::Everyone => format!("/messages/{message_id}"),
            DeleteScope::SelfOnly => format!("/messages/{message_id}?userOnly=true"),
        };
        let result = self.api.delete_json(&path).await;
        if let Err(err) = &result {
            log_mutation_error("delete_message", err);
        }
        self.store.invalidate(&key);
        self.store.invalidate(&QueryKey::chats());
        Ok(())
    }

    fn cached_message_author(
        &self,
        key: &QueryKey,
        page_index: usize,
        message_id: i64,
    ) -> Option<i64> {
        let pages = self.store.pages(key)?;
        pages
            .get(page_index)?
            .data
            .iter()
            .find(|item| item.get("id").and_then(Value::as_i64) == Some(message_id))
            .and_then(|item| item.get("author_id").and_then(Value::as_i64))
    }

    fn cached_auth_id(&self) -> Option<i64> {
        match self.store.get(&QueryKey::auth())? {
            CacheEntry::Simple(value) => value.get("id").and_then(Value::as_i64),
            CacheEntry::Paginated(_) => None,
        }
    }
}
