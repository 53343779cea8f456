//! Post mutations: creating posts and comments, deleting posts, toggling
//! likes.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::cache::{CacheEntry, QueryKey, QueryStore};
use crate::error::AppResult;
use crate::external::ApiTransport;
use crate::models::User;
use crate::services::log_mutation_error;
use crate::utils::time::{post_date, temp_id};
use crate::utils::validate::{plain_body, validate_post_body};

/// Where the optimistic like patch should land.
///
/// The same post can be cached both as a standalone detail entry and inside
/// a feed page; the caller names the view it is mutating through.
#[derive(Debug, Clone)]
pub enum LikeTarget {
    /// A simple entry holding one post object.
    SinglePost { key: QueryKey },
    /// One page of a paginated feed entry.
    PostPage { key: QueryKey, page_index: usize },
}

#[derive(Clone)]
pub struct PostService {
    store: Arc<QueryStore>,
    api: Arc<dyn ApiTransport>,
}

impl PostService {
    pub fn new(store: Arc<QueryStore>, api: Arc<dyn ApiTransport>) -> Self {
        Self { store, api }
    }

    /// Creates a post from a rich-text document.
    ///
    /// A synthesized post with a timestamp id is prepended to the first page
    /// of `feed_key` before the request goes out. Whatever the server
    /// answers, every cached entry is invalidated afterwards so the
    /// synthesized item is replaced by server truth.
    ///
    /// # Arguments
    ///
    /// * `doc` - rich-text document, either a plain string body or a
    ///   `{"blocks": [{"text": ...}]}` object
    /// * `author` - the authenticated user, projected into the synthesized
    ///   item's author field
    /// * `feed_key` - the feed entry currently on screen
    pub async fn create_post(
        &self,
        doc: &Value,
        author: &User,
        feed_key: &QueryKey,
    ) -> AppResult<()> {
        validate_post_body(doc)?;
        let item = json!({
            "id": temp_id(),
            "body": plain_body(doc),
            "created_on": post_date(&jiff::Zoned::now()),
            "likes": 0,
            "isLiked": false,
            "comments": 0,
            "tags": [],
            "parent": null,
            "author": {
                "id": author.id,
                "name": author.profile.name,
                "username": author.profile.username,
                "avatar": author.profile.avatar,
            },
        });
        self.store.set(feed_key, move |old| {
            let Some(CacheEntry::Paginated(mut paginated)) = old else {
                return None;
            };
            paginated.prepend_first(item);
            Some(CacheEntry::Paginated(paginated))
        });

        let result = self.api.post_json("/posts", json!({ "post": doc })).await;
        if let Err(err) = &result {
            log_mutation_error("create_post", err);
        }
        self.store.invalidate_all();
        Ok(())
    }

    /// Creates a comment under `post_id`.
    ///
    /// Comments carry no optimistic entry; the comment list simply refetches
    /// on settle.
    pub async fn create_comment(&self, post_id: i64, doc: &Value) -> AppResult<()> {
        validate_post_body(doc)?;
        let result = self
            .api
            .post_json(&format!("/posts/{post_id}/comments"), json!({ "post": doc }))
            .await;
        if let Err(err) = &result {
            log_mutation_error("create_comment", err);
        }
        self.store.invalidate_all();
        Ok(())
    }

    /// Deletes the post, then invalidates everything so feeds drop it.
    ///
    /// No optimistic removal; a failed delete leaves the caches untouched.
    pub async fn delete_post(&self, post_id: i64) -> AppResult<()> {
        match self.api.delete_json(&format!("/posts/{post_id}")).await {
            Ok(_) => self.store.invalidate_all(),
            Err(err) => log_mutation_error("delete_post", &err),
        }
        Ok(())
    }

    /// Toggles the like flag on `post_id` in the targeted view.
    ///
    /// The patch flips `isLiked` and moves `likes` by one in the matching
    /// direction without clamping; the server count wins on the settle
    /// refetch.
    pub async fn toggle_like(&self, post_id: i64, target: LikeTarget) -> AppResult<()> {
        match &target {
            LikeTarget::SinglePost { key } => {
                self.store.set(key, |old| {
                    let Some(CacheEntry::Simple(mut value)) = old else {
                        return None;
                    };
                    if value.get("id").and_then(Value::as_i64) == Some(post_id) {
                        toggle_like_fields(&mut value);
                    }
                    Some(CacheEntry::Simple(value))
                });
            }
            LikeTarget::PostPage { key, page_index } => {
                let index = *page_index;
                self.store.set(key, move |old| {
                    let Some(CacheEntry::Paginated(mut paginated)) = old else {
                        return None;
                    };
                    paginated.map_page_items(index, |item| {
                        if item.get("id").and_then(Value::as_i64) == Some(post_id) {
                            toggle_like_fields(item);
                        }
                    });
                    Some(CacheEntry::Paginated(paginated))
                });
            }
        }

        let result = self
            .api
            .post_json(&format!("/posts/{post_id}/likes"), Value::Null)
            .await;
        if let Err(err) = &result {
            log_mutation_error("toggle_like", err);
        }
        self.store.invalidate_all();
        Ok(())
    }
}

/// Flips `isLiked` and moves `likes` one step the matching way. The count
/// is not clamped at zero.
fn toggle_like_fields(item: &mut Value) {
    let liked = item.get("isLiked").and_then(Value::as_bool).unwrap_or(false);
    let likes = item.get("likes").and_then(Value::as_i64).unwrap_or(0);
    item["isLiked"] = Value::Bool(!liked);
    item["likes"] = Value::from(if liked { likes - 1 } else { likes + 1 });
}
