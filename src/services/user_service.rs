//! User mutations: follow/unfollow and profile edits.

use std::sync::Arc;

use serde_json::{Value, json};
use validator::Validate;

use crate::cache::{CacheEntry, QueryKey, QueryStore};
use crate::error::AppResult;
use crate::external::ApiTransport;
use crate::models::ProfileUpdate;
use crate::services::log_mutation_error;

/// Names the cached shape an optimistic follow patch applies to.
///
/// A user appears in four distinct cache shapes and each needs a different
/// patch path, so the caller states the shape explicitly instead of the
/// service probing the entry.
#[derive(Debug, Clone)]
pub enum FollowTarget {
    /// A simple entry holding one user or profile object.
    SingleUser { key: QueryKey },
    /// A simple entry holding a flat list of users (the follow widgets).
    UserListEntry { key: QueryKey },
    /// One page of a paginated user list (followers/following).
    PaginatedUserPage { key: QueryKey, page_index: usize },
    /// The author object embedded in a cached post. `page_index` is `None`
    /// for a simple post-detail entry.
    EmbeddedPostAuthor {
        key: QueryKey,
        post_id: i64,
        page_index: Option<usize>,
    },
}

impl FollowTarget {
    fn key(&self) -> &QueryKey {
        match self {
            Self::SingleUser { key }
            | Self::UserListEntry { key }
            | Self::PaginatedUserPage { key, .. }
            | Self::EmbeddedPostAuthor { key, .. } => key,
        }
    }
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<QueryStore>,
    api: Arc<dyn ApiTransport>,
}

impl UserService {
    pub fn new(store: Arc<QueryStore>, api: Arc<dyn ApiTransport>) -> Self {
        Self { store, api }
    }

    /// Follows or unfollows `user_id`, patching the targeted cache shape.
    ///
    /// `following` is the state *before* the click; the request and the
    /// optimistic flip both move to its negation. Only the targeted key is
    /// invalidated on settle, so unrelated views holding the same user keep
    /// their stale flag until they are invalidated for another reason.
    pub async fn follow_user(
        &self,
        user_id: i64,
        following: bool,
        target: FollowTarget,
    ) -> AppResult<()> {
        let next = !following;
        match &target {
            FollowTarget::SingleUser { key } => {
                self.store.set(key, |old| {
                    let Some(CacheEntry::Simple(mut value)) = old else {
                        return None;
                    };
                    value["isFollowing"] = Value::Bool(next);
                    Some(CacheEntry::Simple(value))
                });
            }
            FollowTarget::UserListEntry { key } => {
                self.store.set(key, |old| {
                    let Some(CacheEntry::Simple(mut value)) = old else {
                        return None;
                    };
                    if let Some(items) = value.as_array_mut() {
                        for item in items {
                            if item.get("id").and_then(Value::as_i64) == Some(user_id) {
                                item["isFollowing"] = Value::Bool(next);
                            }
                        }
                    }
                    Some(CacheEntry::Simple(value))
                });
            }
            FollowTarget::PaginatedUserPage { key, page_index } => {
                let index = *page_index;
                self.store.set(key, move |old| {
                    let Some(CacheEntry::Paginated(mut paginated)) = old else {
                        return None;
                    };
                    paginated.map_page_items(index, |item| {
                        if item.get("id").and_then(Value::as_i64) == Some(user_id) {
                            item["isFollowing"] = Value::Bool(next);
                        }
                    });
                    Some(CacheEntry::Paginated(paginated))
                });
            }
            FollowTarget::EmbeddedPostAuthor {
                key,
                post_id,
                page_index,
            } => {
                let post_id = *post_id;
                match page_index {
                    Some(index) => {
                        let index = *index;
                        self.store.set(key, move |old| {
                            let Some(CacheEntry::Paginated(mut paginated)) = old else {
                                return None;
                            };
                            paginated.map_page_items(index, |item| {
                                if item.get("id").and_then(Value::as_i64) == Some(post_id) {
                                    patch_author(item, next);
                                }
                            });
                            Some(CacheEntry::Paginated(paginated))
                        });
                    }
                    None => {
                        self.store.set(key, |old| {
                            let Some(CacheEntry::Simple(mut value)) = old else {
                                return None;
                            };
                            if value.get("id").and_then(Value::as_i64) == Some(post_id) {
                                patch_author(&mut value, next);
                            }
                            Some(CacheEntry::Simple(value))
                        });
                    }
                }
            }
        }

        let action = if following { "unfollow" } else { "follow" };
        let result = self
            .api
            .post_json(&format!("/users/{user_id}/{action}"), Value::Null)
            .await;
        if let Err(err) = &result {
            log_mutation_error("follow_user", err);
        }
        self.store.invalidate(target.key());
        Ok(())
    }

    /// Saves profile edits, merging the new field values into the cached
    /// profile entry first. The profile entry is not invalidated on settle;
    /// the merged fields are already what the server persisted.
    pub async fn update_profile(&self, values: &ProfileUpdate, key: &QueryKey) -> AppResult<()> {
        values.validate()?;
        let patch = json!({
            "name": values.name,
            "username": values.username,
            "bio": values.bio,
            "dob": values.dob,
            "avatar": values.avatar,
        });
        self.store.set(key, move |old| {
            let Some(CacheEntry::Simple(mut value)) = old else {
                return None;
            };
            if let (Some(obj), Some(fields)) = (value.as_object_mut(), patch.as_object()) {
                for (name, field) in fields {
                    obj.insert(name.clone(), field.clone());
                }
            }
            Some(CacheEntry::Simple(value))
        });

        let result = self
            .api
            .put_json("/profile", serde_json::to_value(values)?)
            .await;
        if let Err(err) = &result {
            log_mutation_error("update_profile", err);
        }
        Ok(())
    }
}

fn patch_author(post: &mut Value, next: bool) {
    if let Some(author) = post.get_mut("author") {
        author["isFollowing"] = Value::Bool(next);
    }
}
