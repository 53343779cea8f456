//! Tag mutations: follow toggles and tag creation.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::cache::{CacheEntry, QueryKey, QueryStore};
use crate::error::AppResult;
use crate::external::ApiTransport;
use crate::services::log_mutation_error;
use crate::utils::time::temp_id;
use crate::utils::validate::validate_tag_name;

#[derive(Clone)]
pub struct TagService {
    store: Arc<QueryStore>,
    api: Arc<dyn ApiTransport>,
}

impl TagService {
    pub fn new(store: Arc<QueryStore>, api: Arc<dyn ApiTransport>) -> Self {
        Self { store, api }
    }

    /// Toggles the follow flag on `tag_id` inside one page of a paginated
    /// tag list, then invalidates everything so tag-filtered feeds refetch.
    pub async fn follow_tag(
        &self,
        tag_id: i64,
        key: &QueryKey,
        page_index: usize,
    ) -> AppResult<()> {
        self.store.set(key, move |old| {
            let Some(CacheEntry::Paginated(mut paginated)) = old else {
                return None;
            };
            paginated.map_page_items(page_index, |item| {
                if item.get("id").and_then(Value::as_i64) == Some(tag_id) {
                    let following = item
                        .get("isFollowing")
                        .and_then(Value::as_bool)
                        .unwrap_or(false);
                    item["isFollowing"] = Value::Bool(!following);
                }
            });
            Some(CacheEntry::Paginated(paginated))
        });

        let result = self
            .api
            .post_json(&format!("/tags/{tag_id}/follow"), Value::Null)
            .await;
        if let Err(err) = &result {
            log_mutation_error("follow_tag", err);
        }
        self.store.invalidate_all();
        Ok(())
    }

    /// Creates a tag, prepending a synthesized `{id, name}` row to the
    /// cached tag list. Only the tag-list key settles; other views do not
    /// reference a tag until it has posts.
    pub async fn add_tag(&self, name: &str) -> AppResult<()> {
        validate_tag_name(name)?;
        let key = QueryKey::all_tags();
        let item = json!({ "id": temp_id(), "name": name });
        self.store.set(&key, move |old| {
            let Some(CacheEntry::Simple(Value::Array(mut items))) = old else {
                return None;
            };
            items.insert(0, item);
            Some(CacheEntry::Simple(Value::Array(items)))
        });

        let result = self.api.post_json("/tags", json!({ "name": name })).await;
        if let Err(err) = &result {
            log_mutation_error("add_tag", err);
        }
        self.store.invalidate(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Paginated;
    use crate::models::Page;
    use crate::services::test_support::MockApi;

    fn tag_value(id: i64, name: &str, is_following: bool) -> Value {
        json!({ "id": id, "name": name, "isFollowing": is_following, "posts": 3 })
    }

    #[tokio::test]
    async fn test_follow_tag_flips_flag_by_id() {
        let key = QueryKey::tag_to_follow();
        let store = QueryStore::new();
        store.set(&key, |_| {
            Some(CacheEntry::Paginated(Paginated::first(Page::new(
                vec![tag_value(1, "rust", false), tag_value(2, "news", true)],
                None,
            ))))
        });
        let api = MockApi::new();
        let service = TagService::new(store.clone(), Arc::new(api.clone()));

        service.follow_tag(2, &key, 0).await.unwrap();

        let pages = store.pages(&key).unwrap();
        assert_eq!(pages[0].data[0]["isFollowing"], Value::Bool(false));
        assert_eq!(pages[0].data[1]["isFollowing"], Value::Bool(false));
        assert_eq!(api.count_for("POST", "/tags/2/follow"), 1);
    }

    #[tokio::test]
    async fn test_add_tag_prepends_and_settles_tag_list_only() {
        let list_key = QueryKey::all_tags();
        let other_key = QueryKey::home_feed();
        let store = QueryStore::new();
        store.set(&list_key, |_| {
            Some(CacheEntry::Simple(json!([tag_value(1, "rust", false)])))
        });
        store.set(&other_key, |_| {
            Some(CacheEntry::Paginated(Paginated::first(Page::new(vec![], None))))
        });
        let api = MockApi::new();
        let service = TagService::new(store.clone(), Arc::new(api.clone()));

        service.add_tag("newtag").await.unwrap();

        let entry = store.get(&list_key).unwrap();
        let items = entry.as_simple().unwrap().as_array().unwrap().clone();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["name"], Value::from("newtag"));
        assert_eq!(api.count_for("POST", "/tags"), 1);
        assert!(store.is_stale(&list_key));
        assert!(!store.is_stale(&other_key));
    }

    #[tokio::test]
    async fn test_add_tag_rejects_bad_name() {
        let store = QueryStore::new();
        let api = MockApi::new();
        let service = TagService::new(store, Arc::new(api.clone()));

        assert!(service.add_tag("x").await.is_err());
        assert!(service.add_tag("has space").await.is_err());
        assert!(api.calls().is_empty());
    }
}
