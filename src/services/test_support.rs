//! Canned transport and fixture builders shared by service and repository
//! tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::{AppError, AppResult};
use crate::external::ApiTransport;
use crate::models::{Cursor, Page};

/// In-memory [`ApiTransport`] with canned responses and call recording.
#[derive(Clone, Default)]
pub(crate) struct MockApi {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    values: Mutex<HashMap<String, Value>>,
    pages: Mutex<HashMap<(String, Cursor), Page>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<(String, String, Value)>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the JSON returned for `get_json` on `path`.
    pub fn push_value(&self, path: &str, value: Value) {
        self.inner
            .values
            .lock()
            .unwrap()
            .insert(path.to_string(), value);
    }

    /// Registers the first page (cursor 0) returned for `get_page` on `path`.
    pub fn push_page(&self, path: &str, data: Vec<Value>, next_cursor: Option<Cursor>) {
        self.push_page_at(path, 0, data, next_cursor);
    }

    /// Registers the page returned for `get_page` on `path` at `cursor`.
    pub fn push_page_at(
        &self,
        path: &str,
        cursor: Cursor,
        data: Vec<Value>,
        next_cursor: Option<Cursor>,
    ) {
        self.inner
            .pages
            .lock()
            .unwrap()
            .insert((path.to_string(), cursor), Page { data, next_cursor });
    }

    /// Makes every subsequent call on `path` fail with a server error.
    pub fn fail_path(&self, path: &str) {
        self.inner.failing.lock().unwrap().insert(path.to_string());
    }

    /// All recorded calls as `(method, path, body)` triples.
    pub fn calls(&self) -> Vec<(String, String, Value)> {
        self.inner.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls with the given method and exact path.
    pub fn count_for(&self, method: &str, path: &str) -> usize {
        self.inner
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, p, _)| m == method && p == path)
            .count()
    }

    /// Number of plain `get_json` calls on `path`.
    pub fn get_count(&self, path: &str) -> usize {
        self.count_for("GET", path)
    }

    /// Number of `get_page` calls on `path`, across all cursors.
    pub fn page_count(&self, path: &str) -> usize {
        let prefix = format!("{path}::cursor=");
        self.inner
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, p, _)| m == "GET" && p.starts_with(&prefix))
            .count()
    }

    fn record(&self, method: &str, path: &str, body: Value) {
        self.inner
            .calls
            .lock()
            .unwrap()
            .push((method.to_string(), path.to_string(), body));
    }

    fn check_failure(&self, path: &str) -> AppResult<()> {
        if self.inner.failing.lock().unwrap().contains(path) {
            return Err(AppError::Api {
                status: 500,
                error: "Internal Server Error".to_string(),
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn not_found(path: &str) -> AppError {
        AppError::Api {
            status: 404,
            error: "Not Found".to_string(),
            message: format!("no canned response for {path}"),
        }
    }
}

#[async_trait]
impl ApiTransport for MockApi {
    async fn get_json(&self, path: &str) -> AppResult<Value> {
        self.record("GET", path, Value::Null);
        self.check_failure(path)?;
        self.inner
            .values
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| Self::not_found(path))
    }

    async fn get_page(&self, path: &str, cursor: Cursor) -> AppResult<Page> {
        self.record("GET", &format!("{path}::cursor={cursor}"), Value::Null);
        self.check_failure(path)?;
        self.inner
            .pages
            .lock()
            .unwrap()
            .get(&(path.to_string(), cursor))
            .cloned()
            .ok_or_else(|| Self::not_found(path))
    }

    async fn post_json(&self, path: &str, body: Value) -> AppResult<Value> {
        self.record("POST", path, body);
        self.check_failure(path)?;
        Ok(self
            .inner
            .values
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(|| json!({})))
    }

    async fn put_json(&self, path: &str, body: Value) -> AppResult<Value> {
        self.record("PUT", path, body);
        self.check_failure(path)?;
        Ok(self
            .inner
            .values
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(|| json!({})))
    }

    async fn delete_json(&self, path: &str) -> AppResult<Value> {
        self.record("DELETE", path, Value::Null);
        self.check_failure(path)?;
        Ok(json!({}))
    }
}

/// A full post payload as the server would return it.
pub(crate) fn post_value(id: i64, likes: i64, is_liked: bool) -> Value {
    json!({
        "id": id,
        "body": format!("post {id}"),
        "created_on": "4 Mar",
        "likes": likes,
        "isLiked": is_liked,
        "comments": 0,
        "tags": [],
        "parent": null,
        "author": {
            "id": 99,
            "name": "Some Author",
            "username": "author",
            "avatar": null,
            "isFollowing": false,
        },
    })
}

/// A chat message payload as the server would return it.
pub(crate) fn message_value(id: i64, body: &str, author_id: i64) -> Value {
    json!({
        "id": id,
        "body": body,
        "author_id": author_id,
        "isRead": true,
        "created_on": "Mar 4, 2026, 2:05 PM",
    })
}

/// An authenticated user payload as `/auth/user` would return it.
pub(crate) fn auth_user_value(id: i64, username: &str) -> Value {
    json!({
        "id": id,
        "email": format!("{username}@example.com"),
        "profile": {
            "id": id,
            "name": username,
            "username": username,
            "avatar": null,
            "bio": null,
            "dob": null,
        },
    })
}
