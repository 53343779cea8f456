use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::{AppError, AppResult};
use crate::external::client::build_client;
use crate::external::token::TokenStore;
use crate::models::{Cursor, Page};

/// JSON body the server returns on failure.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
}

/// Transport seam between the data layer and the REST API.
///
/// Paths are relative (`/posts/42/likes`) and resolved against the
/// configured base URL by the implementation.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// `GET` a JSON value.
    async fn get_json(&self, path: &str) -> AppResult<Value>;

    /// `GET` one page of a cursor-paginated collection. The cursor is
    /// appended as a `cursor=N` query parameter.
    async fn get_page(&self, path: &str, cursor: Cursor) -> AppResult<Page>;

    /// `POST` a JSON body (pass `Value::Null` for an empty body).
    async fn post_json(&self, path: &str, body: Value) -> AppResult<Value>;

    /// `PUT` a JSON body.
    async fn put_json(&self, path: &str, body: Value) -> AppResult<Value>;

    /// `DELETE`, returning whatever JSON the server responds with.
    async fn delete_json(&self, path: &str) -> AppResult<Value>;
}

/// Production transport speaking JSON over a reqwest client built from
/// `ApiConfig` (base URL, request and connect timeouts).
///
/// The bearer token is attached lazily before each call, mirroring the
/// original client's per-hook `setAuthToken` behavior; requests issued
/// while signed out simply carry no `Authorization` header.
#[derive(Clone)]
pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
    tokens: TokenStore,
}

impl HttpApi {
    pub fn new(config: &ApiConfig, tokens: TokenStore) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: build_client(config),
            tokens,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, self.url(path));
        if let Some(token) = self.tokens.current() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> AppResult<Value> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Failures carry a JSON body `{ error, message }`; fall back to the
        // status reason when the body is missing or malformed.
        let body: ApiErrorBody = response.json().await.unwrap_or_else(|_| ApiErrorBody {
            error: status.canonical_reason().unwrap_or("Unknown").to_string(),
            message: String::new(),
        });

        if status.as_u16() == 401 {
            return Err(AppError::Unauthorized {
                message: body.message,
            });
        }

        Err(AppError::Api {
            status: status.as_u16(),
            error: body.error,
            message: body.message,
        })
    }
}

/// Appends `cursor=N` to a path that may or may not already carry a query
/// string.
pub(crate) fn with_cursor(path: &str, cursor: Cursor) -> String {
    let sep = if path.contains('?') { '&' } else { '?' };
    format!("{path}{sep}cursor={cursor}")
}

#[async_trait]
impl ApiTransport for HttpApi {
    async fn get_json(&self, path: &str) -> AppResult<Value> {
        self.send(self.request(reqwest::Method::GET, path)).await
    }

    async fn get_page(&self, path: &str, cursor: Cursor) -> AppResult<Page> {
        let value = self
            .send(self.request(reqwest::Method::GET, &with_cursor(path, cursor)))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn post_json(&self, path: &str, body: Value) -> AppResult<Value> {
        let mut builder = self.request(reqwest::Method::POST, path);
        if !body.is_null() {
            builder = builder.json(&body);
        }
        self.send(builder).await
    }

    async fn put_json(&self, path: &str, body: Value) -> AppResult<Value> {
        self.send(self.request(reqwest::Method::PUT, path).json(&body))
            .await
    }

    async fn delete_json(&self, path: &str) -> AppResult<Value> {
        self.send(self.request(reqwest::Method::DELETE, path)).await
    }
}
