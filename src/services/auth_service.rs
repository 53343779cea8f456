//! Account lifecycle: signup, login, sign-out and the form pre-checks.
//!
//! Unlike the other services these calls surface their errors: the forms
//! render field failures inline, so nothing here is fire-and-forget.

use std::sync::Arc;

use serde_json::{Value, json};
use validator::Validate;

use crate::cache::{QueryKey, QueryStore};
use crate::error::{AppError, AppResult};
use crate::external::{ApiTransport, TokenStore};
use crate::models::{AuthParams, AuthToken, Credentials};

#[derive(Clone)]
pub struct AuthService {
    store: Arc<QueryStore>,
    api: Arc<dyn ApiTransport>,
    tokens: TokenStore,
}

impl AuthService {
    pub fn new(store: Arc<QueryStore>, api: Arc<dyn ApiTransport>, tokens: TokenStore) -> Self {
        Self { store, api, tokens }
    }

    /// Registers a new account and stores the returned bearer token.
    /// `password2` is a local confirmation field and never leaves the
    /// client.
    pub async fn signup(&self, params: &AuthParams) -> AppResult<()> {
        params.validate()?;
        let body = json!({
            "name": params.name,
            "username": params.username,
            "email": params.email,
            "password": params.password,
        });
        let value = self.api.post_json("/users/register", body).await?;
        self.accept_token(value)
    }

    /// Exchanges credentials for a bearer token.
    pub async fn login(&self, credentials: &Credentials) -> AppResult<()> {
        credentials.validate()?;
        let value = self
            .api
            .post_json("/users/login", serde_json::to_value(credentials)?)
            .await?;
        self.accept_token(value)
    }

    /// Drops the cached authenticated user and the bearer token. Other
    /// cached entries stay; protected refetches fail with `Unauthorized`
    /// from then on.
    pub fn sign_out(&self) {
        self.store.remove(&QueryKey::auth());
        self.tokens.clear();
    }

    /// Asks the server whether `username` is still free.
    pub async fn check_username(&self, username: &str) -> AppResult<bool> {
        self.check("/profile/check-username", json!({ "username": username }))
            .await
    }

    /// Asks the server whether `email` is still free.
    pub async fn check_email(&self, email: &str) -> AppResult<bool> {
        self.check("/users/check-email", json!({ "email": email })).await
    }

    /// Asks the server whether a tag named `name` already exists.
    pub async fn check_tag(&self, name: &str) -> AppResult<bool> {
        self.check("/tags/check", json!({ "tag": name })).await
    }

    async fn check(&self, path: &str, body: Value) -> AppResult<bool> {
        let value = self.api.post_json(path, body).await?;
        value
            .get("res")
            .and_then(Value::as_bool)
            .ok_or_else(|| AppError::Internal {
                source: anyhow::anyhow!("malformed check response from {path}"),
            })
    }

    fn accept_token(&self, value: Value) -> AppResult<()> {
        let auth: AuthToken = serde_json::from_value(value)?;
        self.tokens.set(auth.token);
        Ok(())
    }
}
