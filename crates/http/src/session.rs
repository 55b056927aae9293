//! Session store: credential state and the token endpoints
//!
//! Owns the two token slots exclusively; no other component writes them.
//! Created on login, access token replaced on refresh, cleared on logout or
//! refresh failure.

use crate::client::TaskClient;
use crate::error::ClientError;
use crate::types::{
    AccessTokenResponse, ErrorDetail, LoginRequest, RefreshRequest, RegisterRequest,
    RegistrationErrors,
};
use reqwest::Method;
use std::sync::Arc;
use taskpad_core::{TokenPair, TokenStore};

/// Persisted credential state plus the token-issuance endpoints
#[derive(Clone)]
pub struct SessionStore {
    client: TaskClient,
    store: Arc<dyn TokenStore>,
}

impl SessionStore {
    /// Create a session store over a token storage backend
    pub fn new(client: TaskClient, store: Arc<dyn TokenStore>) -> Self {
        Self { client, store }
    }

    /// Handle to the underlying token storage
    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.store)
    }

    /// Exchange credentials for a token pair and persist it
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ClientError> {
        let response = self
            .client
            .request(Method::POST, "/token/")
            .json(&LoginRequest {
                username: username.to_owned(),
                password: password.to_owned(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // The token endpoint reports rejected credentials as {"detail": ...}.
            let message = serde_json::from_str::<ErrorDetail>(&body)
                .map(|e| e.detail)
                .unwrap_or_else(|_| if body.is_empty() { status.to_string() } else { body });
            return Err(ClientError::AuthenticationFailed(message));
        }

        let pair: TokenPair = response.json().await?;
        self.store.set_pair(&pair.access, &pair.refresh);
        Ok(pair)
    }

    /// Create an account; establishes no session
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ClientError> {
        let response = self
            .client
            .request(Method::POST, "/register/")
            .json(&RegisterRequest {
                username: username.to_owned(),
                email: email.to_owned(),
                password: password.to_owned(),
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if let Ok(errors) = serde_json::from_str::<RegistrationErrors>(&body) {
            if let Some(message) = errors.first_message() {
                return Err(ClientError::Validation(message.to_owned()));
            }
        }
        Err(ClientError::from_status(status, body))
    }

    /// Try to obtain a fresh access token
    ///
    /// Returns `None` without a network call when no refresh token is held.
    /// On any failure the whole session is cleared and `None` is returned;
    /// this method never errors, because its caller (the gateway) must treat
    /// an absent result as "give up", not as something to recover from.
    pub async fn refresh(&self) -> Option<String> {
        let refresh = self.store.refresh_token()?;
        match self.request_access(&refresh).await {
            Ok(access) => {
                self.store.set_access(&access);
                Some(access)
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed, clearing session");
                self.store.clear();
                None
            }
        }
    }

    async fn request_access(&self, refresh: &str) -> Result<String, ClientError> {
        let response = self
            .client
            .request(Method::POST, "/token/refresh/")
            .json(&RefreshRequest {
                refresh: refresh.to_owned(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            return Err(ClientError::from_status(status, message));
        }

        let token: AccessTokenResponse = response.json().await?;
        Ok(token.access)
    }

    /// Drop both tokens; idempotent, no network call
    pub fn logout(&self) {
        self.store.clear();
    }

    /// Whether an access token is currently held
    pub fn is_authenticated(&self) -> bool {
        self.store.access_token().is_some()
    }

    /// Current access token, if any
    pub fn access_token(&self) -> Option<String> {
        self.store.access_token()
    }
}
