//! Wire types for the backend's auth endpoints

use serde::{Deserialize, Serialize};

/// Body for `POST /token/`
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body for `POST /register/`
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body for `POST /token/refresh/`
#[derive(Debug, Serialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Response from `POST /token/refresh/`
#[derive(Debug, Deserialize)]
pub struct AccessTokenResponse {
    pub access: String,
}

/// `{"detail": "..."}` error body used by the token endpoints
#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

/// Field-level error body returned by the registration endpoint
///
/// Each field maps to a list of messages; the first message of the first
/// populated field (username, then email, then password) is what gets
/// surfaced to the user.
#[derive(Debug, Default, Deserialize)]
pub struct RegistrationErrors {
    #[serde(default)]
    pub username: Vec<String>,
    #[serde(default)]
    pub email: Vec<String>,
    #[serde(default)]
    pub password: Vec<String>,
}

impl RegistrationErrors {
    /// First field error message, checked in username/email/password order
    pub fn first_message(&self) -> Option<&str> {
        self.username
            .first()
            .or_else(|| self.email.first())
            .or_else(|| self.password.first())
            .map(String::as_str)
    }
}
