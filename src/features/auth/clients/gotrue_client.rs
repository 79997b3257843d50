use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::core::config::AuthConfig;

/// User object as returned by the auth REST API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_metadata: Value,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

impl AuthUser {
    /// String field from `user_metadata`, if present and non-empty
    pub fn metadata_str(&self, key: &str) -> Option<String> {
        self.user_metadata
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: String,
    pub user: AuthUser,
}

/// Sign-up answers with a session when email confirmation is off, else with the bare user
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignUpOutcome {
    Session(Session),
    PendingConfirmation(AuthUser),
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    /// Stored by the auth service as `user_metadata`
    pub data: Value,
}

#[derive(Debug, Error)]
pub enum AuthClientError {
    #[error("Auth request failed: {0}")]
    Request(String),

    #[error("Auth service rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Failed to parse auth response: {0}")]
    Parse(String),
}

/// Operations delegated to the hosted auth service
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, request: SignUpRequest) -> Result<SignUpOutcome, AuthClientError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthClientError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthClientError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthClientError>;

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthClientError>;
}

/// Error bodies come in two shapes depending on the service version
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

/// Client for the GoTrue REST API (`/auth/v1`)
pub struct GoTrueClient {
    http_client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl GoTrueClient {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: config.issuer(),
            anon_key: config.anon_key.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, self.url(path))
            .header("apikey", &self.anon_key)
    }

    /// Turn a non-2xx response into `Rejected`, passing successes through
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, AuthClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or(body);

        tracing::debug!("Auth service error: HTTP {} - {}", status, message);
        Err(AuthClientError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        builder: reqwest::RequestBuilder,
    ) -> Result<T, AuthClientError> {
        let response = builder
            .send()
            .await
            .map_err(|e| AuthClientError::Request(e.to_string()))?;

        Self::check(response)
            .await?
            .json::<T>()
            .await
            .map_err(|e| AuthClientError::Parse(e.to_string()))
    }
}

#[async_trait]
impl AuthProvider for GoTrueClient {
    async fn sign_up(&self, request: SignUpRequest) -> Result<SignUpOutcome, AuthClientError> {
        tracing::debug!("Signing up user: {}", request.email);
        Self::send_json(
            self.request(reqwest::Method::POST, "/signup")
                .json(&request),
        )
        .await
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthClientError> {
        tracing::debug!("Password sign-in for: {}", email);
        Self::send_json(
            self.request(reqwest::Method::POST, "/token?grant_type=password")
                .json(&serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthClientError> {
        Self::send_json(
            self.request(reqwest::Method::POST, "/token?grant_type=refresh_token")
                .json(&serde_json::json!({ "refresh_token": refresh_token })),
        )
        .await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthClientError> {
        let response = self
            .request(reqwest::Method::POST, "/logout")
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthClientError::Request(e.to_string()))?;

        Self::check(response).await.map(|_| ())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthClientError> {
        Self::send_json(
            self.request(reqwest::Method::GET, "/user")
                .bearer_auth(access_token),
        )
        .await
    }
}
