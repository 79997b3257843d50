//! Shared fixtures for handler and service tests: a signed-in test user plus
//! in-memory stand-ins for the database, object storage, the text model and
//! the auth service.

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response, Router};
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use jsonwebtoken::{encode, EncodingKey, Header};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

use crate::core::config::AuthConfig;
use crate::features::auth::clients::{
    AuthClientError, AuthProvider, AuthUser, Session, SignUpOutcome, SignUpRequest,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::models::{FileRecord, NewFileRecord};
use crate::features::files::FileRepository;
use crate::features::queries::models::NewQueryLog;
use crate::features::queries::QueryLogRepository;
use crate::modules::llm::{ModelError, TextModel};
use crate::modules::storage::{ObjectStore, StorageError};

pub const TEST_USER_ID: &str = "6f1c2a7e-3b4d-4e5f-8a9b-0c1d2e3f4a5b";

const TEST_JWT_SECRET: &str = "test-jwt-secret-with-at-least-32-bytes";

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        project_url: "https://demo.supabase.co".to_string(),
        anon_key: "test-anon-key".to_string(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        audience: "authenticated".to_string(),
        jwt_leeway: Duration::from_secs(0),
    }
}

/// HS256-sign arbitrary claims with the test secret
pub fn sign_test_token(claims: &serde_json::Value) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn create_test_user() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: Uuid::parse_str(TEST_USER_ID).unwrap(),
        email: Some(SafeEmail().fake()),
        role: "authenticated".to_string(),
        session_id: Some("test-session-id".to_string()),
        access_token: FakeAuthProvider::ACCESS_TOKEN.to_string(),
    }
}

async fn inject_test_user_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_test_user());
    next.run(request).await
}

/// Run every request as [`create_test_user`]
pub fn with_test_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_test_user_middleware))
}

fn unavailable() -> sqlx::Error {
    sqlx::Error::PoolTimedOut
}

#[derive(Default)]
pub struct InMemoryFileRepository {
    records: Mutex<Vec<FileRecord>>,
    fail_writes: bool,
}

impl InMemoryFileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every insert fails
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<FileRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileRepository for InMemoryFileRepository {
    async fn insert(&self, record: NewFileRecord) -> Result<FileRecord, sqlx::Error> {
        if self.fail_writes {
            return Err(unavailable());
        }
        let record = record.into_record();
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<FileRecord>, sqlx::Error> {
        let mut files: Vec<FileRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        files.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(files)
    }

    async fn find_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<FileRecord>, sqlx::Error> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.id == id && f.user_id == user_id)
            .cloned())
    }

    async fn delete_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<FileRecord>, sqlx::Error> {
        let mut records = self.records.lock().unwrap();
        let position = records
            .iter()
            .position(|f| f.id == id && f.user_id == user_id);
        Ok(position.map(|i| records.remove(i)))
    }
}

#[derive(Default)]
pub struct InMemoryQueryLogRepository {
    entries: Mutex<Vec<NewQueryLog>>,
    fail_writes: bool,
}

impl InMemoryQueryLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn entries(&self) -> Vec<NewQueryLog> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryLogRepository for InMemoryQueryLogRepository {
    async fn insert(&self, entry: NewQueryLog) -> Result<(), sqlx::Error> {
        if self.fail_writes {
            return Err(unavailable());
        }
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_uploads: bool,
    fail_deletes: AtomicBool,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every upload fails
    pub fn failing() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    /// Make subsequent deletes fail
    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        if self.fail_uploads {
            return Err(StorageError::Status {
                key: key.to_string(),
                status: 503,
            });
        }
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Request {
                key: key.to_string(),
                message: "connection reset".to_string(),
            });
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Text model with a canned answer, remembering the last prompt
pub struct FakeTextModel {
    answer: Result<String, String>,
    last_prompt: Mutex<Option<String>>,
}

impl FakeTextModel {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Ok(answer.to_string()),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            answer: Err(message.to_string()),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextModel for FakeTextModel {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        self.answer.clone().map_err(|message| ModelError::Http {
            status: 429,
            message,
        })
    }
}

/// Auth service stand-in with one known account
#[derive(Default)]
pub struct FakeAuthProvider {
    requires_confirmation: bool,
    sign_in_rejection: Option<String>,
    sign_ups: Mutex<Vec<SignUpRequest>>,
    sign_outs: Mutex<Vec<String>>,
}

impl FakeAuthProvider {
    pub const PASSWORD: &'static str = "correct horse";
    pub const ACCESS_TOKEN: &'static str = "test-access-token";
    pub const REFRESH_TOKEN: &'static str = "test-refresh-token";

    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts stay unconfirmed: sign-up returns no session and sign-in is refused
    pub fn requiring_confirmation(mut self) -> Self {
        self.requires_confirmation = true;
        self
    }

    /// Every sign-in is rejected with `message`
    pub fn rejecting_sign_in(mut self, message: &str) -> Self {
        self.sign_in_rejection = Some(message.to_string());
        self
    }

    pub fn sign_ups(&self) -> Vec<SignUpRequest> {
        self.sign_ups.lock().unwrap().clone()
    }

    pub fn sign_outs(&self) -> Vec<String> {
        self.sign_outs.lock().unwrap().clone()
    }

    fn user(&self) -> AuthUser {
        AuthUser {
            id: TEST_USER_ID.to_string(),
            email: Some("ada@example.com".to_string()),
            phone: Some(String::new()),
            email_confirmed_at: (!self.requires_confirmation).then(chrono::Utc::now),
            user_metadata: serde_json::json!({
                "username": "ada",
                "full_name": "ada",
                "phone": "+15550100",
            }),
            created_at: Some(chrono::Utc::now()),
            last_sign_in_at: None,
        }
    }

    fn session(&self) -> Session {
        Session {
            access_token: Self::ACCESS_TOKEN.to_string(),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            refresh_token: Self::REFRESH_TOKEN.to_string(),
            user: self.user(),
        }
    }

    fn rejected(status: u16, message: &str) -> AuthClientError {
        AuthClientError::Rejected {
            status,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl AuthProvider for FakeAuthProvider {
    async fn sign_up(&self, request: SignUpRequest) -> Result<SignUpOutcome, AuthClientError> {
        self.sign_ups.lock().unwrap().push(request);
        if self.requires_confirmation {
            Ok(SignUpOutcome::PendingConfirmation(self.user()))
        } else {
            Ok(SignUpOutcome::Session(self.session()))
        }
    }

    async fn sign_in_with_password(
        &self,
        _email: &str,
        password: &str,
    ) -> Result<Session, AuthClientError> {
        if let Some(message) = &self.sign_in_rejection {
            return Err(Self::rejected(400, message));
        }
        if password != Self::PASSWORD {
            return Err(Self::rejected(400, "Invalid login credentials"));
        }
        if self.requires_confirmation {
            return Err(Self::rejected(400, "Email not confirmed"));
        }
        Ok(self.session())
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthClientError> {
        if refresh_token != Self::REFRESH_TOKEN {
            return Err(Self::rejected(400, "Invalid Refresh Token: Refresh Token Not Found"));
        }
        Ok(self.session())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthClientError> {
        self.sign_outs
            .lock()
            .unwrap()
            .push(access_token.to_string());
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthClientError> {
        if access_token != Self::ACCESS_TOKEN {
            return Err(Self::rejected(401, "invalid JWT: unable to parse or verify signature"));
        }
        Ok(self.user())
    }
}
