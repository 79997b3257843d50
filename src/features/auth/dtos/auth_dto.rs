use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::features::auth::clients::{AuthUser, Session};
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::validation::validate_passwords_match;

/// Request DTO for user registration
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_register_passwords"))]
pub struct RegisterRequestDto {
    pub email: String,
    pub password: String,
    /// Must equal `password`
    pub confirm_password: String,
    /// Also stored as the user's full name
    pub username: String,
    pub phone: Option<String>,
}

fn validate_register_passwords(dto: &RegisterRequestDto) -> Result<(), ValidationError> {
    validate_passwords_match(&dto.password, &dto.confirm_password)
}

/// Request DTO for user login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequestDto {
    pub email: String,
    pub password: String,
}

/// Request DTO for token refresh
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshTokenRequestDto {
    pub refresh_token: String,
}

/// Access/refresh token pair
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionTokensDto {
    /// JWT access token
    pub access_token: String,
    /// Token type (always "bearer")
    pub token_type: String,
    /// Token expiry time in seconds
    pub expires_in: i64,
    pub refresh_token: String,
}

/// User info included in auth responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthUserDto {
    pub id: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email_verified: bool,
}

/// Response DTO for login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponseDto {
    #[serde(flatten)]
    pub tokens: SessionTokensDto,
    pub user: AuthUserDto,
}

/// Response DTO for registration
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponseDto {
    pub user: AuthUserDto,
    /// True when the account must be confirmed by email before signing in
    pub email_verification_required: bool,
    /// Present when the account is usable right away
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionTokensDto>,
}

/// DTO for /auth/me response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponseDto {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: String,
    pub session_id: Option<String>,
}

impl From<AuthenticatedUser> for MeResponseDto {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email,
            role: user.role,
            session_id: user.session_id,
        }
    }
}

impl From<AuthUser> for AuthUserDto {
    fn from(user: AuthUser) -> Self {
        Self {
            username: user.metadata_str("username"),
            full_name: user.metadata_str("full_name"),
            email_verified: user.email_confirmed_at.is_some(),
            id: user.id,
            email: user.email,
            phone: user.phone.filter(|p| !p.is_empty()),
        }
    }
}

impl Session {
    /// Split into the token pair and the user
    pub fn into_parts(self) -> (SessionTokensDto, AuthUser) {
        (
            SessionTokensDto {
                access_token: self.access_token,
                token_type: self.token_type,
                expires_in: self.expires_in,
                refresh_token: self.refresh_token,
            },
            self.user,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_dto(password: &str, confirm: &str) -> RegisterRequestDto {
        RegisterRequestDto {
            email: "ada@example.com".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
            username: "ada".to_string(),
            phone: None,
        }
    }

    #[test]
    fn test_register_passwords_must_match() {
        assert!(register_dto("correct horse", "correct horse").validate().is_ok());
        assert!(register_dto("correct horse", "battery staple")
            .validate()
            .is_err());
    }

    #[test]
    fn test_auth_user_dto_reads_metadata() {
        let user: AuthUser = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "email": "ada@example.com",
            "phone": "",
            "email_confirmed_at": "2024-11-01T10:00:00Z",
            "user_metadata": { "username": "ada", "full_name": "ada", "phone": "+15550100" }
        }))
        .unwrap();

        let dto = AuthUserDto::from(user);
        assert_eq!(dto.username.as_deref(), Some("ada"));
        assert_eq!(dto.phone, None);
        assert!(dto.email_verified);
    }
}
