use crate::core::error::{AppError, Result};
use crate::features::auth::clients::{AuthClientError, AuthProvider, SignUpOutcome, SignUpRequest};
use crate::features::auth::dtos::{
    AuthResponseDto, AuthUserDto, LoginRequestDto, MeResponseDto, RefreshTokenRequestDto,
    RegisterRequestDto, RegisterResponseDto, SessionTokensDto,
};
use crate::features::auth::model::AuthenticatedUser;
use std::sync::Arc;

/// Message the auth service uses for a wrong email/password pair
const INVALID_CREDENTIALS: &str = "Invalid login credentials";

/// Service for authentication operations (register, login, refresh, logout)
pub struct AuthService {
    provider: Arc<dyn AuthProvider>,
}

impl AuthService {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    /// Register a new user. The username doubles as the full name.
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<RegisterResponseDto> {
        let request = SignUpRequest {
            email: dto.email,
            password: dto.password,
            data: serde_json::json!({
                "username": dto.username,
                "full_name": dto.username,
                "phone": dto.phone,
            }),
        };

        let outcome = self.provider.sign_up(request).await.map_err(|e| match e {
            AuthClientError::Rejected { status, message } if status == 422 || status == 409 => {
                AppError::Conflict(message)
            }
            AuthClientError::Rejected { message, .. } => AppError::BadRequest(message),
            other => AppError::ExternalServiceError(other.to_string()),
        })?;

        let response = match outcome {
            SignUpOutcome::Session(session) => {
                let (tokens, user) = session.into_parts();
                RegisterResponseDto {
                    user: AuthUserDto::from(user),
                    email_verification_required: false,
                    session: Some(tokens),
                }
            }
            SignUpOutcome::PendingConfirmation(user) => RegisterResponseDto {
                user: AuthUserDto::from(user),
                email_verification_required: true,
                session: None,
            },
        };

        tracing::info!("Registered user {}", response.user.id);
        Ok(response)
    }

    /// Sign in with email and password
    pub async fn login(&self, dto: LoginRequestDto) -> Result<AuthResponseDto> {
        let session = self
            .provider
            .sign_in_with_password(&dto.email, &dto.password)
            .await
            .map_err(|e| match e {
                AuthClientError::Rejected { message, .. }
                    if message.contains(INVALID_CREDENTIALS) =>
                {
                    AppError::Unauthorized("Password incorrect. Please try again.".to_string())
                }
                AuthClientError::Rejected { message, .. } => {
                    tracing::debug!("Sign-in rejected: {}", message);
                    AppError::Forbidden(
                        "Please confirm your email verification and try again.".to_string(),
                    )
                }
                other => AppError::ExternalServiceError(other.to_string()),
            })?;

        let (tokens, user) = session.into_parts();
        Ok(AuthResponseDto {
            tokens,
            user: AuthUserDto::from(user),
        })
    }

    /// Exchange a refresh token for a new session
    pub async fn refresh_token(&self, dto: RefreshTokenRequestDto) -> Result<SessionTokensDto> {
        let session = self
            .provider
            .refresh_session(&dto.refresh_token)
            .await
            .map_err(|e| match e {
                AuthClientError::Rejected { .. } => {
                    AppError::Unauthorized("Invalid or expired refresh token".to_string())
                }
                other => AppError::ExternalServiceError(other.to_string()),
            })?;

        Ok(session.into_parts().0)
    }

    /// End the caller's session
    pub async fn logout(&self, user: &AuthenticatedUser) -> Result<()> {
        self.provider
            .sign_out(&user.access_token)
            .await
            .map_err(|e| match e {
                AuthClientError::Rejected { message, .. } => AppError::Unauthorized(message),
                other => AppError::ExternalServiceError(other.to_string()),
            })?;

        tracing::info!("User {} signed out", user.user_id);
        Ok(())
    }

    /// Identity of the caller as read from the token
    pub fn current_user(&self, user: AuthenticatedUser) -> MeResponseDto {
        MeResponseDto::from(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{create_test_user, FakeAuthProvider};

    fn register_dto() -> RegisterRequestDto {
        RegisterRequestDto {
            email: "ada@example.com".to_string(),
            password: "correct horse".to_string(),
            confirm_password: "correct horse".to_string(),
            username: "ada".to_string(),
            phone: Some("+15550100".to_string()),
        }
    }

    fn login_dto(password: &str) -> LoginRequestDto {
        LoginRequestDto {
            email: "ada@example.com".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_sends_username_as_full_name() {
        let provider = Arc::new(FakeAuthProvider::new());
        let service = AuthService::new(provider.clone());

        let response = service.register(register_dto()).await.unwrap();
        assert!(response.session.is_some());
        assert!(!response.email_verification_required);

        let sign_ups = provider.sign_ups();
        assert_eq!(sign_ups.len(), 1);
        assert_eq!(sign_ups[0].data["username"], "ada");
        assert_eq!(sign_ups[0].data["full_name"], "ada");
        assert_eq!(sign_ups[0].data["phone"], "+15550100");
    }

    #[tokio::test]
    async fn test_register_pending_confirmation() {
        let service = AuthService::new(Arc::new(FakeAuthProvider::new().requiring_confirmation()));

        let response = service.register(register_dto()).await.unwrap();
        assert!(response.email_verification_required);
        assert!(response.session.is_none());
        assert_eq!(response.user.username.as_deref(), Some("ada"));
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let service = AuthService::new(Arc::new(FakeAuthProvider::new()));

        let err = service.login(login_dto("wrong")).await.unwrap_err();
        match err {
            AppError::Unauthorized(msg) => assert_eq!(msg, "Password incorrect. Please try again."),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_login_credentials_message_with_extra_wording() {
        let provider =
            FakeAuthProvider::new().rejecting_sign_in("Invalid login credentials (attempt 3 of 5)");
        let service = AuthService::new(Arc::new(provider));

        let err = service
            .login(login_dto(FakeAuthProvider::PASSWORD))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_login_with_unconfirmed_email() {
        let service = AuthService::new(Arc::new(FakeAuthProvider::new().requiring_confirmation()));

        let err = service
            .login(login_dto(FakeAuthProvider::PASSWORD))
            .await
            .unwrap_err();
        match err {
            AppError::Forbidden(msg) => assert_eq!(
                msg,
                "Please confirm your email verification and try again."
            ),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_login_success_returns_tokens() {
        let service = AuthService::new(Arc::new(FakeAuthProvider::new()));

        let response = service
            .login(login_dto(FakeAuthProvider::PASSWORD))
            .await
            .unwrap();
        assert_eq!(response.tokens.access_token, FakeAuthProvider::ACCESS_TOKEN);
        assert_eq!(response.user.email.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn test_refresh_with_unknown_token() {
        let service = AuthService::new(Arc::new(FakeAuthProvider::new()));

        let err = service
            .refresh_token(RefreshTokenRequestDto {
                refresh_token: "stale".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_logout_forwards_access_token() {
        let provider = Arc::new(FakeAuthProvider::new());
        let service = AuthService::new(provider.clone());

        service.logout(&create_test_user()).await.unwrap();
        assert_eq!(provider.sign_outs(), vec![FakeAuthProvider::ACCESS_TOKEN.to_string()]);
    }
}
