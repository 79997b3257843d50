use crate::core::error::{AppError, Result};
use crate::features::auth::clients::{AuthClientError, AuthProvider};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::UserProfileResponseDto;
use std::sync::Arc;

pub struct UserProfileService {
    provider: Arc<dyn AuthProvider>,
}

impl UserProfileService {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    /// Fetch the caller's account using their own access token
    pub async fn get_profile(&self, user: &AuthenticatedUser) -> Result<UserProfileResponseDto> {
        let account = self
            .provider
            .get_user(&user.access_token)
            .await
            .map_err(|e| match e {
                AuthClientError::Rejected { message, .. } => AppError::Unauthorized(message),
                other => AppError::ExternalServiceError(other.to_string()),
            })?;

        Ok(UserProfileResponseDto::from(account))
    }
}
