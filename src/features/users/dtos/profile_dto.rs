use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::auth::clients::AuthUser;

/// Account details plus the metadata captured at sign-up
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfileResponseDto {
    pub id: String,
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub email_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

impl From<AuthUser> for UserProfileResponseDto {
    fn from(user: AuthUser) -> Self {
        // Phone is collected as metadata, the account-level phone is usually empty
        let phone = user
            .metadata_str("phone")
            .or_else(|| user.phone.clone().filter(|p| !p.is_empty()));

        Self {
            username: user.metadata_str("username"),
            full_name: user.metadata_str("full_name"),
            phone,
            email_verified: user.email_confirmed_at.is_some(),
            created_at: user.created_at,
            last_sign_in_at: user.last_sign_in_at,
            id: user.id,
            email: user.email,
        }
    }
}
