use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers};
use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::features::queries::{dtos as queries_dtos, handlers as queries_handlers};
use crate::features::users::{dtos as users_dtos, handlers::profile_handler};
use crate::shared::tabular::ResultTable;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handlers::register,
        auth_handlers::login,
        auth_handlers::refresh_token,
        auth_handlers::logout,
        auth_handlers::get_me,
        // Users
        profile_handler::get_profile,
        // Files
        files_handlers::upload_file,
        files_handlers::list_files,
        files_handlers::get_file,
        files_handlers::get_preview,
        files_handlers::export_preview_csv,
        files_handlers::delete_file,
        // Queries
        queries_handlers::run_query,
    ),
    components(
        schemas(
            Meta,
            ResultTable,
            // Auth
            auth_dtos::RegisterRequestDto,
            auth_dtos::LoginRequestDto,
            auth_dtos::RefreshTokenRequestDto,
            auth_dtos::SessionTokensDto,
            auth_dtos::AuthUserDto,
            auth_dtos::AuthResponseDto,
            auth_dtos::RegisterResponseDto,
            auth_dtos::MeResponseDto,
            ApiResponse<auth_dtos::AuthResponseDto>,
            ApiResponse<auth_dtos::RegisterResponseDto>,
            ApiResponse<auth_dtos::SessionTokensDto>,
            ApiResponse<auth_dtos::MeResponseDto>,
            // Users
            users_dtos::UserProfileResponseDto,
            ApiResponse<users_dtos::UserProfileResponseDto>,
            // Files
            files_dtos::UploadFileDto,
            files_dtos::FileResponseDto,
            files_dtos::FileDetailResponseDto,
            files_dtos::DeleteFileResponseDto,
            ApiResponse<files_dtos::FileResponseDto>,
            ApiResponse<Vec<files_dtos::FileResponseDto>>,
            ApiResponse<files_dtos::FileDetailResponseDto>,
            ApiResponse<files_dtos::DeleteFileResponseDto>,
            ApiResponse<ResultTable>,
            // Queries
            queries_dtos::QueryRequestDto,
            queries_dtos::QueryResponseDto,
            queries_dtos::QueryErrorResponseDto,
        )
    ),
    tags(
        (name = "auth", description = "Sign-up, sign-in and session endpoints"),
        (name = "users", description = "Profile of the signed-in user"),
        (name = "files", description = "CSV upload, preview and management"),
        (name = "queries", description = "Natural-language questions about uploaded files"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "CSV Query API",
        version = "0.1.0",
        description = "Upload CSV files and ask questions about them in plain language",
    )
)]
pub struct ApiDoc;

/// Adds the Bearer JWT security scheme to the OpenAPI document
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
