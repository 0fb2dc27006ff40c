use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct LoginRequest {
    /// example: john@provider.net
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct RegisterRequest {
    /// at least 5 characters
    pub username: String,
    pub email: String,
    /// at least 5 characters
    pub password: String,
    #[serde(rename = "repeatPassword")]
    pub repeat_password: String,
}

#[derive(ToSchema)]
pub struct TokenResponse { pub token: String }

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    /// Per-field messages for validation failures
    #[schema(value_type = Option<Object>)]
    pub more: Option<serde_json::Value>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::login,
        crate::routes::auth::register,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequest,
            RegisterRequest,
            TokenResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth")
    )
)]
pub struct ApiDoc;
