use std::sync::Arc;
use std::time::Duration;

use axum::{extract::{rejection::JsonRejection, State}, Json};
use service::auth::domain::{LoginInput, RegisterInput, TokenOutput};
use service::auth::AuthService;
use service::RequestContext;
use tracing::debug;

use crate::errors::ApiError;
use crate::validation;

#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<AuthService>,
    /// Deadline given to each request's `RequestContext`.
    pub request_timeout: Duration,
}

impl ServerState {
    fn request_context(&self) -> RequestContext {
        RequestContext::with_timeout(self.request_timeout)
    }
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged in", body = crate::openapi::TokenResponse), (status = 400, description = "Bad Request", body = crate::openapi::ErrorResponse), (status = 401, description = "Email and password don't match", body = crate::openapi::ErrorResponse), (status = 500, description = "Internal Server Error", body = crate::openapi::ErrorResponse)))]
pub async fn login(
    State(state): State<ServerState>,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> Result<Json<TokenOutput>, ApiError> {
    debug!("handle login request");
    let Json(input) = payload.map_err(|_| ApiError::malformed_body())?;
    validation::validate_login(&input)?;

    let ctx = state.request_context();
    let out = state.auth.login(&ctx, input).await?;
    Ok(Json(out))
}

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 200, description = "Registered", body = crate::openapi::TokenResponse), (status = 400, description = "Bad Request", body = crate::openapi::ErrorResponse), (status = 500, description = "Internal Server Error", body = crate::openapi::ErrorResponse)))]
pub async fn register(
    State(state): State<ServerState>,
    payload: Result<Json<RegisterInput>, JsonRejection>,
) -> Result<Json<TokenOutput>, ApiError> {
    debug!("handle register request");
    let Json(input) = payload.map_err(|_| ApiError::malformed_body())?;
    validation::validate_register(&input)?;

    let ctx = state.request_context();
    let out = state.auth.register(&ctx, input).await?;
    Ok(Json(out))
}
