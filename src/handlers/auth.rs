use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    errors::ServiceError, models::user::UserProfile, ApiResponse, ApiResult, AppState,
};

/// Login request payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({"email": "admin@fleetflow.dev", "password": "admin1234"}))]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Token plus the public profile of the caller
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let (token, user) = state
        .user_service()
        .login(&payload.email, &payload.password)
        .await?;

    info!(email = %user.email, "user logged in");
    Ok(Json(ApiResponse::success(LoginResponse { token, user })))
}
