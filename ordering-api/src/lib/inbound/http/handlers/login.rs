use auth::IssuedToken;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::credentials::models::LoginCommand;
use crate::credentials::models::UserRecord;
use crate::credentials::ports::LoginServicePort;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    if body.username.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::UnprocessableEntity(
            "Username and password are required".to_string(),
        ));
    }

    let command = LoginCommand::new(&body.username, body.password);
    let outcome = state
        .login_service
        .login(command, Utc::now())
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        LoginResponseData::new(&outcome.user, outcome.token),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    username: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    pub user: UserData,
}

impl LoginResponseData {
    fn new(user: &UserRecord, token: IssuedToken) -> Self {
        Self {
            token: token.access_token,
            token_type: token.token_type,
            expires_at: token.expires_at,
            user: user.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: String,
    pub username: String,
    pub roles: Vec<String>,
}

impl From<&UserRecord> for UserData {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            roles: user.roles.clone(),
        }
    }
}
