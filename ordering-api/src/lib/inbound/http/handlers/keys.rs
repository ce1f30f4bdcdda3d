use auth::KeyStatus;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;

/// Key ids currently trusted for token verification.
pub async fn list_keys(
    State(state): State<AppState>,
) -> Result<ApiSuccess<Vec<KeyData>>, ApiError> {
    let keys = state
        .authenticator
        .keys()
        .load()
        .key_ids()
        .into_iter()
        .map(|(kid, status)| KeyData { kid, status })
        .collect();

    Ok(ApiSuccess::new(StatusCode::OK, keys))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyData {
    pub kid: String,
    #[serde(flatten)]
    pub status: KeyStatus,
}
