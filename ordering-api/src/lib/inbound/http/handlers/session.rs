use auth::IdentityContext;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;

/// Identity of the caller, as established by the bearer middleware.
pub async fn get_session(
    Extension(identity): Extension<IdentityContext>,
) -> Result<ApiSuccess<IdentityContext>, ApiError> {
    Ok(ApiSuccess::new(StatusCode::OK, identity))
}
