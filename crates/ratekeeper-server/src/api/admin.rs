// ABOUTME: Token-guarded admin view of the current rate record.
// ABOUTME: Unlike the public read, it never creates the default record.

use axum::Json;
use axum::extract::State;
use ratekeeper_core::DataRecord;

use crate::api::blocking;
use crate::app_state::SharedState;
use crate::auth::AuthClaims;
use crate::error::ApiError;

/// GET /rate/admin - Return the current record, or 404 when none exists.
pub async fn get_admin_data(
    State(state): State<SharedState>,
    axum::Extension(claims): AuthClaims,
) -> Result<Json<DataRecord>, ApiError> {
    tracing::debug!("admin data requested by {}", claims.user_id);
    blocking(move || Ok(state.records.find_first()?))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Data not found"))
}
