// ABOUTME: Rate record handlers: read (creating the default), create, update, and item removal.
// ABOUTME: Mutations answer with a confirmation message plus the resulting record.

use axum::Json;
use axum::extract::{Path, State};
use ratekeeper_core::{DataFields, DataRecord, DataUpdate};
use serde_json::{Value, json};

use crate::api::{JsonBody, blocking, parse_id};
use crate::app_state::SharedState;
use crate::error::ApiError;

/// GET /rate/datas - Return the current record, creating the default if absent.
pub async fn get_data(State(state): State<SharedState>) -> Result<Json<DataRecord>, ApiError> {
    let record = blocking(move || Ok(state.records.find_current()?)).await?;
    Ok(Json(record))
}

/// POST /rate/datas - Store a new record from the request body.
pub async fn create_data(
    State(state): State<SharedState>,
    JsonBody(fields): JsonBody<DataFields>,
) -> Result<Json<Value>, ApiError> {
    let record = blocking(move || Ok(state.records.create(fields)?)).await?;
    tracing::info!("data record {} created", record.record_id);
    Ok(Json(json!({ "message": "Data saved successfully!", "data": record })))
}

/// PUT /rate/datas/{id} - Replace the fields present in the body.
pub async fn update_data(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<DataUpdate>,
) -> Result<Json<Value>, ApiError> {
    let record_id = parse_id(&id)?;
    let record = blocking(move || Ok(state.records.update(&record_id, update)?)).await?;
    tracing::info!("data record {} updated", record_id);
    Ok(Json(json!({ "message": "Data updated successfully!", "data": record })))
}

/// DELETE /rate/datas/{id}/items/{item_id} - Remove one bill item.
pub async fn delete_item(
    State(state): State<SharedState>,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let record_id = parse_id(&id)?;
    let item_id = parse_id(&item_id).ok();
    let record = blocking(move || match item_id {
        Some(item_id) => Ok(state.records.remove_item(&record_id, &item_id)?),
        // A malformed item id cannot match any item; the record is left as is.
        None => state
            .records
            .find_first()?
            .filter(|r| r.record_id == record_id)
            .ok_or(ApiError::NotFound("Data not found")),
    })
    .await?;
    Ok(Json(json!({ "message": "Item deleted successfully!", "data": record })))
}
