use super::common::{ApiResult, StatusResponse};
use crate::AppState;
use axum::{extract::State, Json};

#[utoipa::path(
    post,
    path = "/set_requested_entrada",
    responses(
        (status = 200, description = "Entry door flagged", body = StatusResponse),
        (status = 404, description = "Entry door not provisioned", body = crate::errors::ErrorResponse)
    ),
    tag = "doors"
)]
pub async fn request_entry(State(state): State<AppState>) -> ApiResult<StatusResponse> {
    state.services.doors.request_entry().await?;
    Ok(Json(StatusResponse::new("Entrada actualizada exitosamente")))
}
