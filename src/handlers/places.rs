use super::common::{validated, ApiResult, TuitionRequest};
use crate::{entities::place, AppState};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Place as listed to clients; `status` is 1 when enabled
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlaceSummary {
    pub place_id: i32,
    #[schema(example = 1)]
    pub status: u8,
}

impl From<place::Model> for PlaceSummary {
    fn from(model: place::Model) -> Self {
        Self {
            place_id: model.place_id,
            status: u8::from(model.status),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignPlaceResponse {
    #[schema(example = "Lugar asignado exitosamente")]
    pub status: String,
    pub place_id: i32,
    /// Code of the zone the place was found in
    #[schema(example = "A")]
    pub edificio: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReleasePlaceResponse {
    #[schema(example = "Lugar liberado exitosamente")]
    pub status: String,
    pub place_id: i32,
}

#[utoipa::path(
    get,
    path = "/get_lugares",
    responses(
        (status = 200, description = "Every place with its enabled flag", body = [PlaceSummary]),
        (status = 500, description = "Database failure", body = crate::errors::ErrorResponse)
    ),
    tag = "places"
)]
pub async fn list_places(State(state): State<AppState>) -> ApiResult<Vec<PlaceSummary>> {
    let places = state.services.places.list().await?;
    Ok(Json(places.into_iter().map(PlaceSummary::from).collect()))
}

#[utoipa::path(
    post,
    path = "/asignar_lugar",
    request_body = TuitionRequest,
    responses(
        (status = 200, description = "Place assigned", body = AssignPlaceResponse),
        (status = 400, description = "Missing tuition", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found or no place available", body = crate::errors::ErrorResponse),
        (status = 409, description = "Allocation contention", body = crate::errors::ErrorResponse)
    ),
    tag = "places"
)]
pub async fn assign_place(
    State(state): State<AppState>,
    payload: Result<Json<TuitionRequest>, JsonRejection>,
) -> ApiResult<AssignPlaceResponse> {
    let request = validated(payload)?;
    let assignment = state.services.allocator.assign(request.tuition()).await?;
    Ok(Json(AssignPlaceResponse {
        status: "Lugar asignado exitosamente".to_string(),
        place_id: assignment.place_id,
        edificio: assignment.zone_code,
    }))
}

#[utoipa::path(
    post,
    path = "/liberar_lugar",
    request_body = TuitionRequest,
    responses(
        (status = 200, description = "Place released", body = ReleasePlaceResponse),
        (status = 400, description = "Missing tuition", body = crate::errors::ErrorResponse),
        (status = 404, description = "User has no place", body = crate::errors::ErrorResponse)
    ),
    tag = "places"
)]
pub async fn release_place(
    State(state): State<AppState>,
    payload: Result<Json<TuitionRequest>, JsonRejection>,
) -> ApiResult<ReleasePlaceResponse> {
    let request = validated(payload)?;
    let release = state.services.allocator.release(request.tuition()).await?;
    Ok(Json(ReleasePlaceResponse {
        status: "Lugar liberado exitosamente".to_string(),
        place_id: release.place_id,
    }))
}
