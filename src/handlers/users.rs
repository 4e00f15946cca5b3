use super::common::{validated, ApiResult, StatusResponse, TuitionRequest, UpdateBuildingRequest};
use crate::{services::UserWithVehicle, AppState};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User as listed to clients
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: i32,
    pub name: String,
    pub tuition: String,
    pub major: String,
    pub access_type: String,
    /// Only present when `expose_passwords` is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[schema(example = "Edificio A")]
    pub building: String,
    /// "brand model", empty when the user has no vehicle
    #[schema(example = "Mazda 3")]
    pub vehicle: String,
}

impl UserSummary {
    fn from_row(row: UserWithVehicle, expose_password: bool) -> Self {
        let vehicle = row.vehicle();
        Self {
            id: row.id,
            name: row.name,
            tuition: row.tuition,
            major: row.major,
            access_type: row.access_type,
            password: expose_password.then_some(row.password),
            building: row.building,
            vehicle,
        }
    }
}

#[utoipa::path(
    get,
    path = "/data",
    responses(
        (status = 200, description = "Users with their vehicle", body = [UserSummary]),
        (status = 500, description = "Database failure", body = crate::errors::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<UserSummary>> {
    let expose = state.config.expose_passwords;
    let rows = state.services.users.list_with_vehicles().await?;
    Ok(Json(
        rows.into_iter()
            .map(|row| UserSummary::from_row(row, expose))
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/updateEdificio",
    request_body = UpdateBuildingRequest,
    responses(
        (status = 200, description = "Building updated", body = StatusResponse),
        (status = 400, description = "Missing tuition or building", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn update_building(
    State(state): State<AppState>,
    payload: Result<Json<UpdateBuildingRequest>, JsonRejection>,
) -> ApiResult<StatusResponse> {
    let request = validated(payload)?;
    state
        .services
        .users
        .update_building(request.tuition(), request.building())
        .await?;
    Ok(Json(StatusResponse::new("building actualizado exitosamente")))
}

#[utoipa::path(
    post,
    path = "/update_salida_y_reset",
    request_body = TuitionRequest,
    responses(
        (status = 200, description = "Exit registered", body = StatusResponse),
        (status = 400, description = "Missing tuition", body = crate::errors::ErrorResponse),
        (status = 404, description = "User or door not found", body = crate::errors::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn exit_and_reset(
    State(state): State<AppState>,
    payload: Result<Json<TuitionRequest>, JsonRejection>,
) -> ApiResult<StatusResponse> {
    let request = validated(payload)?;
    state.services.users.exit_and_reset(request.tuition()).await?;
    Ok(Json(StatusResponse::new(
        "Salida y edificio actualizados exitosamente",
    )))
}
