use crate::errors::ServiceError;
use axum::{extract::rejection::JsonRejection, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Result type shared by the JSON handlers
pub type ApiResult<T> = Result<Json<T>, ServiceError>;

/// Request body whose failed rules are all reported with one legacy message.
pub trait RequiredFields: Validate {
    const MISSING_MESSAGE: &'static str;
}

/// Unwraps a JSON body and runs its validation rules.
///
/// Malformed or missing bodies and failed rules all map to 400.
pub fn validated<T: RequiredFields>(
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, ServiceError> {
    let Json(body) = payload?;
    body.validate().map_err(|errors| {
        debug!(%errors, "Request body failed validation");
        ServiceError::ValidationError(T::MISSING_MESSAGE.to_string())
    })?;
    Ok(body)
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Body carrying only the user's tuition
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct TuitionRequest {
    #[serde(default)]
    #[validate(required, custom = "not_blank")]
    #[schema(example = "A01234567")]
    pub tuition: Option<String>,
}

impl RequiredFields for TuitionRequest {
    const MISSING_MESSAGE: &'static str = "Falta el parámetro 'tuition'";
}

impl TuitionRequest {
    pub fn tuition(&self) -> &str {
        self.tuition.as_deref().unwrap_or_default()
    }
}

/// Body for moving a user to another building
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateBuildingRequest {
    #[serde(default)]
    #[validate(required, custom = "not_blank")]
    #[schema(example = "A01234567")]
    pub tuition: Option<String>,
    #[serde(default)]
    #[validate(required, custom = "not_blank")]
    #[schema(example = "Edificio B")]
    pub building: Option<String>,
}

impl RequiredFields for UpdateBuildingRequest {
    const MISSING_MESSAGE: &'static str = "Faltan parámetros 'tuition' o 'building'";
}

impl UpdateBuildingRequest {
    pub fn tuition(&self) -> &str {
        self.tuition.as_deref().unwrap_or_default()
    }

    pub fn building(&self) -> &str {
        self.building.as_deref().unwrap_or_default()
    }
}

/// Plain acknowledgement body
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct StatusResponse {
    #[schema(example = "Entrada actualizada exitosamente")]
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }
}
