use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    auth::{self, AuthSession},
    errors::ServiceError,
    models::shipment::Shipment,
    models::vehicle::Vehicle,
    services::vehicles::NewVehicle,
    ApiResponse, ApiResult, AppState,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "plateNumber": "FLT-2041",
    "vehicleModel": "Volvo FH16",
    "type": "Truck",
    "driverName": "Dana Reyes"
}))]
pub struct AddVehicleRequest {
    #[validate(length(min = 1))]
    pub plate_number: String,
    #[validate(length(min = 1))]
    pub vehicle_model: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1))]
    pub vehicle_type: String,
    #[validate(length(min = 1))]
    pub driver_name: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicles",
    responses(
        (status = 200, description = "Fleet listed", body = ApiResponse<Vec<Vehicle>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "vehicles"
)]
pub async fn list_vehicles(
    State(state): State<AppState>,
    session: AuthSession,
) -> ApiResult<Vec<Vehicle>> {
    auth::require_authenticated(&session)?;
    let vehicles = state.vehicle_service().list_vehicles().await?;
    Ok(Json(ApiResponse::success(vehicles)))
}

#[utoipa::path(
    post,
    path = "/api/v1/vehicles",
    request_body = AddVehicleRequest,
    responses(
        (status = 200, description = "Vehicle added", body = ApiResponse<Vehicle>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 409, description = "Plate number already exists", body = crate::errors::ErrorResponse)
    ),
    tag = "vehicles"
)]
pub async fn add_vehicle(
    State(state): State<AppState>,
    session: AuthSession,
    Json(payload): Json<AddVehicleRequest>,
) -> ApiResult<Vehicle> {
    auth::require_authenticated(&session)?;
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let created = state
        .vehicle_service()
        .add_vehicle(NewVehicle {
            plate_number: payload.plate_number,
            vehicle_model: payload.vehicle_model,
            vehicle_type: payload.vehicle_type,
            driver_name: payload.driver_name,
        })
        .await?;

    info!(plate_number = %created.plate_number, "vehicle added to fleet");
    Ok(Json(ApiResponse::success(created)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/vehicles/:id",
    params(("id" = String, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle deleted", body = ApiResponse<bool>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Vehicle not found", body = crate::errors::ErrorResponse)
    ),
    tag = "vehicles"
)]
pub async fn delete_vehicle(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
) -> ApiResult<bool> {
    auth::require_authenticated(&session)?;
    let deleted = state.vehicle_service().delete_vehicle(&id).await?;
    info!(vehicle_id = %id, "vehicle deleted");
    Ok(Json(ApiResponse::success(deleted)))
}

#[utoipa::path(
    post,
    path = "/api/v1/vehicles/:id/assign/:shipment_id",
    params(
        ("id" = String, Path, description = "Vehicle ID"),
        ("shipment_id" = String, Path, description = "Shipment ID")
    ),
    responses(
        (status = 200, description = "Vehicle assigned; shipment now in transit", body = ApiResponse<Shipment>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Vehicle or shipment not found", body = crate::errors::ErrorResponse)
    ),
    tag = "vehicles"
)]
pub async fn assign_vehicle(
    State(state): State<AppState>,
    session: AuthSession,
    Path((id, shipment_id)): Path<(String, String)>,
) -> ApiResult<Shipment> {
    auth::require_authenticated(&session)?;
    let shipment = state
        .vehicle_service()
        .assign_to_shipment(&id, &shipment_id)
        .await?;

    info!(vehicle_id = %id, shipment_id = %shipment_id, "vehicle assigned to shipment");
    Ok(Json(ApiResponse::success(shipment)))
}
