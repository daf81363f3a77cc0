use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    auth::{self, AuthSession},
    errors::ServiceError,
    models::shipment::{DashboardStats, Shipment, ShipmentStatus},
    models::user::Role,
    services::shipments::{NewShipment, SortOrder},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};

const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Deserialize, Default, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ShipmentListQuery {
    /// 1-based page number
    pub page: Option<u64>,
    /// Page size, capped at 100
    pub limit: Option<u64>,
    /// Exact status filter (Pending, InTransit, Delivered, Cancelled)
    pub status: Option<String>,
    /// Sort field; unsupported values fall back to createdAt
    pub sort_by: Option<String>,
    /// "asc" or "desc" (default)
    pub sort_order: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "shipperName": "Acme",
    "carrierName": "FastFreight",
    "pickupLocation": "NYC",
    "deliveryLocation": "LA",
    "rate": 1200.0,
    "estimatedDelivery": "2025-12-01T00:00:00Z"
}))]
pub struct CreateShipmentRequest {
    #[validate(length(min = 1))]
    pub shipper_name: String,
    #[validate(length(min = 1))]
    pub carrier_name: String,
    #[validate(length(min = 1))]
    pub pickup_location: String,
    #[validate(length(min = 1))]
    pub delivery_location: String,
    /// Monetary rate; must not be negative
    #[validate(range(min = 0.0))]
    pub rate: f64,
    /// Optional delivery estimate, RFC 3339
    pub estimated_delivery: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({"status": "InTransit"}))]
pub struct UpdateShipmentStatusRequest {
    pub status: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/shipments",
    params(ShipmentListQuery),
    responses(
        (status = 200, description = "Shipments listed", body = ApiResponse<PaginatedResponse<Shipment>>),
        (status = 400, description = "Invalid status filter", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "shipments"
)]
pub async fn list_shipments(
    State(state): State<AppState>,
    session: AuthSession,
    Query(query): Query<ShipmentListQuery>,
) -> ApiResult<PaginatedResponse<Shipment>> {
    auth::require_authenticated(&session)?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    // An unknown status is a caller mistake, not an empty filter.
    let status = query
        .status
        .as_deref()
        .map(str::parse::<ShipmentStatus>)
        .transpose()
        .map_err(|e| ServiceError::ValidationError(format!("status: {}", e)))?;

    let (data, total) = state
        .shipment_service()
        .list_shipments(
            page,
            limit,
            status,
            query.sort_by.as_deref(),
            SortOrder::parse(query.sort_order.as_deref()),
        )
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse {
        data,
        total,
        page,
        limit,
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/shipments/:id",
    params(("id" = String, Path, description = "Shipment ID")),
    responses(
        (status = 200, description = "Shipment fetched", body = ApiResponse<Shipment>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Shipment not found", body = crate::errors::ErrorResponse)
    ),
    tag = "shipments"
)]
pub async fn get_shipment(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
) -> ApiResult<Shipment> {
    auth::require_authenticated(&session)?;
    let shipment = state.shipment_service().get_shipment(&id).await?;
    Ok(Json(ApiResponse::success(shipment)))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/stats",
    responses(
        (status = 200, description = "Dashboard aggregates", body = ApiResponse<DashboardStats>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "dashboard"
)]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    session: AuthSession,
) -> ApiResult<DashboardStats> {
    auth::require_authenticated(&session)?;
    let stats = state.shipment_service().dashboard_stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}

#[utoipa::path(
    post,
    path = "/api/v1/shipments",
    request_body = CreateShipmentRequest,
    responses(
        (status = 200, description = "Shipment created", body = ApiResponse<Shipment>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse)
    ),
    tag = "shipments"
)]
pub async fn create_shipment(
    State(state): State<AppState>,
    session: AuthSession,
    Json(payload): Json<CreateShipmentRequest>,
) -> ApiResult<Shipment> {
    auth::require_role(&session, Role::Admin)?;
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let created = state
        .shipment_service()
        .create_shipment(NewShipment {
            shipper_name: payload.shipper_name,
            carrier_name: payload.carrier_name,
            pickup_location: payload.pickup_location,
            delivery_location: payload.delivery_location,
            rate: payload.rate,
            estimated_delivery: payload.estimated_delivery,
        })
        .await?;

    info!(tracking_id = %created.tracking_id, "shipment created");
    Ok(Json(ApiResponse::success(created)))
}

#[utoipa::path(
    put,
    path = "/api/v1/shipments/:id/status",
    params(("id" = String, Path, description = "Shipment ID")),
    request_body = UpdateShipmentStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<Shipment>),
        (status = 400, description = "Invalid status", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Shipment not found", body = crate::errors::ErrorResponse)
    ),
    tag = "shipments"
)]
pub async fn update_shipment_status(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
    Json(payload): Json<UpdateShipmentStatusRequest>,
) -> ApiResult<Shipment> {
    auth::require_role(&session, Role::Admin)?;
    let status = payload
        .status
        .parse::<ShipmentStatus>()
        .map_err(|e| ServiceError::ValidationError(format!("status: {}", e)))?;

    let updated = state.shipment_service().update_status(&id, status).await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/shipments/:id",
    params(("id" = String, Path, description = "Shipment ID")),
    responses(
        (status = 200, description = "Shipment deleted", body = ApiResponse<bool>),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Shipment not found", body = crate::errors::ErrorResponse)
    ),
    tag = "shipments"
)]
pub async fn delete_shipment(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
) -> ApiResult<bool> {
    auth::require_role(&session, Role::Admin)?;
    let deleted = state.shipment_service().delete_shipment(&id).await?;
    info!(shipment_id = %id, "shipment deleted");
    Ok(Json(ApiResponse::success(deleted)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_rejects_blank_required_fields() {
        let payload: CreateShipmentRequest = serde_json::from_value(json!({
            "shipperName": "",
            "carrierName": "FastFreight",
            "pickupLocation": "NYC",
            "deliveryLocation": "LA",
            "rate": 100.0
        }))
        .unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn create_request_rejects_negative_rates() {
        let payload: CreateShipmentRequest = serde_json::from_value(json!({
            "shipperName": "Acme",
            "carrierName": "FastFreight",
            "pickupLocation": "NYC",
            "deliveryLocation": "LA",
            "rate": -1.0
        }))
        .unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn create_request_ignores_caller_supplied_status_and_tracking() {
        // Unknown fields are dropped at deserialization; the server decides both.
        let payload: CreateShipmentRequest = serde_json::from_value(json!({
            "shipperName": "Acme",
            "carrierName": "FastFreight",
            "pickupLocation": "NYC",
            "deliveryLocation": "LA",
            "rate": 100.0,
            "status": "Delivered",
            "trackingId": "TRK-FORGED"
        }))
        .unwrap();
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn list_query_parses_camel_case_parameters() {
        let query: ShipmentListQuery = serde_json::from_value(json!({
            "page": 2,
            "limit": 25,
            "sortBy": "rate",
            "sortOrder": "asc"
        }))
        .unwrap();
        assert_eq!(query.page, Some(2));
        assert_eq!(query.sort_by.as_deref(), Some("rate"));
        assert_eq!(query.sort_order.as_deref(), Some("asc"));
    }
}
