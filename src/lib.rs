//! FleetFlow API Library
//!
//! Shipment tracking and fleet management backend: authenticated CRUD over
//! a document store with pagination, dashboard aggregation, and vehicle
//! assignment.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod openapi;
pub mod services;

use std::sync::Arc;

use axum::{
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::Serialize;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub auth: Arc<auth::AuthService>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn auth_service(&self) -> Arc<auth::AuthService> {
        self.auth.clone()
    }

    pub fn shipment_service(&self) -> Arc<services::shipments::ShipmentService> {
        self.services.shipments.clone()
    }

    pub fn vehicle_service(&self) -> Arc<services::vehicles::VehicleService> {
        self.services.vehicles.clone()
    }

    pub fn user_service(&self) -> Arc<services::users::UserService> {
        self.services.users.clone()
    }
}

// Common response wrappers
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

/// Paginated listing payload: one page of records plus the full filtered
/// count, so clients can page without a second round trip.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/shipments",
            get(handlers::shipments::list_shipments).post(handlers::shipments::create_shipment),
        )
        .route(
            "/shipments/:id",
            get(handlers::shipments::get_shipment).delete(handlers::shipments::delete_shipment),
        )
        .route(
            "/shipments/:id/status",
            put(handlers::shipments::update_shipment_status),
        )
        .route("/dashboard/stats", get(handlers::shipments::dashboard_stats))
        .route(
            "/vehicles",
            get(handlers::vehicles::list_vehicles).post(handlers::vehicles::add_vehicle),
        )
        .route("/vehicles/:id", delete(handlers::vehicles::delete_vehicle))
        .route(
            "/vehicles/:id/assign/:shipment_id",
            post(handlers::vehicles::assign_vehicle),
        )
}

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(handlers::auth::login))
}

#[cfg(test)]
mod response_tests {
    use super::*;

    #[test]
    fn success_envelope_wraps_the_payload() {
        let response = ApiResponse::success("ok");
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["data"], "ok");
        assert!(value.get("message").is_none());
    }

    #[test]
    fn paginated_payload_serializes_the_contract_fields() {
        let page = PaginatedResponse::<u32> {
            data: vec![],
            total: 0,
            page: 1,
            limit: 10,
        };
        let value = serde_json::to_value(&page).unwrap();

        assert_eq!(value["data"], serde_json::json!([]));
        assert_eq!(value["total"], 0);
        assert_eq!(value["page"], 1);
        assert_eq!(value["limit"], 10);
    }
}
