use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::errors::ErrorResponse;
use crate::handlers;
use crate::models::shipment::{DashboardStats, Shipment, ShipmentStatus, StatusBucket};
use crate::models::user::{Role, UserProfile};
use crate::models::vehicle::{Vehicle, VehicleStatus};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "FleetFlow API",
        description = "Shipment tracking and fleet management API"
    ),
    paths(
        handlers::auth::login,
        handlers::shipments::list_shipments,
        handlers::shipments::get_shipment,
        handlers::shipments::dashboard_stats,
        handlers::shipments::create_shipment,
        handlers::shipments::update_shipment_status,
        handlers::shipments::delete_shipment,
        handlers::vehicles::list_vehicles,
        handlers::vehicles::add_vehicle,
        handlers::vehicles::delete_vehicle,
        handlers::vehicles::assign_vehicle,
    ),
    components(schemas(
        Shipment,
        ShipmentStatus,
        DashboardStats,
        StatusBucket,
        Vehicle,
        VehicleStatus,
        UserProfile,
        Role,
        ErrorResponse,
    )),
    tags(
        (name = "auth", description = "Authentication"),
        (name = "shipments", description = "Shipment CRUD and listing"),
        (name = "dashboard", description = "Aggregated shipment metrics"),
        (name = "vehicles", description = "Fleet management"),
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
