use std::sync::Arc;

use axum::response::Json;
use serde_json::{json, Value};

use crate::auth::AuthService;
use crate::db::Store;
use crate::services::{shipments::ShipmentService, users::UserService, vehicles::VehicleService};

pub mod auth;
pub mod shipments;
pub mod vehicles;

/// The services HTTP handlers dispatch into, built once at startup around
/// the process-scoped store handle.
#[derive(Clone)]
pub struct AppServices {
    pub shipments: Arc<ShipmentService>,
    pub vehicles: Arc<VehicleService>,
    pub users: Arc<UserService>,
}

impl AppServices {
    pub fn new(store: &Store, auth_service: Arc<AuthService>) -> Self {
        let db = store.database();

        let shipments = Arc::new(ShipmentService::new(db));
        let vehicles = Arc::new(VehicleService::new(db, shipments.clone()));
        let users = Arc::new(UserService::new(db, auth_service));

        Self {
            shipments,
            vehicles,
            users,
        }
    }
}

/// Liveness probe; unauthenticated.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
