//! Seeds the database with the demo users and fleet.
//!
//! Safe to run repeatedly: the unique indexes turn a second run into
//! skipped duplicates.

use std::sync::Arc;

use tracing::{info, warn};

use fleetflow_api as api;
use fleetflow_api::errors::ServiceError;
use fleetflow_api::models::user::Role;
use fleetflow_api::services::users::UserService;
use fleetflow_api::services::vehicles::{NewVehicle, VehicleService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    let store = api::db::establish_connection(&cfg).await?;
    api::db::ensure_indexes(&store).await?;

    let auth_service = Arc::new(api::auth::AuthService::new(
        api::auth::AuthConfig::from_app_config(&cfg),
    ));
    let services = api::handlers::AppServices::new(&store, auth_service);

    seed_users(&services.users).await;
    seed_vehicles(&services.vehicles).await;

    store.shutdown().await;
    Ok(())
}

async fn seed_users(users: &UserService) {
    let fixtures = [
        ("Fleet Admin", "admin@fleetflow.dev", "admin1234", Role::Admin),
        (
            "Dispatch Employee",
            "employee@fleetflow.dev",
            "employee1234",
            Role::Employee,
        ),
    ];

    for (name, email, password, role) in fixtures {
        match users.create_user(name, email, password, role).await {
            Ok(profile) => info!(email = %profile.email, role = %profile.role, "seeded user"),
            Err(ServiceError::Conflict(_)) => warn!(email, "user already present, skipping"),
            Err(err) => warn!(email, error = %err, "failed to seed user"),
        }
    }
}

async fn seed_vehicles(vehicles: &VehicleService) {
    let fleet = [
        ("FLT-1001", "Volvo FH16", "Truck", "Dana Reyes"),
        ("FLT-1002", "Mercedes Actros", "Truck", "Jo Okafor"),
        ("FLT-1003", "Ford Transit", "Van", "Sam Whitaker"),
        ("FLT-1004", "Scania R500", "Truck", "Priya Nair"),
        ("FLT-1005", "Isuzu NPR", "Box Truck", "Lee Calder"),
    ];

    for (plate, model, kind, driver) in fleet {
        let input = NewVehicle {
            plate_number: plate.to_string(),
            vehicle_model: model.to_string(),
            vehicle_type: kind.to_string(),
            driver_name: driver.to_string(),
        };
        match vehicles.add_vehicle(input).await {
            Ok(vehicle) => info!(plate_number = %vehicle.plate_number, "seeded vehicle"),
            Err(ServiceError::Conflict(_)) => warn!(plate, "vehicle already present, skipping"),
            Err(err) => warn!(plate, error = %err, "failed to seed vehicle"),
        }
    }
}
