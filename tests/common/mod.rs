use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use fleetflow_api::auth::{AuthConfig, AuthService};
use fleetflow_api::config::AppConfig;
use fleetflow_api::db::{self, Store};
use fleetflow_api::handlers::AppServices;
use fleetflow_api::services::shipments::NewShipment;
use fleetflow_api::services::vehicles::NewVehicle;

/// One isolated test environment: a throwaway database plus the service
/// stack wired the way `main` wires it.
pub struct TestContext {
    pub store: Store,
    pub services: AppServices,
    pub auth: Arc<AuthService>,
}

impl TestContext {
    /// Drops the throwaway database and closes the connection.
    pub async fn teardown(self) {
        let _ = self.store.database().drop().await;
        self.store.shutdown().await;
    }
}

pub async fn context() -> TestContext {
    let uri = std::env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();

    let cfg = AppConfig {
        mongodb_uri: uri,
        mongodb_database: format!("fleetflow_test_{}", nanos),
        jwt_secret: "integration-test-secret-key-that-is-long-enough".to_string(),
        jwt_expiration: 3600,
        auth_issuer: "fleetflow-api".to_string(),
        auth_audience: "fleetflow-clients".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "development".to_string(),
        log_level: "warn".to_string(),
        log_json: false,
        cors_allowed_origins: None,
        cors_allow_any_origin: false,
    };

    let store = db::establish_connection(&cfg)
        .await
        .expect("MongoDB must be reachable (set MONGODB_URI to override the default)");
    db::ensure_indexes(&store).await.expect("index creation failed");

    let auth = Arc::new(AuthService::new(AuthConfig::from_app_config(&cfg)));
    let services = AppServices::new(&store, auth.clone());

    TestContext {
        store,
        services,
        auth,
    }
}

pub fn sample_shipment(shipper: &str) -> NewShipment {
    NewShipment {
        shipper_name: shipper.to_string(),
        carrier_name: "FastFreight".to_string(),
        pickup_location: "NYC".to_string(),
        delivery_location: "LA".to_string(),
        rate: 1200.0,
        estimated_delivery: None,
    }
}

pub fn sample_vehicle(plate: &str) -> NewVehicle {
    NewVehicle {
        plate_number: plate.to_string(),
        vehicle_model: "Volvo FH16".to_string(),
        vehicle_type: "Truck".to_string(),
        driver_name: "Dana Reyes".to_string(),
    }
}
