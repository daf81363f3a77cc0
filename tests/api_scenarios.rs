//! End-to-end service scenarios against a live MongoDB.
//!
//! Run with `cargo test -- --ignored` once a deployment is reachable
//! (defaults to mongodb://localhost:27017, override via MONGODB_URI).
//! Each test provisions and drops its own throwaway database.

mod common;

use std::time::Duration;

use fleetflow_api::errors::ServiceError;
use fleetflow_api::models::shipment::ShipmentStatus;
use fleetflow_api::models::user::Role;
use fleetflow_api::services::shipments::SortOrder;

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn shipment_lifecycle_create_update_delete() {
    let ctx = common::context().await;
    let shipments = &ctx.services.shipments;

    let created = shipments
        .create_shipment(common::sample_shipment("Acme"))
        .await
        .unwrap();
    assert_eq!(created.status, "Pending");
    assert!(created.tracking_id.starts_with("TRK-"));
    assert_eq!(created.rate, 1200.0);
    assert_eq!(created.created_at, created.updated_at);

    // Give the millisecond clock room so updatedAt moves strictly forward.
    tokio::time::sleep(Duration::from_millis(20)).await;

    let updated = shipments
        .update_status(&created.id, ShipmentStatus::InTransit)
        .await
        .unwrap();
    assert_eq!(updated.status, "InTransit");
    assert_eq!(updated.tracking_id, created.tracking_id);
    assert!(updated.updated_at > created.created_at);

    assert!(shipments.delete_shipment(&created.id).await.unwrap());
    assert!(matches!(
        shipments.get_shipment(&created.id).await,
        Err(ServiceError::NotFound(_))
    ));

    ctx.teardown().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn identical_inputs_get_distinct_tracking_codes() {
    let ctx = common::context().await;
    let shipments = &ctx.services.shipments;

    let first = shipments
        .create_shipment(common::sample_shipment("Acme"))
        .await
        .unwrap();
    let second = shipments
        .create_shipment(common::sample_shipment("Acme"))
        .await
        .unwrap();

    assert_ne!(first.tracking_id, second.tracking_id);

    ctx.teardown().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn empty_collection_lists_an_empty_first_page() {
    let ctx = common::context().await;

    let (data, total) = ctx
        .services
        .shipments
        .list_shipments(1, 10, None, None, SortOrder::Desc)
        .await
        .unwrap();

    assert!(data.is_empty());
    assert_eq!(total, 0);

    ctx.teardown().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn page_beyond_the_last_returns_empty_data_with_correct_total() {
    let ctx = common::context().await;
    let shipments = &ctx.services.shipments;

    for shipper in ["Acme", "Globex", "Initech"] {
        shipments
            .create_shipment(common::sample_shipment(shipper))
            .await
            .unwrap();
    }

    let (data, total) = shipments
        .list_shipments(5, 10, None, None, SortOrder::Desc)
        .await
        .unwrap();
    assert!(data.is_empty());
    assert_eq!(total, 3);

    let (data, total) = shipments
        .list_shipments(1, 2, None, None, SortOrder::Desc)
        .await
        .unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(total, 3);

    ctx.teardown().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn status_filter_applies_to_data_and_total_alike() {
    let ctx = common::context().await;
    let shipments = &ctx.services.shipments;

    let first = shipments
        .create_shipment(common::sample_shipment("Acme"))
        .await
        .unwrap();
    shipments
        .create_shipment(common::sample_shipment("Globex"))
        .await
        .unwrap();
    shipments
        .update_status(&first.id, ShipmentStatus::Delivered)
        .await
        .unwrap();

    let (data, total) = shipments
        .list_shipments(1, 10, Some(ShipmentStatus::Delivered), None, SortOrder::Desc)
        .await
        .unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(total, 1);
    assert_eq!(data[0].id, first.id);

    ctx.teardown().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn dashboard_counts_cancelled_in_total_only() {
    let ctx = common::context().await;
    let shipments = &ctx.services.shipments;

    let cancelled = shipments
        .create_shipment(common::sample_shipment("Acme"))
        .await
        .unwrap();
    shipments
        .update_status(&cancelled.id, ShipmentStatus::Cancelled)
        .await
        .unwrap();
    shipments
        .create_shipment(common::sample_shipment("Globex"))
        .await
        .unwrap();

    let stats = shipments.dashboard_stats().await.unwrap();
    assert_eq!(stats.total.count, 2);
    assert_eq!(stats.pending.count, 1);
    assert_eq!(stats.transit.count, 0);
    assert_eq!(stats.delivered.count, 0);
    assert_eq!(stats.total.total_value, 2400.0);
    assert_eq!(stats.pending.total_value, 1200.0);

    ctx.teardown().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn login_rejects_bad_credentials_without_leaking_which() {
    let ctx = common::context().await;
    let users = &ctx.services.users;

    users
        .create_user("Fleet Admin", "x@x.com", "correct-horse", Role::Admin)
        .await
        .unwrap();

    let wrong_password = users.login("x@x.com", "wrong").await;
    assert!(matches!(wrong_password, Err(ServiceError::InvalidCredentials)));

    let unknown_email = users.login("nobody@x.com", "correct-horse").await;
    assert!(matches!(unknown_email, Err(ServiceError::InvalidCredentials)));

    let (token, profile) = users.login("x@x.com", "correct-horse").await.unwrap();
    assert_eq!(profile.email, "x@x.com");
    assert_eq!(profile.role, "Admin");

    let principal = ctx.auth.verify_token(&token).unwrap();
    assert_eq!(principal.email, "x@x.com");
    assert_eq!(principal.role, Role::Admin);

    ctx.teardown().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn duplicate_plate_numbers_conflict() {
    let ctx = common::context().await;
    let vehicles = &ctx.services.vehicles;

    vehicles
        .add_vehicle(common::sample_vehicle("FLT-2041"))
        .await
        .unwrap();
    let duplicate = vehicles.add_vehicle(common::sample_vehicle("FLT-2041")).await;
    assert!(matches!(duplicate, Err(ServiceError::Conflict(_))));

    ctx.teardown().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn assignment_activates_the_vehicle_and_moves_the_shipment() {
    let ctx = common::context().await;

    let vehicle = ctx
        .services
        .vehicles
        .add_vehicle(common::sample_vehicle("FLT-2041"))
        .await
        .unwrap();
    assert_eq!(vehicle.status, "Idle");
    assert_eq!(vehicle.current_location, "Warehouse");

    let shipment = ctx
        .services
        .shipments
        .create_shipment(common::sample_shipment("Acme"))
        .await
        .unwrap();

    let assigned = ctx
        .services
        .vehicles
        .assign_to_shipment(&vehicle.id, &shipment.id)
        .await
        .unwrap();
    assert_eq!(assigned.id, shipment.id);
    assert_eq!(assigned.status, "InTransit");

    let fleet = ctx.services.vehicles.list_vehicles().await.unwrap();
    let updated = fleet.iter().find(|v| v.id == vehicle.id).unwrap();
    assert_eq!(updated.status, "Active");

    ctx.teardown().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn failed_assignment_restores_the_vehicle_status() {
    let ctx = common::context().await;

    let vehicle = ctx
        .services
        .vehicles
        .add_vehicle(common::sample_vehicle("FLT-2041"))
        .await
        .unwrap();

    // Well-formed id that matches no shipment.
    let missing_shipment = "675a1f0c8b3e4d2a91c04e77";
    let result = ctx
        .services
        .vehicles
        .assign_to_shipment(&vehicle.id, missing_shipment)
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));

    let fleet = ctx.services.vehicles.list_vehicles().await.unwrap();
    let restored = fleet.iter().find(|v| v.id == vehicle.id).unwrap();
    assert_eq!(restored.status, "Idle");

    ctx.teardown().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn deleting_missing_records_reports_not_found() {
    let ctx = common::context().await;
    let missing = "675a1f0c8b3e4d2a91c04e77";

    assert!(matches!(
        ctx.services.shipments.delete_shipment(missing).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        ctx.services.vehicles.delete_vehicle(missing).await,
        Err(ServiceError::NotFound(_))
    ));

    ctx.teardown().await;
}
