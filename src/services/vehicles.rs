use std::sync::Arc;

use bson::{doc, Bson, Document};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{Collection, Database};
use tracing::{error, instrument, warn};

use crate::errors::ServiceError;
use crate::models::shipment::{Shipment, ShipmentStatus};
use crate::models::vehicle::{self, Vehicle, VehicleStatus};
use crate::normalize;
use crate::services::{parse_object_id, shipments::ShipmentService};

/// Fields of a vehicle the caller controls at creation time. Status and
/// location start from the fleet defaults.
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub plate_number: String,
    pub vehicle_model: String,
    pub vehicle_type: String,
    pub driver_name: String,
}

/// Service for managing the vehicle fleet
#[derive(Clone)]
pub struct VehicleService {
    collection: Collection<Document>,
    shipments: Arc<ShipmentService>,
}

impl VehicleService {
    pub fn new(db: &Database, shipments: Arc<ShipmentService>) -> Self {
        Self {
            collection: db.collection(vehicle::COLLECTION),
            shipments,
        }
    }

    /// Lists the whole fleet, newest first.
    #[instrument(skip(self))]
    pub async fn list_vehicles(&self) -> Result<Vec<Vehicle>, ServiceError> {
        let docs = self
            .collection
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await
            .map_err(ServiceError::db_error)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(ServiceError::db_error)?;

        Ok(docs.iter().map(normalize::vehicle).collect())
    }

    /// Adds a vehicle to the fleet. New vehicles start Idle at the
    /// warehouse; a duplicate plate number is a conflict.
    #[instrument(skip(self, input))]
    pub async fn add_vehicle(&self, input: NewVehicle) -> Result<Vehicle, ServiceError> {
        let now = bson::DateTime::from_chrono(Utc::now());
        let document = doc! {
            "plateNumber": input.plate_number,
            "vehicleModel": input.vehicle_model,
            "type": input.vehicle_type,
            "driverName": input.driver_name,
            "status": VehicleStatus::Idle.as_str(),
            "currentLocation": vehicle::DEFAULT_LOCATION,
            "createdAt": now,
            "updatedAt": now,
        };

        let result = self
            .collection
            .insert_one(document.clone())
            .await
            .map_err(|e| ServiceError::insert_error(e, "plate number"))?;

        let mut stored = document;
        stored.insert("_id", result.inserted_id);
        Ok(normalize::vehicle(&stored))
    }

    /// Hard-deletes a vehicle. Same strict contract as shipment deletion:
    /// deleting an id that matches nothing is NotFound.
    #[instrument(skip(self))]
    pub async fn delete_vehicle(&self, id: &str) -> Result<bool, ServiceError> {
        let oid = parse_object_id(id, "Vehicle")?;
        let result = self
            .collection
            .delete_one(doc! { "_id": oid })
            .await
            .map_err(ServiceError::db_error)?;

        if result.deleted_count == 0 {
            return Err(ServiceError::NotFound(format!("Vehicle {} not found", id)));
        }
        Ok(true)
    }

    /// Assigns a vehicle to a shipment: the vehicle goes Active, the
    /// shipment goes InTransit. The two writes commit independently; if the
    /// shipment side fails, the vehicle's previous status is restored as a
    /// compensating write. Callers should still treat assignment as
    /// non-atomic.
    #[instrument(skip(self))]
    pub async fn assign_to_shipment(
        &self,
        vehicle_id: &str,
        shipment_id: &str,
    ) -> Result<Shipment, ServiceError> {
        let oid = parse_object_id(vehicle_id, "Vehicle")?;
        let vehicle_doc = self
            .collection
            .find_one(doc! { "_id": oid })
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Vehicle {} not found", vehicle_id)))?;

        let previous_status = vehicle_doc
            .get("status")
            .and_then(Bson::as_str)
            .unwrap_or(VehicleStatus::Idle.as_str())
            .to_string();

        self.collection
            .update_one(
                doc! { "_id": oid },
                doc! { "$set": {
                    "status": VehicleStatus::Active.as_str(),
                    "updatedAt": bson::DateTime::from_chrono(Utc::now()),
                } },
            )
            .await
            .map_err(ServiceError::db_error)?;

        match self
            .shipments
            .update_status(shipment_id, ShipmentStatus::InTransit)
            .await
        {
            Ok(shipment) => Ok(shipment),
            Err(err) => {
                let compensation = self
                    .collection
                    .update_one(
                        doc! { "_id": oid },
                        doc! { "$set": {
                            "status": previous_status.as_str(),
                            "updatedAt": bson::DateTime::from_chrono(Utc::now()),
                        } },
                    )
                    .await;
                match compensation {
                    Ok(_) => warn!(
                        vehicle_id,
                        shipment_id, "assignment failed; vehicle status restored"
                    ),
                    Err(comp_err) => error!(
                        vehicle_id,
                        shipment_id,
                        error = %comp_err,
                        "assignment failed and the vehicle status could not be restored"
                    ),
                }
                Err(err)
            }
        }
    }
}
