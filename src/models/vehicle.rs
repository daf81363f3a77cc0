use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Collection the vehicle documents live in.
pub const COLLECTION: &str = "vehicles";

/// Where a vehicle sits until it is dispatched somewhere.
pub const DEFAULT_LOCATION: &str = "Warehouse";

/// Vehicle status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum VehicleStatus {
    Active,
    Idle,
    Maintenance,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Active => "Active",
            VehicleStatus::Idle => "Idle",
            VehicleStatus::Maintenance => "Maintenance",
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Active" => Ok(VehicleStatus::Active),
            "Idle" => Ok(VehicleStatus::Idle),
            "Maintenance" => Ok(VehicleStatus::Maintenance),
            other => Err(format!(
                "'{}' is not a vehicle status (expected Active, Idle or Maintenance)",
                other
            )),
        }
    }
}

/// Wire representation of a fleet vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "675a20b18b3e4d2a91c04e91",
    "plateNumber": "FLT-2041",
    "vehicleModel": "Volvo FH16",
    "type": "Truck",
    "driverName": "Dana Reyes",
    "status": "Idle",
    "currentLocation": "Warehouse"
}))]
pub struct Vehicle {
    pub id: String,
    pub plate_number: String,
    pub vehicle_model: String,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub driver_name: String,
    /// One of Active, Idle, Maintenance
    pub status: String,
    pub current_location: String,
}
