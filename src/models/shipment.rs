use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Collection the shipment documents live in.
pub const COLLECTION: &str = "shipments";

/// Shipment status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ShipmentStatus {
    Pending,
    InTransit,
    Delivered,
    Cancelled,
}

impl ShipmentStatus {
    /// Canonical storage/wire label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "Pending",
            ShipmentStatus::InTransit => "InTransit",
            ShipmentStatus::Delivered => "Delivered",
            ShipmentStatus::Cancelled => "Cancelled",
        }
    }

    /// Lenient parse for values read back from the store: historical records
    /// carry inconsistent casing and spacing ("In Transit", "pending ").
    /// Strips whitespace and compares case-insensitively.
    pub fn parse_loose(raw: &str) -> Option<Self> {
        let canonical: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        match canonical.as_str() {
            "pending" => Some(ShipmentStatus::Pending),
            "intransit" => Some(ShipmentStatus::InTransit),
            "delivered" => Some(ShipmentStatus::Delivered),
            "cancelled" => Some(ShipmentStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipmentStatus {
    type Err = String;

    /// Strict parse for caller-supplied values. Only the four canonical
    /// labels are accepted; anything else is a validation failure.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Pending" => Ok(ShipmentStatus::Pending),
            "InTransit" => Ok(ShipmentStatus::InTransit),
            "Delivered" => Ok(ShipmentStatus::Delivered),
            "Cancelled" => Ok(ShipmentStatus::Cancelled),
            other => Err(format!(
                "'{}' is not a shipment status (expected Pending, InTransit, Delivered or Cancelled)",
                other
            )),
        }
    }
}

/// Wire representation of a shipment, produced by the normalization layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "675a1f0c8b3e4d2a91c04e77",
    "trackingId": "TRK-9F3A2B1C44D0",
    "shipperName": "Acme",
    "carrierName": "FastFreight",
    "pickupLocation": "NYC",
    "deliveryLocation": "LA",
    "status": "Pending",
    "rate": 1200.0,
    "estimatedDelivery": null,
    "createdAt": "2025-11-09T10:30:00.000Z",
    "updatedAt": "2025-11-09T10:30:00.000Z"
}))]
pub struct Shipment {
    /// Opaque record identifier
    pub id: String,
    /// Human-facing tracking code, assigned once at creation
    pub tracking_id: String,
    pub shipper_name: String,
    pub carrier_name: String,
    pub pickup_location: String,
    pub delivery_location: String,
    /// One of Pending, InTransit, Delivered, Cancelled
    pub status: String,
    pub rate: f64,
    /// RFC 3339, null when no estimate was given
    pub estimated_delivery: Option<String>,
    /// RFC 3339, null on records predating timestamping
    pub created_at: Option<String>,
    /// RFC 3339, null on records predating timestamping
    pub updated_at: Option<String>,
}

/// One dashboard bucket: how many shipments and how much money they move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusBucket {
    pub count: u64,
    pub total_value: f64,
}

/// Dashboard aggregate over the whole shipment collection. Cancelled
/// shipments count toward `total` but have no bucket of their own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub total: StatusBucket,
    pub pending: StatusBucket,
    pub transit: StatusBucket,
    pub delivered: StatusBucket,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_parse_accepts_only_canonical_labels() {
        assert_eq!("InTransit".parse::<ShipmentStatus>(), Ok(ShipmentStatus::InTransit));
        assert!("In Transit".parse::<ShipmentStatus>().is_err());
        assert!("pending".parse::<ShipmentStatus>().is_err());
        assert!("Lost".parse::<ShipmentStatus>().is_err());
    }

    #[test]
    fn loose_parse_tolerates_legacy_casing_and_spacing() {
        assert_eq!(ShipmentStatus::parse_loose("In Transit"), Some(ShipmentStatus::InTransit));
        assert_eq!(ShipmentStatus::parse_loose(" pending "), Some(ShipmentStatus::Pending));
        assert_eq!(ShipmentStatus::parse_loose("DELIVERED"), Some(ShipmentStatus::Delivered));
        assert_eq!(ShipmentStatus::parse_loose("cancel led"), Some(ShipmentStatus::Cancelled));
        assert_eq!(ShipmentStatus::parse_loose("unknown"), None);
    }
}
