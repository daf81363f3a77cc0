//! Maps stored documents to their wire representation.
//!
//! Every record crosses through here before leaving the API. The mapping is
//! pure and idempotent: feeding a normalized record back in yields the same
//! result. The lenient rate/status/date handling exists because the write
//! path historically admitted strings and free-form casing; new writes are
//! canonical, so the fallbacks only fire on legacy records.
//! TODO: drop the lenient fallbacks once the legacy records have been
//! rewritten with canonical types.

use bson::{Bson, Document};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::models::shipment::{Shipment, ShipmentStatus};
use crate::models::user::UserProfile;
use crate::models::vehicle::Vehicle;

pub fn shipment(doc: &Document) -> Shipment {
    Shipment {
        id: record_id(doc),
        tracking_id: read_str(doc, "trackingId"),
        shipper_name: read_str(doc, "shipperName"),
        carrier_name: read_str(doc, "carrierName"),
        pickup_location: read_str(doc, "pickupLocation"),
        delivery_location: read_str(doc, "deliveryLocation"),
        status: canonical_status(doc.get("status")),
        rate: coerce_rate(doc.get("rate")),
        estimated_delivery: read_timestamp(doc.get("estimatedDelivery")),
        created_at: read_timestamp(doc.get("createdAt")),
        updated_at: read_timestamp(doc.get("updatedAt")),
    }
}

pub fn vehicle(doc: &Document) -> Vehicle {
    Vehicle {
        id: record_id(doc),
        plate_number: read_str(doc, "plateNumber"),
        vehicle_model: read_str(doc, "vehicleModel"),
        vehicle_type: read_str(doc, "type"),
        driver_name: read_str(doc, "driverName"),
        status: read_str(doc, "status"),
        current_location: read_str(doc, "currentLocation"),
    }
}

pub fn user_profile(doc: &Document) -> UserProfile {
    UserProfile {
        id: record_id(doc),
        name: read_str(doc, "name"),
        email: read_str(doc, "email"),
        role: read_str(doc, "role"),
    }
}

/// The store's internal identifier becomes the API's opaque `id`. An
/// already-normalized record carries it under `id` instead of `_id`.
fn record_id(doc: &Document) -> String {
    match doc.get("_id") {
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(Bson::String(s)) => s.clone(),
        _ => match doc.get("id") {
            Some(Bson::String(s)) => s.clone(),
            _ => String::new(),
        },
    }
}

fn read_str(doc: &Document, key: &str) -> String {
    match doc.get(key) {
        Some(Bson::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// Coerces a stored rate to a number. Legacy records hold comma-formatted
/// strings ("1,200.50"); unparseable values count as zero rather than
/// failing the whole read.
pub fn coerce_rate(value: Option<&Bson>) -> f64 {
    match value {
        Some(Bson::Double(v)) => *v,
        Some(Bson::Int32(v)) => f64::from(*v),
        Some(Bson::Int64(v)) => *v as f64,
        Some(Bson::String(raw)) => raw.trim().replace(',', "").parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Canonicalizes a stored status label. Unknown legacy values pass through
/// trimmed so the caller still sees what the record holds.
fn canonical_status(value: Option<&Bson>) -> String {
    let raw = match value {
        Some(Bson::String(s)) => s.as_str(),
        _ => return String::new(),
    };
    match ShipmentStatus::parse_loose(raw) {
        Some(status) => status.as_str().to_string(),
        None => raw.trim().to_string(),
    }
}

/// Serializes a stored timestamp to RFC 3339. Accepts native datetimes and
/// RFC 3339 strings; anything absent or unreadable maps to an explicit null.
fn read_timestamp(value: Option<&Bson>) -> Option<String> {
    let dt: DateTime<Utc> = match value {
        Some(Bson::DateTime(dt)) => dt.to_chrono(),
        Some(Bson::String(raw)) => DateTime::parse_from_rfc3339(raw)
            .ok()?
            .with_timezone(&Utc),
        _ => return None,
    };
    Some(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}
