use bson::{doc, Bson, Document};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::options::{FindOptions, ReturnDocument};
use mongodb::{Collection, Database};
use tracing::instrument;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::shipment::{self, DashboardStats, Shipment, ShipmentStatus};
use crate::normalize;
use crate::services::parse_object_id;

/// Fields the list operation may sort by. Anything else falls back to
/// `createdAt` so callers cannot reach unsupported or internal fields.
const SORTABLE_FIELDS: &[&str] = &[
    "createdAt",
    "updatedAt",
    "rate",
    "status",
    "shipperName",
    "carrierName",
];
const DEFAULT_SORT_FIELD: &str = "createdAt";

/// Sort direction for the list operation; anything that is not explicitly
/// ascending sorts newest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if value.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    fn direction(self) -> i32 {
        match self {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        }
    }
}

pub(crate) fn resolve_sort_field(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|field| SORTABLE_FIELDS.iter().find(|allowed| **allowed == field))
        .copied()
        .unwrap_or(DEFAULT_SORT_FIELD)
}

/// Tracking codes are generated server-side, once, from random entropy;
/// caller-supplied values are never honored.
pub(crate) fn new_tracking_code() -> String {
    let entropy = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("TRK-{}", &entropy[..12])
}

/// Fields of a shipment the caller controls at creation time. Status and
/// tracking code are deliberately absent; the service assigns both.
#[derive(Debug, Clone)]
pub struct NewShipment {
    pub shipper_name: String,
    pub carrier_name: String,
    pub pickup_location: String,
    pub delivery_location: String,
    pub rate: f64,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

/// Service for managing shipments
#[derive(Clone)]
pub struct ShipmentService {
    collection: Collection<Document>,
}

impl ShipmentService {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(shipment::COLLECTION),
        }
    }

    /// Lists shipments with pagination, optional status filter and
    /// allow-listed sorting. The page read and the filtered count run
    /// concurrently over the identical filter so `total` matches `data`.
    #[instrument(skip(self))]
    pub async fn list_shipments(
        &self,
        page: u64,
        limit: u64,
        status: Option<ShipmentStatus>,
        sort_by: Option<&str>,
        sort_order: SortOrder,
    ) -> Result<(Vec<Shipment>, u64), ServiceError> {
        let filter = match status {
            Some(status) => doc! { "status": status.as_str() },
            None => doc! {},
        };

        let mut options = FindOptions::default();
        options.sort = Some(doc! { resolve_sort_field(sort_by): sort_order.direction() });
        options.skip = Some((page - 1) * limit);
        options.limit = Some(limit as i64);

        let find = async {
            self.collection
                .find(filter.clone())
                .with_options(options)
                .await
                .map_err(ServiceError::db_error)?
                .try_collect::<Vec<Document>>()
                .await
                .map_err(ServiceError::db_error)
        };
        let count = async {
            self.collection
                .count_documents(filter.clone())
                .await
                .map_err(ServiceError::db_error)
        };
        let (docs, total) = tokio::try_join!(find, count)?;

        Ok((docs.iter().map(normalize::shipment).collect(), total))
    }

    /// Gets a shipment by id
    #[instrument(skip(self))]
    pub async fn get_shipment(&self, id: &str) -> Result<Shipment, ServiceError> {
        let oid = parse_object_id(id, "Shipment")?;
        let doc = self
            .collection
            .find_one(doc! { "_id": oid })
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Shipment {} not found", id)))?;

        Ok(normalize::shipment(&doc))
    }

    /// Creates a shipment. The tracking code is generated here and the
    /// status forced to Pending, whatever the caller asked for; timestamps
    /// are server-assigned.
    #[instrument(skip(self, input))]
    pub async fn create_shipment(&self, input: NewShipment) -> Result<Shipment, ServiceError> {
        let now = bson::DateTime::from_chrono(Utc::now());
        let tracking_id = new_tracking_code();

        let document = doc! {
            "trackingId": tracking_id,
            "shipperName": input.shipper_name,
            "carrierName": input.carrier_name,
            "pickupLocation": input.pickup_location,
            "deliveryLocation": input.delivery_location,
            "status": ShipmentStatus::Pending.as_str(),
            "rate": input.rate,
            "estimatedDelivery": input.estimated_delivery.map(bson::DateTime::from_chrono),
            "createdAt": now,
            "updatedAt": now,
        };

        let result = self
            .collection
            .insert_one(document.clone())
            .await
            .map_err(|e| ServiceError::insert_error(e, "tracking code"))?;

        let mut stored = document;
        stored.insert("_id", result.inserted_id);
        Ok(normalize::shipment(&stored))
    }

    /// Overwrites only the status field and bumps the modification
    /// timestamp; every other field keeps its value.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: &str,
        status: ShipmentStatus,
    ) -> Result<Shipment, ServiceError> {
        let oid = parse_object_id(id, "Shipment")?;
        let updated = self
            .collection
            .find_one_and_update(
                doc! { "_id": oid },
                doc! { "$set": {
                    "status": status.as_str(),
                    "updatedAt": bson::DateTime::from_chrono(Utc::now()),
                } },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Shipment {} not found", id)))?;

        Ok(normalize::shipment(&updated))
    }

    /// Hard-deletes a shipment; there is no tombstone to recover from.
    #[instrument(skip(self))]
    pub async fn delete_shipment(&self, id: &str) -> Result<bool, ServiceError> {
        let oid = parse_object_id(id, "Shipment")?;
        let result = self
            .collection
            .delete_one(doc! { "_id": oid })
            .await
            .map_err(ServiceError::db_error)?;

        if result.deleted_count == 0 {
            return Err(ServiceError::NotFound(format!("Shipment {} not found", id)));
        }
        Ok(true)
    }

    /// Scans the whole collection and folds it into the dashboard buckets.
    /// Bounded by fleet size; acceptable at this system's scale.
    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ServiceError> {
        let docs = self
            .collection
            .find(doc! {})
            .await
            .map_err(ServiceError::db_error)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(ServiceError::db_error)?;

        Ok(accumulate_stats(&docs))
    }
}

/// Pure reduce over shipment documents. Rates are coerced and statuses
/// canonicalized per record; Cancelled (and unrecognized legacy statuses)
/// count toward the total bucket only.
pub(crate) fn accumulate_stats(docs: &[Document]) -> DashboardStats {
    let mut stats = DashboardStats::default();

    for doc in docs {
        let value = normalize::coerce_rate(doc.get("rate"));
        stats.total.count += 1;
        stats.total.total_value += value;

        let status = doc
            .get("status")
            .and_then(Bson::as_str)
            .and_then(ShipmentStatus::parse_loose);
        let bucket = match status {
            Some(ShipmentStatus::Pending) => &mut stats.pending,
            Some(ShipmentStatus::InTransit) => &mut stats.transit,
            Some(ShipmentStatus::Delivered) => &mut stats.delivered,
            Some(ShipmentStatus::Cancelled) | None => continue,
        };
        bucket.count += 1;
        bucket.total_value += value;
    }

    stats
}
