use bson::oid::ObjectId;

use crate::errors::ServiceError;

pub mod shipments;
pub mod users;
pub mod vehicles;

/// Parses a caller-supplied id into a store identifier. An id the store
/// could never have issued cannot match any record, so it reports NotFound
/// rather than a validation failure.
pub(crate) fn parse_object_id(id: &str, what: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(id).map_err(|_| ServiceError::NotFound(format!("{} {} not found", what, id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_ids_report_not_found() {
        let err = parse_object_id("not-an-id", "Shipment").unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        assert!(parse_object_id("675a1f0c8b3e4d2a91c04e77", "Shipment").is_ok());
    }
}
