//! Smoke screen unit tests for the shared building blocks
//!
//! Happy-path checks on identifiers, encodings and status parsing, kept apart
//! from the workflow scenarios.

use chrono::Utc;
use stock_transfer::{
    TransferStatus, WarehouseId,
    ledger::{StockEntry, stock_key},
    types::{TimeStamp, TransferId},
    utils::{from_cbor, new_uuid_to_bech32, to_cbor},
};

// UTILS MODULE TESTS
#[cfg(test)]
mod utils_tests {
    use super::*;

    /// new_uuid_to_bech32 keeps the human-readable prefix
    #[test]
    fn generates_valid_bech32_with_hrp() {
        let encoded = new_uuid_to_bech32("xfer_").unwrap();
        assert!(encoded.starts_with("xfer_1"));
        assert!(encoded.len() > 10);
    }

    #[test]
    fn handles_empty_hrp() {
        assert!(new_uuid_to_bech32("").is_err());
    }

    #[test]
    fn cbor_helpers_report_garbage() {
        let result = from_cbor::<StockEntry>(&[0xff, 0x00, 0x13]);
        assert!(result.is_err());
    }

    #[test]
    fn cbor_helpers_keep_entries_intact() {
        let entry = StockEntry {
            warehouse_id: WarehouseId::from("wh_a"),
            product_name: "Widget".into(),
            quantity: 7,
        };
        let bytes = to_cbor(&entry).unwrap();
        assert_eq!(from_cbor::<StockEntry>(&bytes).unwrap(), entry);
    }
}

// TYPES MODULE TESTS
#[cfg(test)]
mod types_tests {
    use super::*;

    #[test]
    fn timestamp_new_creates_current_time() {
        let ts = TimeStamp::new();
        let diff = (Utc::now() - ts.to_datetime_utc()).num_seconds().abs();
        assert!(diff < 1);
    }

    #[test]
    fn ids_display_as_their_text() {
        let id = TransferId::from("xfer_abc");
        assert_eq!(id.to_string(), "xfer_abc");
        assert_eq!(id.as_bytes(), b"xfer_abc");
    }
}

// LEDGER KEY TESTS
#[cfg(test)]
mod key_tests {
    use super::*;

    /// A warehouse whose id extends another's must not share its key prefix
    #[test]
    fn keys_separate_warehouse_from_product() {
        let short = stock_key(&WarehouseId::from("wh_a"), "bWidget");
        let long = stock_key(&WarehouseId::from("wh_ab"), "Widget");
        assert_ne!(short, long);
    }
}

// STATUS TESTS
#[cfg(test)]
mod status_tests {
    use super::*;

    #[test]
    fn only_completed_and_cancelled_are_terminal() {
        assert!(!TransferStatus::Pending.is_terminal());
        assert!(!TransferStatus::InTransit.is_terminal());
        assert!(TransferStatus::Completed.is_terminal());
        assert!(TransferStatus::Cancelled.is_terminal());
    }

    #[test]
    fn display_matches_wire_names() {
        for status in [
            TransferStatus::Pending,
            TransferStatus::InTransit,
            TransferStatus::Completed,
            TransferStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<TransferStatus>(), Ok(status));
        }
    }
}
