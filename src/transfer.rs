//! Transfer records and their append-only status history
use super::error::{TransferError, ValidationError};
use super::types::{TimeStamp, TransferId, WarehouseId};
use chrono::Utc;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, minicbor::Encode, minicbor::Decode)]
pub enum TransferStatus {
    #[n(0)]
    Pending,
    /// Reserved. Listed by the dashboard filters but nothing transitions into it.
    #[n(1)]
    InTransit,
    #[n(2)]
    Completed,
    #[n(3)]
    Cancelled,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "PENDING",
            TransferStatus::InTransit => "IN_TRANSIT",
            TransferStatus::Completed => "COMPLETED",
            TransferStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Completed | TransferStatus::Cancelled)
    }

    /// The only edges are PENDING -> COMPLETED and PENDING -> CANCELLED.
    pub fn can_transition_to(&self, next: TransferStatus) -> bool {
        matches!(
            (self, next),
            (
                TransferStatus::Pending,
                TransferStatus::Completed | TransferStatus::Cancelled
            )
        )
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(TransferStatus::Pending),
            "IN_TRANSIT" => Ok(TransferStatus::InTransit),
            "COMPLETED" => Ok(TransferStatus::Completed),
            "CANCELLED" => Ok(TransferStatus::Cancelled),
            _ => Err(ValidationError::UnknownStatus(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct HistoryEntry {
    #[n(0)]
    pub seq: u32, // commit order, breaks ties between equal timestamps
    #[n(1)]
    pub status: TransferStatus,
    #[n(2)]
    pub timestamp: TimeStamp<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct TransferRecord {
    #[n(0)]
    pub id: TransferId,
    #[n(1)]
    pub from_warehouse_id: WarehouseId,
    #[n(2)]
    pub to_warehouse_id: WarehouseId,
    #[n(3)]
    pub product_name: String,
    #[n(4)]
    pub quantity: u64,
    #[n(5)]
    pub status: TransferStatus,
    #[n(6)]
    pub history: Vec<HistoryEntry>,
}

impl TransferRecord {
    /// A fresh PENDING record whose history holds the creation entry.
    pub fn new(
        id: TransferId,
        from_warehouse_id: WarehouseId,
        to_warehouse_id: WarehouseId,
        product_name: String,
        quantity: u64,
    ) -> Self {
        Self {
            id,
            from_warehouse_id,
            to_warehouse_id,
            product_name,
            quantity,
            status: TransferStatus::Pending,
            history: vec![HistoryEntry {
                seq: 0,
                status: TransferStatus::Pending,
                timestamp: TimeStamp::new(),
            }],
        }
    }

    pub fn current_state(&self) -> TransferStatus {
        self.status
    }

    pub fn created_at(&self) -> Option<&TimeStamp<Utc>> {
        self.history.first().map(|entry| &entry.timestamp)
    }

    /// Move to `next` and append the matching history entry.
    ///
    /// Leaves the record untouched when the edge is not allowed.
    pub fn advance(&mut self, next: TransferStatus) -> Result<(), TransferError> {
        if !self.status.can_transition_to(next) {
            return Err(TransferError::InvalidTransition {
                id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }

        let seq = self.history.last().map_or(0, |entry| entry.seq + 1);
        self.status = next;
        self.history.push(HistoryEntry {
            seq,
            status: next,
            timestamp: TimeStamp::new(),
        });

        Ok(())
    }

    pub fn statuses(&self) -> Vec<TransferStatus> {
        self.history.iter().map(|entry| entry.status).collect()
    }

    pub fn view_history(&self) {
        for entry in &self.history {
            tracing::info!(
                transfer = %self.id,
                seq = entry.seq,
                status = %entry.status,
                at = %entry.timestamp,
                "history"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> TransferRecord {
        TransferRecord::new(
            TransferId::from("xfer_test"),
            WarehouseId::from("wh_a"),
            WarehouseId::from("wh_b"),
            "Widget".into(),
            20,
        )
    }

    #[test]
    fn new_record_starts_pending_with_one_entry() {
        let record = pending();
        assert_eq!(record.current_state(), TransferStatus::Pending);
        assert_eq!(record.statuses(), vec![TransferStatus::Pending]);
        assert_eq!(record.history[0].seq, 0);
    }

    #[test]
    fn advance_appends_history() {
        let mut record = pending();
        record.advance(TransferStatus::Cancelled).unwrap();

        assert_eq!(record.current_state(), TransferStatus::Cancelled);
        assert_eq!(
            record.statuses(),
            vec![TransferStatus::Pending, TransferStatus::Cancelled]
        );
        assert_eq!(record.history[1].seq, 1);
    }

    #[test]
    fn terminal_records_refuse_every_transition() {
        let mut record = pending();
        record.advance(TransferStatus::Completed).unwrap();
        let before = record.clone();

        for next in [
            TransferStatus::Pending,
            TransferStatus::InTransit,
            TransferStatus::Completed,
            TransferStatus::Cancelled,
        ] {
            let err = record.advance(next).unwrap_err();
            assert!(matches!(err, TransferError::InvalidTransition { .. }));
        }
        assert_eq!(record, before);
    }

    #[test]
    fn in_transit_is_unreachable() {
        let mut record = pending();
        assert!(record.advance(TransferStatus::InTransit).is_err());
        assert!(record.advance(TransferStatus::Pending).is_err());
        assert_eq!(record.statuses(), vec![TransferStatus::Pending]);
    }

    #[test]
    fn parses_wire_status_names() {
        assert_eq!(
            "completed".parse::<TransferStatus>(),
            Ok(TransferStatus::Completed)
        );
        assert_eq!(
            "IN_TRANSIT".parse::<TransferStatus>(),
            Ok(TransferStatus::InTransit)
        );
        assert_eq!(
            "SHIPPED".parse::<TransferStatus>(),
            Err(ValidationError::UnknownStatus("SHIPPED".into()))
        );
    }

    #[test]
    fn record_cbor_roundtrip() {
        let mut record = pending();
        record.advance(TransferStatus::Completed).unwrap();

        let encoded = minicbor::to_vec(&record).unwrap();
        let decoded: TransferRecord = minicbor::decode(&encoded).unwrap();

        assert_eq!(record, decoded);
    }
}
