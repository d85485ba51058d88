use super::transfer::TransferStatus;
use super::types::{TransferId, WarehouseId};
use sled::transaction::TransactionError;

/// Malformed or missing input. Never retried.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(i64),
    #[error("source and destination warehouse are both {0}")]
    SameWarehouse(WarehouseId),
    #[error("unknown transfer status `{0}`")]
    UnknownStatus(String),
}

#[derive(thiserror::Error, Debug)]
pub enum TransferError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{kind} `{id}` not found")]
    NotFound { kind: &'static str, id: String },
    #[error("transfer {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: TransferId,
        from: TransferStatus,
        to: TransferStatus,
    },
    #[error(
        "insufficient `{product}` in {warehouse}: {available} available, {requested} requested"
    )]
    InsufficientStock {
        warehouse: WarehouseId,
        product: String,
        available: u64,
        requested: u64,
    },
    #[error("storage failure: {0}")]
    Storage(#[from] sled::Error),
    #[error("failed to decode stored record: {0}")]
    Codec(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl TransferError {
    pub fn transfer_not_found(id: &TransferId) -> Self {
        Self::NotFound {
            kind: "transfer",
            id: id.to_string(),
        }
    }

    pub fn warehouse_not_found(id: &WarehouseId) -> Self {
        Self::NotFound {
            kind: "warehouse",
            id: id.to_string(),
        }
    }

    /// True for failures where retrying the same call cannot change the outcome.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound { .. } | Self::InvalidTransition { .. }
        )
    }
}

// An aborted unit of work carries the domain error; anything else is the store failing.
impl From<TransactionError<TransferError>> for TransferError {
    fn from(value: TransactionError<TransferError>) -> Self {
        match value {
            TransactionError::Abort(err) => err,
            TransactionError::Storage(err) => Self::Storage(err),
        }
    }
}
