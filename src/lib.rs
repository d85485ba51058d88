//! Warehouse stock ledger with an auditable transfer workflow.
//!
//! A transfer is created PENDING and ends COMPLETED or CANCELLED. Completing it
//! moves stock from the source warehouse to the destination in one sled
//! transaction together with the status change, see [`engine::TransferEngine`].

pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod service;
pub mod store;
pub mod transfer;
pub mod types;
pub mod utils;
pub mod warehouse;

pub use engine::TransferEngine;
pub use error::{TransferError, ValidationError};
pub use ledger::{StockEntry, StockLedger};
pub use service::{InventoryService, StockView, TransferView};
pub use transfer::{HistoryEntry, TransferRecord, TransferStatus};
pub use types::{TransferId, WarehouseId};
pub use warehouse::Warehouse;
