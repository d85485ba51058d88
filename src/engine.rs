//! Transfer state machine
//!
//! PENDING -> COMPLETED | CANCELLED. Completing debits the source ledger and
//! credits the destination in the same unit of work that flips the status, so
//! a transfer's stock effect is applied exactly once or not at all.
use super::config::TransferPolicy;
use super::error::{TransferError, ValidationError};
use super::ledger::StockLedger;
use super::store::{Store, abort_on};
use super::transfer::{TransferRecord, TransferStatus};
use super::types::{TransferId, WarehouseId};
use sled::transaction::ConflictableTransactionError;

pub struct TransferEngine {
    store: Store,
    policy: TransferPolicy,
}

impl TransferEngine {
    pub fn new(store: Store, policy: TransferPolicy) -> Self {
        Self { store, policy }
    }

    fn validate_request(
        &self,
        from: &WarehouseId,
        to: &WarehouseId,
        product_name: &str,
        quantity: u64,
    ) -> Result<(), ValidationError> {
        if from.as_str().is_empty() {
            return Err(ValidationError::MissingField("from_warehouse_id"));
        }
        if to.as_str().is_empty() {
            return Err(ValidationError::MissingField("to_warehouse_id"));
        }
        if product_name.is_empty() {
            return Err(ValidationError::MissingField("product_name"));
        }
        if quantity == 0 {
            return Err(ValidationError::NonPositiveQuantity(0));
        }
        if self.policy.reject_same_warehouse && from == to {
            return Err(ValidationError::SameWarehouse(from.clone()));
        }
        Ok(())
    }

    /// Persist a new PENDING transfer. Stock is not reserved here.
    pub fn create(
        &self,
        from: WarehouseId,
        to: WarehouseId,
        product_name: &str,
        quantity: u64,
    ) -> Result<TransferRecord, TransferError> {
        let product_name = product_name.trim();
        self.validate_request(&from, &to, product_name, quantity)?;

        let record = TransferRecord::new(
            TransferId::generate()?,
            from,
            to,
            product_name.to_owned(),
            quantity,
        );

        self.store.atomically(|uow| {
            uow.require_warehouse(&record.from_warehouse_id)?;
            uow.require_warehouse(&record.to_warehouse_id)?;
            uow.save_transfer(&record)
        })?;

        tracing::info!(
            transfer = %record.id,
            from = %record.from_warehouse_id,
            to = %record.to_warehouse_id,
            product = %record.product_name,
            quantity = record.quantity,
            "transfer created"
        );
        Ok(record)
    }

    /// Move a PENDING transfer to COMPLETED or CANCELLED.
    ///
    /// The status is re-read inside the unit of work, so of two racing
    /// completions exactly one applies the ledger mutation and the other gets
    /// `InvalidTransition`.
    pub fn transition(
        &self,
        id: &TransferId,
        next: TransferStatus,
    ) -> Result<TransferRecord, TransferError> {
        let result = self.store.atomically(|uow| {
            let mut record = match uow.load_transfer(id)? {
                Some(record) => record,
                None => {
                    return Err(ConflictableTransactionError::Abort(
                        TransferError::transfer_not_found(id),
                    ));
                }
            };

            abort_on(record.advance(next))?;

            if next == TransferStatus::Completed {
                StockLedger::debit_in(
                    uow.stock,
                    &record.from_warehouse_id,
                    &record.product_name,
                    record.quantity,
                )?;
                StockLedger::credit_in(
                    uow.stock,
                    &record.to_warehouse_id,
                    &record.product_name,
                    record.quantity,
                )?;
            }

            uow.save_transfer(&record)?;
            Ok(record)
        });

        match &result {
            Ok(record) => {
                tracing::info!(transfer = %id, status = %record.status, "transfer updated")
            }
            Err(err) => {
                tracing::warn!(
                    transfer = %id,
                    requested = %next,
                    error = %err,
                    "transition rejected"
                )
            }
        }
        result
    }

    pub fn get(&self, id: &TransferId) -> Result<TransferRecord, TransferError> {
        self.store
            .get_transfer(id)?
            .ok_or_else(|| TransferError::transfer_not_found(id))
    }

    /// All transfers, oldest first.
    pub fn list(&self) -> Result<Vec<TransferRecord>, TransferError> {
        let mut records = self.store.transfers()?;
        records.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(records)
    }
}
