//! Per (warehouse, product) stock quantities
//!
//! Quantities only move through [`StockLedger::credit_in`] and
//! [`StockLedger::debit_in`], which run inside a sled transaction so the
//! sufficiency check and the write commit together.
use super::error::{TransferError, ValidationError};
use super::store::{Store, UnitResult, abort_on};
use super::types::WarehouseId;
use super::utils::{from_cbor, to_cbor};
use sled::transaction::{ConflictableTransactionError, TransactionalTree};

// warehouse ids are bech32 text, they never contain a NUL byte
const KEY_SEPARATOR: u8 = 0;

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct StockEntry {
    #[n(0)]
    pub warehouse_id: WarehouseId,
    #[n(1)]
    pub product_name: String,
    #[n(2)]
    pub quantity: u64,
}

fn warehouse_prefix(warehouse_id: &WarehouseId) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(warehouse_id.as_bytes().len() + 1);
    prefix.extend_from_slice(warehouse_id.as_bytes());
    prefix.push(KEY_SEPARATOR);
    prefix
}

pub fn stock_key(warehouse_id: &WarehouseId, product_name: &str) -> Vec<u8> {
    let mut key = warehouse_prefix(warehouse_id);
    key.extend_from_slice(product_name.as_bytes());
    key
}

/// Returns the trimmed product name that keys the entry.
fn check_amount(product_name: &str, amount: u64) -> Result<&str, ValidationError> {
    let product_name = product_name.trim();
    if product_name.is_empty() {
        return Err(ValidationError::MissingField("product_name"));
    }
    if amount == 0 {
        return Err(ValidationError::NonPositiveQuantity(0));
    }
    Ok(product_name)
}

#[derive(Clone)]
pub struct StockLedger {
    stock: sled::Tree,
}

impl StockLedger {
    pub fn new(store: &Store) -> Self {
        Self {
            stock: store.stock_tree().clone(),
        }
    }

    fn load_in(
        tx: &TransactionalTree,
        warehouse_id: &WarehouseId,
        product_name: &str,
    ) -> UnitResult<Option<StockEntry>> {
        match tx.get(stock_key(warehouse_id, product_name))? {
            Some(bytes) => abort_on(from_cbor(&bytes)).map(Some),
            None => Ok(None),
        }
    }

    fn store_in(tx: &TransactionalTree, entry: &StockEntry) -> UnitResult<()> {
        let value = abort_on(to_cbor(entry))?;
        tx.insert(stock_key(&entry.warehouse_id, &entry.product_name), value)?;
        Ok(())
    }

    /// Add `amount` to the entry, creating it when the pair has never held stock.
    pub fn credit_in(
        tx: &TransactionalTree,
        warehouse_id: &WarehouseId,
        product_name: &str,
        amount: u64,
    ) -> UnitResult<StockEntry> {
        let product_name =
            abort_on(check_amount(product_name, amount).map_err(TransferError::from))?;

        let entry = match Self::load_in(tx, warehouse_id, product_name)? {
            Some(mut entry) => {
                entry.quantity = abort_on(entry.quantity.checked_add(amount).ok_or_else(|| {
                    TransferError::Internal(anyhow::anyhow!(
                        "quantity overflow for `{}` in {}",
                        product_name,
                        warehouse_id
                    ))
                }))?;
                entry
            }
            None => StockEntry {
                warehouse_id: warehouse_id.clone(),
                product_name: product_name.to_owned(),
                quantity: amount,
            },
        };
        Self::store_in(tx, &entry)?;

        tracing::debug!(
            warehouse = %warehouse_id,
            product = product_name,
            amount,
            quantity = entry.quantity,
            "credit"
        );
        Ok(entry)
    }

    /// Remove `amount` from the entry. A missing entry counts as zero.
    pub fn debit_in(
        tx: &TransactionalTree,
        warehouse_id: &WarehouseId,
        product_name: &str,
        amount: u64,
    ) -> UnitResult<StockEntry> {
        let product_name =
            abort_on(check_amount(product_name, amount).map_err(TransferError::from))?;

        let current = Self::load_in(tx, warehouse_id, product_name)?;
        let available = current.as_ref().map_or(0, |entry| entry.quantity);
        let (Some(mut entry), Some(remaining)) = (current, available.checked_sub(amount)) else {
            return Err(ConflictableTransactionError::Abort(
                TransferError::InsufficientStock {
                    warehouse: warehouse_id.clone(),
                    product: product_name.to_owned(),
                    available,
                    requested: amount,
                },
            ));
        };
        entry.quantity = remaining;
        Self::store_in(tx, &entry)?;

        tracing::debug!(
            warehouse = %warehouse_id,
            product = product_name,
            amount,
            quantity = entry.quantity,
            "debit"
        );
        Ok(entry)
    }

    pub fn credit(
        &self,
        warehouse_id: &WarehouseId,
        product_name: &str,
        amount: u64,
    ) -> Result<StockEntry, TransferError> {
        let entry = self
            .stock
            .transaction(|tx| Self::credit_in(tx, warehouse_id, product_name, amount))?;
        Ok(entry)
    }

    pub fn debit(
        &self,
        warehouse_id: &WarehouseId,
        product_name: &str,
        amount: u64,
    ) -> Result<StockEntry, TransferError> {
        let entry = self
            .stock
            .transaction(|tx| Self::debit_in(tx, warehouse_id, product_name, amount))?;
        Ok(entry)
    }

    /// Current quantity, zero when the pair has no entry.
    pub fn quantity(
        &self,
        warehouse_id: &WarehouseId,
        product_name: &str,
    ) -> Result<u64, TransferError> {
        match self.stock.get(stock_key(warehouse_id, product_name.trim()))? {
            Some(bytes) => Ok(from_cbor::<StockEntry>(&bytes)?.quantity),
            None => Ok(0),
        }
    }

    /// Every entry held by one warehouse. Advisory only, the debit at
    /// completion time is what decides.
    pub fn query(&self, warehouse_id: &WarehouseId) -> Result<Vec<StockEntry>, TransferError> {
        self.stock
            .scan_prefix(warehouse_prefix(warehouse_id))
            .values()
            .map(|value| from_cbor(&value?))
            .collect()
    }

    pub fn all(&self) -> Result<Vec<StockEntry>, TransferError> {
        self.stock
            .iter()
            .values()
            .map(|value| from_cbor(&value?))
            .collect()
    }
}
