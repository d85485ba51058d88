//! sled backed repository for warehouses, stock entries and transfers
//!
//! Every multi-record write goes through [`Store::atomically`], a sled transaction
//! spanning all three trees. sled re-runs the closure when a concurrent commit
//! conflicts with it, so checks made inside the closure hold at commit time.
use super::error::TransferError;
use super::transfer::TransferRecord;
use super::types::{TransferId, WarehouseId};
use super::utils::{from_cbor, to_cbor};
use super::warehouse::Warehouse;
use sled::Transactional;
use sled::transaction::{
    ConflictableTransactionError, ConflictableTransactionResult, TransactionalTree,
};
use std::sync::Arc;

const WAREHOUSES: &str = "warehouses";
const STOCK: &str = "stock";
const TRANSFERS: &str = "transfers";

pub type UnitResult<T> = ConflictableTransactionResult<T, TransferError>;

/// Lift a domain result into the transaction, aborting on error.
pub fn abort_on<T>(result: Result<T, TransferError>) -> UnitResult<T> {
    result.map_err(ConflictableTransactionError::Abort)
}

#[derive(Clone)]
pub struct Store {
    instance: Arc<sled::Db>,
    warehouses: sled::Tree,
    stock: sled::Tree,
    transfers: sled::Tree,
}

/// Transactional view handed to [`Store::atomically`] closures.
pub struct UnitOfWork<'a> {
    pub warehouses: &'a TransactionalTree,
    pub stock: &'a TransactionalTree,
    pub transfers: &'a TransactionalTree,
}

impl Store {
    pub fn open(instance: Arc<sled::Db>) -> Result<Self, TransferError> {
        let warehouses = instance.open_tree(WAREHOUSES)?;
        let stock = instance.open_tree(STOCK)?;
        let transfers = instance.open_tree(TRANSFERS)?;

        Ok(Self {
            instance,
            warehouses,
            stock,
            transfers,
        })
    }

    pub(crate) fn stock_tree(&self) -> &sled::Tree {
        &self.stock
    }

    /// Run `f` as one all-or-nothing unit. Either every write it staged is
    /// committed or, on abort or storage failure, none is.
    pub fn atomically<T, F>(&self, f: F) -> Result<T, TransferError>
    where
        F: Fn(&UnitOfWork<'_>) -> UnitResult<T>,
    {
        let out = (&self.warehouses, &self.stock, &self.transfers).transaction(
            |(warehouses, stock, transfers)| {
                f(&UnitOfWork {
                    warehouses,
                    stock,
                    transfers,
                })
            },
        )?;
        Ok(out)
    }

    pub fn get_transfer(&self, id: &TransferId) -> Result<Option<TransferRecord>, TransferError> {
        match self.transfers.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(from_cbor(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn transfers(&self) -> Result<Vec<TransferRecord>, TransferError> {
        self.transfers
            .iter()
            .values()
            .map(|value| from_cbor(&value?))
            .collect()
    }

    pub fn get_warehouse(&self, id: &WarehouseId) -> Result<Option<Warehouse>, TransferError> {
        match self.warehouses.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(from_cbor(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn warehouses(&self) -> Result<Vec<Warehouse>, TransferError> {
        self.warehouses
            .iter()
            .values()
            .map(|value| from_cbor(&value?))
            .collect()
    }

    pub fn flush(&self) -> Result<usize, TransferError> {
        Ok(self.instance.flush()?)
    }
}

impl UnitOfWork<'_> {
    pub fn load_transfer(&self, id: &TransferId) -> UnitResult<Option<TransferRecord>> {
        match self.transfers.get(id.as_bytes())? {
            Some(bytes) => abort_on(from_cbor(&bytes)).map(Some),
            None => Ok(None),
        }
    }

    pub fn save_transfer(&self, record: &TransferRecord) -> UnitResult<()> {
        let value = abort_on(to_cbor(record))?;
        self.transfers.insert(record.id.as_bytes(), value)?;
        Ok(())
    }

    pub fn load_warehouse(&self, id: &WarehouseId) -> UnitResult<Option<Warehouse>> {
        match self.warehouses.get(id.as_bytes())? {
            Some(bytes) => abort_on(from_cbor(&bytes)).map(Some),
            None => Ok(None),
        }
    }

    /// Abort with NotFound unless `id` is registered.
    pub fn require_warehouse(&self, id: &WarehouseId) -> UnitResult<Warehouse> {
        match self.load_warehouse(id)? {
            Some(warehouse) => Ok(warehouse),
            None => Err(ConflictableTransactionError::Abort(
                TransferError::warehouse_not_found(id),
            )),
        }
    }

    pub fn save_warehouse(&self, warehouse: &Warehouse) -> UnitResult<()> {
        let value = abort_on(to_cbor(warehouse))?;
        self.warehouses.insert(warehouse.id.as_bytes(), value)?;
        Ok(())
    }
}
