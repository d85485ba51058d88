//! Service layer API consumed by the HTTP glue
//!
//! Takes request values as they arrive (string ids, signed quantities, status
//! names) and turns them into typed calls on the engine and ledger.
use super::config::{AppConfig, TransferPolicy};
use super::engine::TransferEngine;
use super::error::{TransferError, ValidationError};
use super::ledger::{StockEntry, StockLedger};
use super::store::Store;
use super::transfer::{TransferRecord, TransferStatus};
use super::types::{TransferId, WarehouseId};
use super::warehouse::Warehouse;
use std::collections::HashMap;
use std::sync::Arc;

/// A transfer with both warehouse records attached, as the transfer list shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferView {
    pub record: TransferRecord,
    pub from_warehouse: Warehouse,
    pub to_warehouse: Warehouse,
}

/// A stock row with its warehouse record attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockView {
    pub entry: StockEntry,
    pub warehouse: Warehouse,
}

fn positive_quantity(quantity: i64) -> Result<u64, ValidationError> {
    match u64::try_from(quantity) {
        Ok(quantity) if quantity > 0 => Ok(quantity),
        _ => Err(ValidationError::NonPositiveQuantity(quantity)),
    }
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(value)
}

pub struct InventoryService {
    store: Store,
    engine: TransferEngine,
    ledger: StockLedger,
}

impl InventoryService {
    pub fn new(instance: Arc<sled::Db>, policy: TransferPolicy) -> Result<Self, TransferError> {
        let store = Store::open(instance)?;
        let ledger = StockLedger::new(&store);
        let engine = TransferEngine::new(store.clone(), policy);

        Ok(Self {
            store,
            engine,
            ledger,
        })
    }

    /// Open the configured database and build the service on top of it.
    pub fn open(config: &AppConfig) -> Result<Self, TransferError> {
        let db = config.storage.open()?;
        tracing::info!(
            path = %config.storage.path,
            temporary = config.storage.temporary,
            "storage opened"
        );
        Self::new(Arc::new(db), config.transfers.clone())
    }

    pub fn engine(&self) -> &TransferEngine {
        &self.engine
    }

    pub fn ledger(&self) -> &StockLedger {
        &self.ledger
    }

    pub fn create_warehouse(&self, name: &str, location: &str) -> Result<Warehouse, TransferError> {
        let warehouse = Warehouse::new(WarehouseId::generate()?, name, location)?;
        self.store.atomically(|uow| uow.save_warehouse(&warehouse))?;

        tracing::info!(warehouse = %warehouse.id, name = %warehouse.name, "warehouse registered");
        Ok(warehouse)
    }

    pub fn get_warehouse(&self, id: &str) -> Result<Warehouse, TransferError> {
        let id = WarehouseId::from(required(id, "warehouse_id")?);
        self.store
            .get_warehouse(&id)?
            .ok_or_else(|| TransferError::warehouse_not_found(&id))
    }

    pub fn list_warehouses(&self) -> Result<Vec<Warehouse>, TransferError> {
        self.store.warehouses()
    }

    /// Credit stock into a registered warehouse.
    pub fn add_stock(
        &self,
        warehouse_id: &str,
        product_name: &str,
        quantity: i64,
    ) -> Result<StockEntry, TransferError> {
        let warehouse_id = WarehouseId::from(required(warehouse_id, "warehouse_id")?);
        let product_name = required(product_name, "product_name")?;
        let quantity = positive_quantity(quantity)?;

        self.store.atomically(|uow| {
            uow.require_warehouse(&warehouse_id)?;
            StockLedger::credit_in(uow.stock, &warehouse_id, product_name, quantity)
        })
    }

    /// Stock rows, optionally for one warehouse, each joined with its warehouse.
    pub fn list_stock(&self, warehouse_id: Option<&str>) -> Result<Vec<StockView>, TransferError> {
        let entries = match warehouse_id {
            Some(id) => {
                let id = WarehouseId::from(required(id, "warehouse_id")?);
                self.ledger.query(&id)?
            }
            None => self.ledger.all()?,
        };
        let warehouses = self.warehouse_index()?;

        entries
            .into_iter()
            .map(|entry| {
                let warehouse = warehouses
                    .get(&entry.warehouse_id)
                    .cloned()
                    .ok_or_else(|| TransferError::warehouse_not_found(&entry.warehouse_id));
                warehouse.map(|warehouse| StockView { entry, warehouse })
            })
            .collect()
    }

    pub fn create_transfer(
        &self,
        from_warehouse_id: &str,
        to_warehouse_id: &str,
        product_name: &str,
        quantity: i64,
    ) -> Result<TransferRecord, TransferError> {
        let from = WarehouseId::from(required(from_warehouse_id, "from_warehouse_id")?);
        let to = WarehouseId::from(required(to_warehouse_id, "to_warehouse_id")?);
        let product_name = required(product_name, "product_name")?;
        let quantity = positive_quantity(quantity)?;

        self.engine.create(from, to, product_name, quantity)
    }

    pub fn set_transfer_status(
        &self,
        transfer_id: &str,
        status: &str,
    ) -> Result<TransferRecord, TransferError> {
        let id = TransferId::from(required(transfer_id, "transfer_id")?);
        let status: TransferStatus = required(status, "status")?.parse()?;

        self.engine.transition(&id, status)
    }

    pub fn get_transfer(&self, transfer_id: &str) -> Result<TransferView, TransferError> {
        let id = TransferId::from(required(transfer_id, "transfer_id")?);
        let record = self.engine.get(&id)?;
        let warehouses = self.warehouse_index()?;
        Self::attach(record, &warehouses)
    }

    pub fn list_transfers(&self) -> Result<Vec<TransferView>, TransferError> {
        let warehouses = self.warehouse_index()?;
        self.engine
            .list()?
            .into_iter()
            .map(|record| Self::attach(record, &warehouses))
            .collect()
    }

    pub fn flush(&self) -> Result<usize, TransferError> {
        self.store.flush()
    }

    fn warehouse_index(&self) -> Result<HashMap<WarehouseId, Warehouse>, TransferError> {
        Ok(self
            .store
            .warehouses()?
            .into_iter()
            .map(|warehouse| (warehouse.id.clone(), warehouse))
            .collect())
    }

    fn attach(
        record: TransferRecord,
        warehouses: &HashMap<WarehouseId, Warehouse>,
    ) -> Result<TransferView, TransferError> {
        let lookup = |id: &WarehouseId| {
            warehouses
                .get(id)
                .cloned()
                .ok_or_else(|| TransferError::warehouse_not_found(id))
        };

        Ok(TransferView {
            from_warehouse: lookup(&record.from_warehouse_id)?,
            to_warehouse: lookup(&record.to_warehouse_id)?,
            record,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantities_must_be_positive() {
        assert_eq!(positive_quantity(3), Ok(3));
        assert_eq!(
            positive_quantity(0),
            Err(ValidationError::NonPositiveQuantity(0))
        );
        assert_eq!(
            positive_quantity(-4),
            Err(ValidationError::NonPositiveQuantity(-4))
        );
    }

    #[test]
    fn blank_values_are_missing() {
        assert_eq!(required(" id ", "id"), Ok("id"));
        assert_eq!(required("   ", "id"), Err(ValidationError::MissingField("id")));
    }
}
