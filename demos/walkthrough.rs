//! Walks one transfer through its lifecycle against a throwaway database.
//!
//! cargo run --example walkthrough -- config/default.yaml

use stock_transfer::InventoryService;
use stock_transfer::config::AppConfig;
use stock_transfer::logging::init_logging;

fn main() -> anyhow::Result<()> {
    let mut config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    // never write the demo into a real data directory
    config.storage.temporary = true;

    init_logging(&config)?;

    let service = InventoryService::open(&config)?;

    let leeds = service.create_warehouse("North", "Leeds")?;
    let bristol = service.create_warehouse("South", "Bristol")?;
    service.add_stock(leeds.id.as_str(), "Widget", 50)?;

    let transfer = service.create_transfer(leeds.id.as_str(), bristol.id.as_str(), "Widget", 20)?;
    let transfer = service.set_transfer_status(transfer.id.as_str(), "COMPLETED")?;
    transfer.view_history();

    // a second transfer that the source cannot cover stays PENDING
    let short = service.create_transfer(leeds.id.as_str(), bristol.id.as_str(), "Widget", 40)?;
    if let Err(err) = service.set_transfer_status(short.id.as_str(), "COMPLETED") {
        tracing::warn!(%err, "completion refused");
    }
    service.set_transfer_status(short.id.as_str(), "CANCELLED")?;

    for view in service.list_stock(None)? {
        tracing::info!(
            warehouse = %view.warehouse.name,
            product = %view.entry.product_name,
            quantity = view.entry.quantity,
            "stock"
        );
    }
    for view in service.list_transfers()? {
        tracing::info!(
            transfer = %view.record.id,
            from = %view.from_warehouse.name,
            to = %view.to_warehouse.name,
            status = %view.record.status,
            "transfer"
        );
    }

    Ok(())
}
