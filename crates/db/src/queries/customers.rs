use boxoffice_store::KvStore;
use boxoffice_types::{CustomerInfo, Result};

use crate::codec::{from_item, to_item};
use crate::tables;

/// Customer payment metadata for an order
pub async fn find_by_order(kv: &dyn KvStore, order_id: &str) -> Result<Option<CustomerInfo>> {
    let item = kv.get(tables::CUSTOMER_INFO, order_id).await?;
    item.map(from_item).transpose()
}

/// Write the one customer-info row an order ever gets. Re-confirmation of
/// the same order overwrites with identical content, so a plain put is safe.
pub async fn save(kv: &dyn KvStore, customer: &CustomerInfo) -> Result<()> {
    kv.put(tables::CUSTOMER_INFO, &customer.order_id, to_item(customer)?)
        .await?;
    Ok(())
}
