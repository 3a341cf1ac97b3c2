use boxoffice_store::{Condition, Filter, KvStore, Precondition};
use boxoffice_types::{Result, TicketError, TicketOrder};
use serde_json::json;

use crate::codec::{drain_scan, from_item, to_item};
use crate::tables;

/// Find order by ID
pub async fn find_by_id(kv: &dyn KvStore, order_id: &str) -> Result<Option<TicketOrder>> {
    let item = kv.get(tables::TICKET_ORDERS, order_id).await?;
    item.map(from_item).transpose()
}

/// Find order by ID, failing when it does not exist
pub async fn get(kv: &dyn KvStore, order_id: &str) -> Result<TicketOrder> {
    find_by_id(kv, order_id)
        .await?
        .ok_or_else(|| TicketError::OrderNotFound(order_id.to_string()))
}

/// Persist a new order
pub async fn save(kv: &dyn KvStore, order: &TicketOrder) -> Result<()> {
    kv.put(tables::TICKET_ORDERS, &order.order_id, to_item(order)?)
        .await?;
    Ok(())
}

/// Persist a status transition under the optimistic version lock.
pub async fn update_with_lock(kv: &dyn KvStore, order: &TicketOrder) -> Result<()> {
    kv.put_if(
        tables::TICKET_ORDERS,
        &order.order_id,
        to_item(order)?,
        Precondition::VersionIs(order.version - 1),
    )
    .await
    .map_err(|err| match err {
        boxoffice_store::KvError::PreconditionFailed => {
            TicketError::OptimisticLockConflict(format!("TicketOrders {}", order.order_id))
        }
        other => other.into(),
    })
}

/// List a customer's orders
pub async fn list_for_customer(kv: &dyn KvStore, customer_id: &str) -> Result<Vec<TicketOrder>> {
    let items = drain_scan(
        kv,
        tables::TICKET_ORDERS,
        Some(Filter::new([Condition::Eq(
            "customer_id".to_string(),
            json!(customer_id),
        )])),
    )
    .await?;
    items.into_iter().map(from_item).collect()
}
