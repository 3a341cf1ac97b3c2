use boxoffice_db::queries::{inventory as inventory_q, orders, reservations, tickets};
use boxoffice_store::{KvStore, Queue};
use boxoffice_types::{
    OrderQueueMessage, Result, TicketError, TicketInventory, TicketItem, TicketOrder,
    TicketReservation, TicketType,
};

use super::utils::generate_order_number;
use crate::config::TicketingConfig;
use crate::inventory;

/// Create an order and place the inventory hold.
///
/// The hold lands on the per-type inventory row first and on the event
/// aggregate second, each under its own optimistic lock; a failed event
/// update releases the inventory hold again before surfacing. The new order
/// starts in `AVAILABLE` and is handed to the async worker via the
/// processing queue.
pub async fn create_order(
    kv: &dyn KvStore,
    queue: &dyn Queue,
    cfg: &TicketingConfig,
    customer_id: &str,
    event_id: &str,
    event_name: &str,
    ticket_type: TicketType,
    quantity: u32,
) -> Result<TicketOrder> {
    // Fail fast before touching any counter.
    let current = inventory_q::find(kv, event_id, ticket_type)
        .await?
        .ok_or_else(|| {
            TicketError::InventoryNotFound(TicketInventory::key_for(event_id, ticket_type))
        })?;
    if current.available < quantity {
        return Err(TicketError::InsufficientInventory {
            available: current.available,
            requested: quantity,
        });
    }

    // Hold the tickets on the inventory row.
    let held =
        inventory::update_inventory(kv, cfg, event_id, ticket_type, |inv| inv.reserve(quantity))
            .await?;

    // Mirror the hold on the event aggregate, compensating on failure.
    if let Err(err) = inventory::update_event(kv, cfg, event_id, |e| e.reserve(quantity)).await {
        if let Err(release_err) =
            inventory::update_inventory(kv, cfg, event_id, ticket_type, |inv| {
                inv.release_reservation(quantity)
            })
            .await
        {
            tracing::error!(
                event_id,
                error = %release_err,
                "failed to release inventory hold after event update failure"
            );
        }
        return Err(err);
    }

    // Create order, tickets and the timed reservation.
    let order = TicketOrder::new(
        customer_id,
        generate_order_number(),
        event_id,
        event_name,
        ticket_type,
        quantity,
        held.price.times(quantity),
    );
    let reservation = TicketReservation::new(
        &order.order_id,
        event_id,
        ticket_type,
        quantity,
        cfg.reservation_lifetime(),
    );
    let items: Vec<TicketItem> = (0..quantity)
        .map(|_| {
            TicketItem::new(
                &order.order_id,
                &reservation.reservation_id,
                event_id,
                ticket_type,
                held.price.clone(),
                customer_id,
            )
        })
        .collect();

    tickets::save_all(kv, &items).await?;
    reservations::save(kv, &reservation).await?;
    orders::save(kv, &order).await?;

    // Hand the order to the async worker.
    let body = serde_json::to_string(&OrderQueueMessage::new(&order.order_id))?;
    queue.send(&body, None).await?;

    tracing::info!(
        order_id = %order.order_id,
        order_number = %order.order_number,
        event_id,
        ticket_type = %ticket_type,
        quantity,
        "order created"
    );
    Ok(order)
}
