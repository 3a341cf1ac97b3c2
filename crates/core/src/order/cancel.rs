use boxoffice_db::queries::{audit, orders, reservations, tickets};
use boxoffice_store::KvStore;
use boxoffice_types::{
    ReservationStatus, Result, TicketError, TicketOrder, TicketStateTransitionAudit, TicketStatus,
};

use crate::config::TicketingConfig;
use crate::inventory;

/// Cancel an order before settlement and return its hold to the pool.
///
/// When the sweeper already compensated (an expired reservation racing a
/// cancellation), the short counters are logged and skipped rather than
/// driven negative.
pub async fn cancel_order(
    kv: &dyn KvStore,
    cfg: &TicketingConfig,
    order_id: &str,
) -> Result<TicketOrder> {
    let order = orders::get(kv, order_id).await?;
    let cancelled = order.cancel()?;

    let performed_by = cancelled.customer_id.clone();
    let items = tickets::list_for_order(kv, order_id).await?;
    for item in items {
        let from = item.status;
        let ticket_id = item.ticket_id.clone();
        match item.cancel(&performed_by) {
            Ok(t) => {
                tickets::save(kv, &t).await?;
                let _ = audit::append(
                    kv,
                    &TicketStateTransitionAudit::success(
                        &ticket_id,
                        from,
                        TicketStatus::Cancelled,
                        &performed_by,
                        None,
                    ),
                )
                .await;
            }
            Err(err) => {
                tracing::warn!(order_id, ticket_id = %ticket_id, error = %err, "skipping ticket");
            }
        }
    }

    orders::update_with_lock(kv, &cancelled).await?;

    // Release the reservation row.
    match reservations::find_by_order(kv, order_id).await? {
        Some(reservation) if reservation.status == ReservationStatus::Active => {
            reservations::save(kv, &reservation.release()?).await?;
        }
        Some(reservation) => {
            tracing::warn!(order_id, status = %reservation.status, "reservation already settled");
        }
        None => {}
    }

    // Return the held tickets to the pool on both counter rows.
    let quantity = cancelled.quantity;
    match inventory::update_inventory(kv, cfg, &cancelled.event_id, cancelled.ticket_type, |inv| {
        inv.release_reservation(quantity)
    })
    .await
    {
        Ok(_) => {}
        Err(TicketError::InsufficientInventory { .. }) => {
            tracing::warn!(order_id, "inventory hold already released, skipping");
        }
        Err(err) => return Err(err),
    }
    match inventory::update_event(kv, cfg, &cancelled.event_id, |e| e.release_reserved(quantity))
        .await
    {
        Ok(_) => {}
        Err(TicketError::InsufficientInventory { .. }) => {
            tracing::warn!(order_id, "event hold already released, skipping");
        }
        Err(err) => return Err(err),
    }

    tracing::info!(order_id, quantity, "order cancelled");
    Ok(cancelled)
}
