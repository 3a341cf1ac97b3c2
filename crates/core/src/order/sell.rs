use boxoffice_db::queries::{orders, tickets};
use boxoffice_store::KvStore;
use boxoffice_types::{Result, TicketError, TicketOrder, TicketStatus};

use super::utils::confirm_attached_reservation;
use crate::config::TicketingConfig;
use crate::inventory;
use crate::seating;

/// Settle a confirmed order as sold.
///
/// The seat-assignment protocol is the gate: once it commits, every ticket
/// carries a unique seat and status `SOLD`, and only then does the order
/// itself transition and the held counters move to sold.
pub async fn mark_as_sold(
    kv: &dyn KvStore,
    cfg: &TicketingConfig,
    order_id: &str,
) -> Result<TicketOrder> {
    let order = orders::get(kv, order_id).await?;
    if order.status != TicketStatus::PendingConfirmation {
        return Err(TicketError::InvalidStateTransition {
            from: order.status.to_string(),
            required: "PENDING_CONFIRMATION".to_string(),
        });
    }

    let items = tickets::list_for_order(kv, order_id).await?;
    seating::assign_seats(kv, cfg, &order, &items, TicketStatus::Sold, "boxoffice", None).await?;

    let sold = order.mark_sold()?;
    orders::update_with_lock(kv, &sold).await?;

    confirm_attached_reservation(kv, order_id).await?;

    // Held → sold on both counter rows.
    let quantity = sold.quantity;
    inventory::update_inventory(kv, cfg, &sold.event_id, sold.ticket_type, |inv| {
        inv.confirm_reservation(quantity)
    })
    .await?;
    inventory::update_event(kv, cfg, &sold.event_id, |e| e.confirm_reserved(quantity)).await?;

    tracing::info!(order_id, quantity, "order sold");
    Ok(sold)
}
