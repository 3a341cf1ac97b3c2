use boxoffice_db::queries::{orders, tickets};
use boxoffice_store::KvStore;
use boxoffice_types::{Result, TicketError, TicketOrder, TicketStatus};

use super::utils::confirm_attached_reservation;
use crate::config::TicketingConfig;
use crate::inventory;
use crate::seating;

/// Give an order's tickets away, from any pre-terminal state.
///
/// Seats are assigned exactly as in a sale; the counters settle the hold the
/// order already placed at creation (`reserved -= n, sold += n`), so the net
/// effect on inventory equals a sale at price zero.
pub async fn mark_as_complimentary(
    kv: &dyn KvStore,
    cfg: &TicketingConfig,
    order_id: &str,
    reason: &str,
) -> Result<TicketOrder> {
    let order = orders::get(kv, order_id).await?;
    if !matches!(
        order.status,
        TicketStatus::Available | TicketStatus::Reserved | TicketStatus::PendingConfirmation
    ) {
        return Err(TicketError::InvalidStateTransition {
            from: order.status.to_string(),
            required: "AVAILABLE, RESERVED or PENDING_CONFIRMATION".to_string(),
        });
    }

    let items = tickets::list_for_order(kv, order_id).await?;
    seating::assign_seats(
        kv,
        cfg,
        &order,
        &items,
        TicketStatus::Complimentary,
        "boxoffice",
        Some(reason),
    )
    .await?;

    let comped = order.mark_complimentary()?;
    orders::update_with_lock(kv, &comped).await?;

    confirm_attached_reservation(kv, order_id).await?;

    let quantity = comped.quantity;
    inventory::update_inventory(kv, cfg, &comped.event_id, comped.ticket_type, |inv| {
        inv.confirm_reservation(quantity)
    })
    .await?;
    inventory::update_event(kv, cfg, &comped.event_id, |e| e.confirm_reserved(quantity)).await?;

    tracing::info!(order_id, quantity, reason, "order comped");
    Ok(comped)
}
