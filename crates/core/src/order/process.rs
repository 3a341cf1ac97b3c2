use boxoffice_db::queries::{audit, orders, tickets};
use boxoffice_store::KvStore;
use boxoffice_types::{Result, TicketStateTransitionAudit, TicketStatus, TicketOrder};

/// Worker-side transition: `AVAILABLE → RESERVED` for the order and every
/// ticket on it.
///
/// Idempotent under at-least-once delivery: a redelivered message for an
/// order already past `AVAILABLE` is a no-op success.
pub async fn process_order(kv: &dyn KvStore, order_id: &str, worker: &str) -> Result<TicketOrder> {
    let order = orders::get(kv, order_id).await?;

    if order.status != TicketStatus::Available {
        tracing::debug!(order_id, status = %order.status, "order already processed, skipping");
        return Ok(order);
    }

    // Tickets first; the order row's optimistic update is the commit point.
    let items = tickets::list_for_order(kv, order_id).await?;
    for item in items {
        let from = item.status;
        let ticket_id = item.ticket_id.clone();
        match item.reserve(worker) {
            Ok(reserved) => {
                tickets::save(kv, &reserved).await?;
                let _ = audit::append(
                    kv,
                    &TicketStateTransitionAudit::success(
                        &ticket_id,
                        from,
                        TicketStatus::Reserved,
                        worker,
                        None,
                    ),
                )
                .await;
            }
            Err(err) => {
                // A ticket already moved on (previous partial run); tolerated.
                tracing::warn!(order_id, ticket_id = %ticket_id, error = %err, "skipping ticket");
                let _ = audit::append(
                    kv,
                    &TicketStateTransitionAudit::failure(
                        &ticket_id,
                        from,
                        TicketStatus::Reserved,
                        worker,
                        err.to_string(),
                    ),
                )
                .await;
            }
        }
    }

    let reserved = order.reserve()?;
    orders::update_with_lock(kv, &reserved).await?;

    tracing::info!(order_id, "order reserved");
    Ok(reserved)
}
