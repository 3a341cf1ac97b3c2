//! Seat assignment for terminal transitions.
//!
//! For an order of N tickets moving into `SOLD` or `COMPLIMENTARY`, this
//! assigns N distinct seats without a global lock. The occupied set is read
//! from two sources (terminal tickets as the convergence view, the
//! `SeatReservations` uniqueness rows as the authority), candidates are
//! picked sequentially from `A-1` upward, and the claim commits as one
//! transactional batch: a conditional create of each seat lock plus a
//! conditional update of each ticket. Losing a race cancels the whole batch;
//! the protocol re-reads the occupied set and tries again with fresh seats.

use std::collections::HashSet;

use boxoffice_db::queries::{audit, seats, tickets};
use boxoffice_db::{tables, to_item};
use boxoffice_store::{Item, KvError, KvStore, Precondition, TransactWriteItem};
use boxoffice_types::{
    seat, Result, SeatReservation, TicketError, TicketItem, TicketOrder,
    TicketStateTransitionAudit, TicketStatus,
};
use serde_json::json;

use crate::config::TicketingConfig;

/// Assign one distinct seat per ticket and commit the terminal transition.
///
/// On success every ticket carries its seat and `target` status, both in the
/// store and in the returned values. On a cancelled claim the protocol
/// retries up to `seat.max_assignment_attempts` times before giving up with
/// [`TicketError::SeatAssignmentFailed`]; the order is untouched either way.
pub async fn assign_seats(
    kv: &dyn KvStore,
    cfg: &TicketingConfig,
    order: &TicketOrder,
    items: &[TicketItem],
    target: TicketStatus,
    performed_by: &str,
    reason: Option<&str>,
) -> Result<Vec<TicketItem>> {
    if !target.is_terminal() {
        return Err(TicketError::InvalidStateTransition {
            from: target.to_string(),
            required: "SOLD or COMPLIMENTARY".to_string(),
        });
    }

    // The batch must carry each ticket at most once.
    let mut seen = HashSet::new();
    for ticket in items {
        if !seen.insert(ticket.ticket_id.as_str()) {
            return Err(TicketError::DuplicateTicket(ticket.ticket_id.clone()));
        }
    }

    for attempt in 1..=cfg.seat_max_assignment_attempts {
        let occupied = occupied_seats(kv, &order.event_id, order.ticket_type).await?;
        let candidates = select_candidates(&occupied, items.len(), cfg)?;

        let mut ops = Vec::with_capacity(items.len() * 2);
        let mut assigned = Vec::with_capacity(items.len());
        for (ticket, seat_number) in items.iter().zip(&candidates) {
            let updated = ticket.clone().assign_seat(seat_number, target, performed_by)?;

            // Uniqueness gate: the lock row must not exist yet.
            let lock = SeatReservation::new(
                &order.event_id,
                order.ticket_type,
                seat_number,
                &ticket.ticket_id,
                &order.order_id,
            );
            ops.push(TransactWriteItem::Put {
                table: tables::SEAT_RESERVATIONS.to_string(),
                key: lock.key(),
                item: to_item(&lock)?,
                precondition: Precondition::NotExists,
            });

            // The ticket gains its seat exactly once, even across retried
            // orders.
            let mut patch = Item::new();
            patch.insert("seat_number".to_string(), json!(seat_number));
            patch.insert("status".to_string(), json!(target.as_str()));
            patch.insert(
                "status_changed_at".to_string(),
                json!(updated.status_changed_at.timestamp()),
            );
            patch.insert("status_changed_by".to_string(), json!(performed_by));
            ops.push(TransactWriteItem::Update {
                table: tables::TICKET_ITEMS.to_string(),
                key: ticket.ticket_id.clone(),
                patch,
                precondition: Precondition::all([
                    Precondition::Exists,
                    Precondition::AttributeNotSet("seat_number".to_string()),
                ]),
            });

            assigned.push(updated);
        }

        match kv.transact_write(ops).await {
            Ok(()) => {
                for (before, after) in items.iter().zip(&assigned) {
                    let _ = audit::append(
                        kv,
                        &TicketStateTransitionAudit::success(
                            &after.ticket_id,
                            before.status,
                            target,
                            performed_by,
                            reason.map(str::to_string),
                        ),
                    )
                    .await;
                }
                tracing::info!(
                    order_id = %order.order_id,
                    count = assigned.len(),
                    attempt,
                    "seats assigned"
                );
                return Ok(assigned);
            }
            Err(KvError::TransactionCancelled { .. }) => {
                // Someone else claimed one of our candidates; reselect from
                // a fresh occupied set.
                tracing::warn!(
                    order_id = %order.order_id,
                    attempt,
                    "seat claim cancelled under contention, retrying"
                );
            }
            Err(err) => return Err(err.into()),
        }
    }

    for ticket in items {
        let _ = audit::append(
            kv,
            &TicketStateTransitionAudit::failure(
                &ticket.ticket_id,
                ticket.status,
                target,
                performed_by,
                format!(
                    "seat assignment cancelled {} times",
                    cfg.seat_max_assignment_attempts
                ),
            ),
        )
        .await;
    }
    Err(TicketError::SeatAssignmentFailed {
        attempts: cfg.seat_max_assignment_attempts,
    })
}

/// Seats that cannot be offered: union of seat locks (authoritative) and
/// seats already fixed on terminal tickets (convergence view).
async fn occupied_seats(
    kv: &dyn KvStore,
    event_id: &str,
    ticket_type: boxoffice_types::TicketType,
) -> Result<HashSet<String>> {
    let mut occupied: HashSet<String> = seats::list_for_type(kv, event_id, ticket_type)
        .await?
        .into_iter()
        .map(|lock| lock.seat_number)
        .collect();
    occupied.extend(tickets::list_terminal_seats(kv, event_id, ticket_type).await?);
    Ok(occupied)
}

/// Walk the layout from `A-1` upward, skipping occupied seats, until `needed`
/// free candidates are collected.
fn select_candidates(
    occupied: &HashSet<String>,
    needed: usize,
    cfg: &TicketingConfig,
) -> Result<Vec<String>> {
    let mut candidates = Vec::with_capacity(needed);
    for index in 0..cfg.seat_max_candidate_iterations {
        if candidates.len() == needed {
            break;
        }
        let label = seat::seat_label(index);
        if !occupied.contains(&label) {
            candidates.push(label);
        }
    }
    if candidates.len() < needed {
        return Err(TicketError::SeatExhaustion);
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxoffice_db::queries::{orders, tickets as tickets_q};
    use boxoffice_store::MemoryKv;
    use boxoffice_types::{Money, TicketType};
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn price() -> Money {
        Money::usd(Decimal::new(15000, 2))
    }

    async fn order_with_tickets(
        kv: &dyn KvStore,
        quantity: u32,
    ) -> (TicketOrder, Vec<TicketItem>) {
        let order = TicketOrder::new(
            "C1",
            "ORD-TEST1",
            "E1",
            "Night Show",
            TicketType::Vip,
            quantity,
            price().times(quantity),
        );
        orders::save(kv, &order).await.unwrap();
        let mut items = Vec::new();
        for _ in 0..quantity {
            let t = TicketItem::new(&order.order_id, "R1", "E1", TicketType::Vip, price(), "C1");
            tickets_q::save(kv, &t).await.unwrap();
            items.push(t);
        }
        (order, items)
    }

    #[test]
    fn candidates_skip_occupied_sequentially() {
        let cfg = TicketingConfig::default();
        let occupied: HashSet<String> = ["A-1", "A-3"].iter().map(|s| s.to_string()).collect();
        let picked = select_candidates(&occupied, 3, &cfg).unwrap();
        assert_eq!(picked, vec!["A-2", "A-4", "A-5"]);
    }

    #[test]
    fn exhaustion_when_the_cap_is_hit() {
        let cfg = TicketingConfig {
            seat_max_candidate_iterations: 5,
            ..TicketingConfig::default()
        };
        let occupied: HashSet<String> =
            (0..5).map(boxoffice_types::seat::seat_label).collect();
        assert!(matches!(
            select_candidates(&occupied, 1, &cfg).unwrap_err(),
            TicketError::SeatExhaustion
        ));
    }

    #[tokio::test]
    async fn assigns_sequential_seats_and_creates_locks() {
        let kv = MemoryKv::new();
        let cfg = TicketingConfig::default();
        let (order, items) = order_with_tickets(&kv, 3).await;

        let assigned = assign_seats(&kv, &cfg, &order, &items, TicketStatus::Sold, "seller", None)
            .await
            .unwrap();

        let seats_taken: Vec<_> = assigned
            .iter()
            .map(|t| t.seat_number.clone().unwrap())
            .collect();
        assert_eq!(seats_taken, vec!["A-1", "A-2", "A-3"]);

        // Stored tickets match the returned view.
        for ticket in &assigned {
            let stored = tickets_q::find_by_id(&kv, &ticket.ticket_id)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(stored.status, TicketStatus::Sold);
            assert_eq!(stored.seat_number, ticket.seat_number);
        }

        // And the locks exist.
        let locks = seats::list_for_type(&kv, "E1", TicketType::Vip).await.unwrap();
        assert_eq!(locks.len(), 3);
    }

    #[tokio::test]
    async fn duplicate_ticket_ids_are_rejected_up_front() {
        let kv = MemoryKv::new();
        let cfg = TicketingConfig::default();
        let (order, items) = order_with_tickets(&kv, 1).await;
        let doubled = vec![items[0].clone(), items[0].clone()];

        let err = assign_seats(&kv, &cfg, &order, &doubled, TicketStatus::Sold, "seller", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "DUPLICATE_TICKET");
    }

    #[tokio::test]
    async fn a_retried_order_cannot_double_assign() {
        let kv = MemoryKv::new();
        let cfg = TicketingConfig::default();
        let (order, items) = order_with_tickets(&kv, 1).await;

        let first = assign_seats(&kv, &cfg, &order, &items, TicketStatus::Sold, "seller", None)
            .await
            .unwrap();

        // Replaying with the stale pre-assignment view must not seat the
        // ticket twice: the ticket row already has a seat, so every claim
        // batch is cancelled by its precondition.
        let err = assign_seats(&kv, &cfg, &order, &items, TicketStatus::Sold, "seller", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "SEAT_ASSIGNMENT_FAILED");

        let stored = tickets_q::find_by_id(&kv, &items[0].ticket_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.seat_number, first[0].seat_number);
        assert_eq!(stored.status, TicketStatus::Sold);

        // The cancelled batches leaked no extra locks.
        let locks = seats::list_for_type(&kv, "E1", TicketType::Vip).await.unwrap();
        assert_eq!(locks.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn contending_orders_get_distinct_seats() {
        let kv = Arc::new(MemoryKv::new());
        let cfg = TicketingConfig::default();

        let (o1, i1) = order_with_tickets(kv.as_ref(), 1).await;
        let (o2, i2) = order_with_tickets(kv.as_ref(), 1).await;

        let (kv1, cfg1) = (Arc::clone(&kv), cfg.clone());
        let h1 = tokio::spawn(async move {
            assign_seats(kv1.as_ref(), &cfg1, &o1, &i1, TicketStatus::Sold, "seller", None).await
        });
        let (kv2, cfg2) = (Arc::clone(&kv), cfg.clone());
        let h2 = tokio::spawn(async move {
            assign_seats(kv2.as_ref(), &cfg2, &o2, &i2, TicketStatus::Sold, "seller", None).await
        });

        let a1 = h1.await.unwrap().unwrap();
        let a2 = h2.await.unwrap().unwrap();

        let s1 = a1[0].seat_number.clone().unwrap();
        let s2 = a2[0].seat_number.clone().unwrap();
        assert_ne!(s1, s2);

        let mut both = vec![s1, s2];
        both.sort();
        assert_eq!(both, vec!["A-1", "A-2"]);
    }
}
