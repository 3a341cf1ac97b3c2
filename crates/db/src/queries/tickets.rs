use boxoffice_store::{Condition, Filter, KvStore};
use boxoffice_types::{Result, TicketItem, TicketType};
use serde_json::json;

use crate::codec::{drain_query, drain_scan, from_item, to_item};
use crate::tables;

/// Find ticket by ID
pub async fn find_by_id(kv: &dyn KvStore, ticket_id: &str) -> Result<Option<TicketItem>> {
    let item = kv.get(tables::TICKET_ITEMS, ticket_id).await?;
    item.map(from_item).transpose()
}

/// Persist one ticket
pub async fn save(kv: &dyn KvStore, ticket: &TicketItem) -> Result<()> {
    kv.put(tables::TICKET_ITEMS, &ticket.ticket_id, to_item(ticket)?)
        .await?;
    Ok(())
}

/// Persist a batch of tickets (order creation)
pub async fn save_all(kv: &dyn KvStore, tickets: &[TicketItem]) -> Result<()> {
    for ticket in tickets {
        save(kv, ticket).await?;
    }
    Ok(())
}

/// List an order's tickets, creation order preserved by key order.
pub async fn list_for_order(kv: &dyn KvStore, order_id: &str) -> Result<Vec<TicketItem>> {
    let items = drain_query(
        kv,
        tables::TICKET_ITEMS,
        Some(tables::indexes::ORDER_INDEX),
        Condition::Eq("order_id".to_string(), json!(order_id)),
        None,
    )
    .await?;
    items.into_iter().map(from_item).collect()
}

/// Seats already fixed on terminal tickets of one `(event, ticket_type)`.
///
/// Convergence view of the occupied set; the `SeatReservations` table is the
/// authoritative source under contention.
pub async fn list_terminal_seats(
    kv: &dyn KvStore,
    event_id: &str,
    ticket_type: TicketType,
) -> Result<Vec<String>> {
    let items = drain_scan(
        kv,
        tables::TICKET_ITEMS,
        Some(Filter::new([
            Condition::Eq("event_id".to_string(), json!(event_id)),
            Condition::Eq("ticket_type".to_string(), json!(ticket_type.as_str())),
        ])),
    )
    .await?;

    let mut seats = Vec::new();
    for item in items {
        let ticket: TicketItem = from_item(item)?;
        if ticket.status.is_terminal() {
            if let Some(seat) = ticket.seat_number {
                seats.push(seat);
            }
        }
    }
    Ok(seats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxoffice_store::MemoryKv;
    use boxoffice_types::{Money, TicketStatus};
    use rust_decimal::Decimal;

    fn ticket(order_id: &str) -> TicketItem {
        TicketItem::new(
            order_id,
            "R1",
            "E1",
            TicketType::Vip,
            Money::usd(Decimal::new(15000, 2)),
            "C1",
        )
    }

    #[tokio::test]
    async fn list_for_order_returns_only_that_order() {
        let kv = MemoryKv::new();
        save(&kv, &ticket("O1")).await.unwrap();
        save(&kv, &ticket("O1")).await.unwrap();
        save(&kv, &ticket("O2")).await.unwrap();

        let found = list_for_order(&kv, "O1").await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|t| t.order_id == "O1"));
    }

    #[tokio::test]
    async fn terminal_seats_ignore_unseated_and_pending_tickets() {
        let kv = MemoryKv::new();

        let sold = ticket("O1")
            .assign_seat("A-1", TicketStatus::Sold, "seller")
            .unwrap();
        save(&kv, &sold).await.unwrap();

        let comped = ticket("O2")
            .assign_seat("A-2", TicketStatus::Complimentary, "host")
            .unwrap();
        save(&kv, &comped).await.unwrap();

        // Still in flight, no seat yet.
        save(&kv, &ticket("O3")).await.unwrap();

        let mut seats = list_terminal_seats(&kv, "E1", TicketType::Vip).await.unwrap();
        seats.sort();
        assert_eq!(seats, vec!["A-1", "A-2"]);

        // A different type sees none of them.
        let other = list_terminal_seats(&kv, "E1", TicketType::General).await.unwrap();
        assert!(other.is_empty());
    }
}
