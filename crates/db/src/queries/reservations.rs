use boxoffice_store::{Condition, Filter, KvStore};
use boxoffice_types::{ReservationStatus, Result, TicketReservation};
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::codec::{drain_query, from_item, to_item};
use crate::tables;

/// Find reservation by ID
pub async fn find_by_id(kv: &dyn KvStore, reservation_id: &str) -> Result<Option<TicketReservation>> {
    let item = kv.get(tables::TICKET_RESERVATIONS, reservation_id).await?;
    item.map(from_item).transpose()
}

/// Find the reservation attached to an order
pub async fn find_by_order(kv: &dyn KvStore, order_id: &str) -> Result<Option<TicketReservation>> {
    let items = drain_query(
        kv,
        tables::TICKET_RESERVATIONS,
        Some(tables::indexes::ORDER_INDEX),
        Condition::Eq("order_id".to_string(), json!(order_id)),
        None,
    )
    .await?;
    items.into_iter().next().map(from_item).transpose()
}

/// Persist a reservation (create or status change)
pub async fn save(kv: &dyn KvStore, reservation: &TicketReservation) -> Result<()> {
    kv.put(
        tables::TICKET_RESERVATIONS,
        &reservation.reservation_id,
        to_item(reservation)?,
    )
    .await?;
    Ok(())
}

/// Active reservations whose deadline passed (for the sweeper)
pub async fn find_expired(
    kv: &dyn KvStore,
    before: DateTime<Utc>,
) -> Result<Vec<TicketReservation>> {
    let items = drain_query(
        kv,
        tables::TICKET_RESERVATIONS,
        Some(tables::indexes::EXPIRATION_INDEX),
        Condition::Eq("status".to_string(), json!(ReservationStatus::Active.as_str())),
        Some(Filter::new([Condition::Lt(
            "expires_at".to_string(),
            json!(before.timestamp()),
        )])),
    )
    .await?;
    items.into_iter().map(from_item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxoffice_store::MemoryKv;
    use boxoffice_types::TicketType;
    use chrono::Duration;

    fn reservation(order_id: &str, lifetime_minutes: i64) -> TicketReservation {
        TicketReservation::new(
            order_id,
            "E1",
            TicketType::Vip,
            2,
            Duration::minutes(lifetime_minutes),
        )
    }

    #[tokio::test]
    async fn find_expired_selects_only_lapsed_actives() {
        let kv = MemoryKv::new();

        let lapsed = reservation("O1", -5);
        let live = reservation("O2", 10);
        let settled = reservation("O3", -5).confirm().unwrap();
        save(&kv, &lapsed).await.unwrap();
        save(&kv, &live).await.unwrap();
        save(&kv, &settled).await.unwrap();

        let found = find_expired(&kv, Utc::now()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reservation_id, lapsed.reservation_id);
    }

    #[tokio::test]
    async fn find_by_order_resolves_the_attached_hold() {
        let kv = MemoryKv::new();
        let held = reservation("O1", 10);
        save(&kv, &held).await.unwrap();

        let found = find_by_order(&kv, "O1").await.unwrap().unwrap();
        assert_eq!(found, held);
        assert!(find_by_order(&kv, "O2").await.unwrap().is_none());
    }
}
