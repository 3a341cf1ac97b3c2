//! Entity ⇄ stored-item conversion.
//!
//! Entities serialize through serde into flat attribute maps; reading back
//! yields a byte-equal domain value (timestamps as epoch seconds, money
//! amounts as decimal strings, statuses as upper-snake strings). Rehydration
//! goes through the entities' serde derives, not around their invariants.

use boxoffice_store::{Condition, Filter, Item, KvStore};
use boxoffice_types::{Result, TicketError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub fn to_item<T: Serialize>(value: &T) -> Result<Item> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(TicketError::Codec(serde::ser::Error::custom(format!(
            "entity serialized to {other:?}, expected an object"
        )))),
    }
}

pub fn from_item<T: DeserializeOwned>(item: Item) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(item))?)
}

/// Drain every page of a query into one vector.
pub(crate) async fn drain_query(
    kv: &dyn KvStore,
    table: &str,
    index: Option<&str>,
    key_condition: Condition,
    filter: Option<Filter>,
) -> Result<Vec<Item>> {
    let mut items = Vec::new();
    let mut start_key = None;
    loop {
        let page = kv
            .query(table, index, key_condition.clone(), filter.clone(), start_key, None)
            .await?;
        items.extend(page.items);
        match page.last_evaluated_key {
            Some(key) => start_key = Some(key),
            None => return Ok(items),
        }
    }
}

/// Drain every page of a scan into one vector.
pub(crate) async fn drain_scan(
    kv: &dyn KvStore,
    table: &str,
    filter: Option<Filter>,
) -> Result<Vec<Item>> {
    let mut items = Vec::new();
    let mut start_key = None;
    loop {
        let page = kv.scan(table, filter.clone(), start_key, None).await?;
        items.extend(page.items);
        match page.last_evaluated_key {
            Some(key) => start_key = Some(key),
            None => return Ok(items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxoffice_types::{
        CustomerInfo, Event, Money, SeatReservation, TicketInventory, TicketItem, TicketOrder,
        TicketReservation, TicketStateTransitionAudit, TicketStatus, TicketType,
    };
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn assert_roundtrip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let item = to_item(value).unwrap();
        let back: T = from_item(item).unwrap();
        assert_eq!(&back, value);
    }

    #[test]
    fn every_entity_roundtrips() {
        let event = Event::new("Night Show", "Main Hall", chrono::Utc::now(), 1000);
        assert_roundtrip(&event);

        let price = Money::usd(Decimal::new(15000, 2));
        let inv =
            TicketInventory::new(&event.event_id, "Night Show", TicketType::Vip, 100, price.clone());
        assert_roundtrip(&inv);

        let order = TicketOrder::new(
            "C1",
            "ORD-XY9Z1",
            &event.event_id,
            "Night Show",
            TicketType::Vip,
            1,
            price.clone(),
        );
        assert_roundtrip(&order);

        let reservation = TicketReservation::new(
            &order.order_id,
            &event.event_id,
            TicketType::Vip,
            1,
            Duration::minutes(10),
        );
        assert_roundtrip(&reservation);

        let ticket = TicketItem::new(
            &order.order_id,
            &reservation.reservation_id,
            &event.event_id,
            TicketType::Vip,
            price,
            "system",
        );
        assert_roundtrip(&ticket);

        let seat = SeatReservation::new(
            &event.event_id,
            TicketType::Vip,
            "A-1",
            &ticket.ticket_id,
            &order.order_id,
        );
        assert_roundtrip(&seat);

        let customer = CustomerInfo::new(
            &order.order_id,
            "C1",
            "Ada Lovelace",
            "ada@example.com",
            "+1-555-0100",
            "12 Analytical Way",
            "London",
            "GBR",
            "CARD",
        );
        assert_roundtrip(&customer);

        let audit = TicketStateTransitionAudit::success(
            &ticket.ticket_id,
            TicketStatus::Available,
            TicketStatus::Reserved,
            "worker-1",
            None,
        );
        assert_roundtrip(&audit);
    }

    #[test]
    fn timestamps_persist_as_epoch_seconds() {
        let event = Event::new("Night Show", "Main Hall", chrono::Utc::now(), 10);
        let item = to_item(&event).unwrap();
        assert!(item["event_date"].is_i64() || item["event_date"].is_u64());
    }

    #[test]
    fn money_persists_as_decimal_string() {
        let inv = TicketInventory::new(
            "E1",
            "Night Show",
            TicketType::Vip,
            100,
            Money::usd(Decimal::new(15000, 2)),
        );
        let item = to_item(&inv).unwrap();
        assert_eq!(item["price"]["amount"], "150.00");
        assert_eq!(item["price"]["currency"], "USD");
    }
}
