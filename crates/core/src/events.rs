//! Event and inventory provisioning.

use boxoffice_db::queries::{events, inventory};
use boxoffice_store::KvStore;
use boxoffice_types::{
    validate_currency, Event, Money, Result, TicketError, TicketInventory, TicketType,
};
use chrono::{DateTime, Utc};

/// Create an event. All capacity starts in the open pool.
pub async fn create_event(
    kv: &dyn KvStore,
    name: &str,
    venue: &str,
    event_date: DateTime<Utc>,
    total_capacity: u32,
) -> Result<Event> {
    let event = Event::new(name, venue, event_date, total_capacity);
    events::create(kv, &event).await?;
    tracing::info!(event_id = %event.event_id, %name, total_capacity, "event created");
    Ok(event)
}

pub async fn get_event(kv: &dyn KvStore, event_id: &str) -> Result<Event> {
    events::find_by_id(kv, event_id)
        .await?
        .ok_or_else(|| TicketError::EventNotFound(event_id.to_string()))
}

/// Create the priced inventory row for one `(event, ticket_type)` pair.
/// The price is immutable from here on.
pub async fn create_inventory(
    kv: &dyn KvStore,
    event_id: &str,
    ticket_type: TicketType,
    total: u32,
    price: Money,
) -> Result<TicketInventory> {
    validate_currency(&price.currency).map_err(TicketError::Validation)?;

    // The event must exist before any of its inventory does.
    let event = get_event(kv, event_id).await?;

    let inv = TicketInventory::new(event_id, &event.name, ticket_type, total, price);
    inventory::create(kv, &inv).await?;
    tracing::info!(
        event_id,
        ticket_type = %ticket_type,
        total,
        "inventory created"
    );
    Ok(inv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxoffice_store::MemoryKv;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn provisioning_happy_path() {
        let kv = MemoryKv::new();
        let event = create_event(&kv, "Night Show", "Main Hall", Utc::now(), 1000)
            .await
            .unwrap();

        let inv = create_inventory(
            &kv,
            &event.event_id,
            TicketType::Vip,
            100,
            Money::usd(Decimal::new(15000, 2)),
        )
        .await
        .unwrap();

        assert_eq!(inv.available, 100);
        assert_eq!(inv.event_name, "Night Show");
    }

    #[tokio::test]
    async fn duplicate_inventory_is_rejected() {
        let kv = MemoryKv::new();
        let event = create_event(&kv, "Night Show", "Main Hall", Utc::now(), 1000)
            .await
            .unwrap();

        let price = Money::usd(Decimal::new(5000, 2));
        create_inventory(&kv, &event.event_id, TicketType::General, 500, price.clone())
            .await
            .unwrap();
        let err = create_inventory(&kv, &event.event_id, TicketType::General, 500, price)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "DUPLICATE_INVENTORY");
    }

    #[tokio::test]
    async fn inventory_rejects_malformed_currency() {
        let kv = MemoryKv::new();
        let event = create_event(&kv, "Night Show", "Main Hall", Utc::now(), 1000)
            .await
            .unwrap();

        let err = create_inventory(
            &kv,
            &event.event_id,
            TicketType::Vip,
            10,
            Money::new(Decimal::ONE, "dollars"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn inventory_requires_the_event() {
        let kv = MemoryKv::new();
        let err = create_inventory(
            &kv,
            "nope",
            TicketType::Vip,
            10,
            Money::usd(Decimal::ONE),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "EVENT_NOT_FOUND");
    }
}
