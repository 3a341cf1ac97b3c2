//! Shared harness for the lifecycle tests: an in-memory store and queue,
//! provisioning shortcuts, and a synchronous stand-in for the order worker.

use std::sync::Arc;
use std::time::Duration;

use boxoffice_core::order::PaymentDetails;
use boxoffice_core::{events, order, TicketingConfig};
use boxoffice_store::{KvStore, MemoryKv, MemoryQueue, Queue};
use boxoffice_types::{
    Event, Money, OrderQueueMessage, TicketInventory, TicketOrder, TicketType,
};
use chrono::Utc;
use rust_decimal::Decimal;

pub struct Harness {
    pub kv: Arc<MemoryKv>,
    pub queue: Arc<MemoryQueue>,
    pub cfg: TicketingConfig,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(TicketingConfig::default())
    }

    pub fn with_config(cfg: TicketingConfig) -> Self {
        Self {
            kv: Arc::new(MemoryKv::new()),
            queue: Arc::new(MemoryQueue::new(Duration::from_secs(30))),
            cfg,
        }
    }

    pub fn kv(&self) -> &dyn KvStore {
        self.kv.as_ref()
    }

    pub fn queue(&self) -> &dyn Queue {
        self.queue.as_ref()
    }

    /// Event plus one priced inventory row.
    pub async fn provision(
        &self,
        capacity: u32,
        ticket_type: TicketType,
        total: u32,
        price_cents: i64,
    ) -> (Event, TicketInventory) {
        let event = events::create_event(self.kv(), "Night Show", "Main Hall", Utc::now(), capacity)
            .await
            .unwrap();
        let inv = events::create_inventory(
            self.kv(),
            &event.event_id,
            ticket_type,
            total,
            Money::usd(Decimal::new(price_cents, 2)),
        )
        .await
        .unwrap();
        (event, inv)
    }

    pub async fn create_order(
        &self,
        event: &Event,
        ticket_type: TicketType,
        quantity: u32,
    ) -> boxoffice_types::Result<TicketOrder> {
        order::create_order(
            self.kv(),
            self.queue(),
            &self.cfg,
            "C1",
            &event.event_id,
            &event.name,
            ticket_type,
            quantity,
        )
        .await
    }

    /// Pull and process everything currently on the queue, acking each
    /// message, the way the async worker would. Returns how many messages
    /// were handled.
    pub async fn drain_worker(&self) -> usize {
        let mut handled = 0;
        loop {
            let batch = self.queue.receive(10, Duration::ZERO).await.unwrap();
            if batch.is_empty() {
                return handled;
            }
            for msg in batch {
                let parsed: OrderQueueMessage = serde_json::from_str(&msg.body).unwrap();
                order::process_order(self.kv(), &parsed.order_id, "order-worker")
                    .await
                    .unwrap();
                self.queue.delete(&msg.receipt).await.unwrap();
                handled += 1;
            }
        }
    }

    pub async fn current_inventory(&self, event_id: &str, ticket_type: TicketType) -> TicketInventory {
        boxoffice_db::queries::inventory::find(self.kv(), event_id, ticket_type)
            .await
            .unwrap()
            .unwrap()
    }

    pub async fn current_event(&self, event_id: &str) -> Event {
        boxoffice_db::queries::events::find_by_id(self.kv(), event_id)
            .await
            .unwrap()
            .unwrap()
    }
}

pub fn payment_details() -> PaymentDetails {
    PaymentDetails {
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        phone: "+1-555-0100".to_string(),
        address: "12 Analytical Way".to_string(),
        city: "London".to_string(),
        country: "GBR".to_string(),
        payment_method: "CARD".to_string(),
    }
}
