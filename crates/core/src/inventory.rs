//! Optimistic-lock retry drivers for the counter rows.
//!
//! The pure counter arithmetic lives on the entities; this module owns the
//! read → mutate → conditional-write loop. A conflicting writer triggers a
//! re-read and a re-application of the mutation against the fresh snapshot,
//! up to the configured attempt count. Domain failures from the mutation
//! (insufficient inventory and friends) are surfaced immediately, never
//! retried.

use boxoffice_db::queries::{events, inventory};
use boxoffice_store::KvStore;
use boxoffice_types::{Event, Result, TicketError, TicketInventory, TicketType};
use rand::Rng;
use std::time::Duration;

use crate::config::TicketingConfig;

/// Apply `mutate` to the current inventory snapshot and persist it under the
/// version lock. Returns the persisted value.
pub async fn update_inventory<F>(
    kv: &dyn KvStore,
    cfg: &TicketingConfig,
    event_id: &str,
    ticket_type: TicketType,
    mutate: F,
) -> Result<TicketInventory>
where
    F: Fn(TicketInventory) -> Result<TicketInventory>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;

        let current = inventory::find(kv, event_id, ticket_type)
            .await?
            .ok_or_else(|| {
                TicketError::InventoryNotFound(TicketInventory::key_for(event_id, ticket_type))
            })?;

        let updated = mutate(current)?;

        match inventory::update_with_lock(kv, &updated).await {
            Ok(()) => return Ok(updated),
            Err(TicketError::OptimisticLockConflict(row)) if attempt < cfg.inventory_lock_attempts => {
                tracing::debug!(%row, attempt, "optimistic lock conflict, re-reading");
                backoff().await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Same protocol for the event aggregate counters.
pub async fn update_event<F>(
    kv: &dyn KvStore,
    cfg: &TicketingConfig,
    event_id: &str,
    mutate: F,
) -> Result<Event>
where
    F: Fn(Event) -> Result<Event>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;

        let current = events::find_by_id(kv, event_id)
            .await?
            .ok_or_else(|| TicketError::EventNotFound(event_id.to_string()))?;

        let updated = mutate(current)?;

        match events::update_with_lock(kv, &updated).await {
            Ok(()) => return Ok(updated),
            Err(TicketError::OptimisticLockConflict(row)) if attempt < cfg.inventory_lock_attempts => {
                tracing::debug!(%row, attempt, "optimistic lock conflict, re-reading");
                backoff().await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Small randomized pause between lock retries so colliding writers spread
/// out instead of conflicting again in lockstep.
async fn backoff() {
    let jitter = rand::thread_rng().gen_range(5..40);
    tokio::time::sleep(Duration::from_millis(jitter)).await;
}
