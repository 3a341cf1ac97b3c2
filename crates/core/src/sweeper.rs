//! Expired-reservation sweep.
//!
//! A compensating pass: active reservations past their deadline have their
//! hold returned to the pool and are marked `EXPIRED`. The counter releases
//! are guarded (`reserved ≥ quantity`), so a reservation that settled
//! concurrently short-circuits the adjustment and is still expired. One
//! reservation is swept at most once.

use boxoffice_db::queries::reservations;
use boxoffice_store::KvStore;
use boxoffice_types::{Result, TicketError, TicketReservation};
use chrono::Utc;

use crate::config::TicketingConfig;
use crate::inventory;

/// Run one sweep. Returns how many reservations were expired.
pub async fn release_expired_reservations(
    kv: &dyn KvStore,
    cfg: &TicketingConfig,
) -> Result<usize> {
    let now = Utc::now();

    let expired = reservations::find_expired(kv, now).await?;
    if expired.is_empty() {
        return Ok(0);
    }

    tracing::info!(count = expired.len(), "found expired reservations to release");

    let mut released = 0;
    for reservation in expired {
        let reservation_id = reservation.reservation_id.clone();
        match release_one(kv, cfg, reservation).await {
            Ok(()) => released += 1,
            Err(err) => {
                tracing::error!(
                    reservation_id = %reservation_id,
                    error = %err,
                    "failed to release reservation"
                );
            }
        }
    }

    Ok(released)
}

/// Compensate one reservation in isolation and mark it expired.
async fn release_one(
    kv: &dyn KvStore,
    cfg: &TicketingConfig,
    reservation: TicketReservation,
) -> Result<()> {
    let quantity = reservation.quantity;

    tracing::info!(
        reservation_id = %reservation.reservation_id,
        order_id = %reservation.order_id,
        quantity,
        "releasing expired reservation"
    );

    // Event aggregate first. A counter that is already short means the
    // reservation settled concurrently; skip the adjustment and log.
    match inventory::update_event(kv, cfg, &reservation.event_id, |e| e.release_reserved(quantity))
        .await
    {
        Ok(_) => {}
        Err(TicketError::InsufficientInventory { .. }) | Err(TicketError::EventNotFound(_)) => {
            tracing::warn!(
                reservation_id = %reservation.reservation_id,
                "event counters short or missing; skipping event adjustment"
            );
        }
        Err(err) => return Err(err),
    }

    // Then the per-type inventory row, same guard.
    match inventory::update_inventory(
        kv,
        cfg,
        &reservation.event_id,
        reservation.ticket_type,
        |inv| inv.release_reservation(quantity),
    )
    .await
    {
        Ok(_) => {}
        Err(TicketError::InsufficientInventory { .. }) | Err(TicketError::InventoryNotFound(_)) => {
            tracing::warn!(
                reservation_id = %reservation.reservation_id,
                "inventory counters short or missing; skipping inventory adjustment"
            );
        }
        Err(err) => return Err(err),
    }

    // Unconditional: never re-sweep this reservation, even when both
    // adjustments were skipped.
    reservations::save(kv, &reservation.expire()).await?;
    Ok(())
}
