use boxoffice_db::queries::reservations;
use boxoffice_store::KvStore;
use boxoffice_types::{ReservationStatus, Result};
use rand::{distributions::Alphanumeric, Rng};

/// Generate unique order number (ORD-XXXXX)
pub fn generate_order_number() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(5)
        .map(char::from)
        .collect();

    format!("ORD-{}", suffix.to_uppercase())
}

/// Settle the reservation attached to an order after a sale or comp.
///
/// A reservation the sweeper expired in the meantime is left alone: the
/// counters were already compensated on that path, and the race is logged
/// rather than failed.
pub(crate) async fn confirm_attached_reservation(kv: &dyn KvStore, order_id: &str) -> Result<()> {
    match reservations::find_by_order(kv, order_id).await? {
        Some(reservation) if reservation.status == ReservationStatus::Active => {
            let confirmed = reservation.confirm()?;
            reservations::save(kv, &confirmed).await?;
        }
        Some(reservation) => {
            tracing::warn!(
                order_id,
                status = %reservation.status,
                "reservation no longer active at settlement; leaving as-is"
            );
        }
        None => {
            tracing::warn!(order_id, "order has no reservation attached");
        }
    }
    Ok(())
}
