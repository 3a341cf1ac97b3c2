use boxoffice_core::{sweeper, TicketingConfig};
use boxoffice_store::KvStore;

/// Release reservations past their payment deadline.
/// Runs on the configured sweep interval (default 60s).
pub async fn release_expired_reservations(
    kv: &dyn KvStore,
    cfg: &TicketingConfig,
) -> anyhow::Result<()> {
    let released = sweeper::release_expired_reservations(kv, cfg).await?;

    if released > 0 {
        tracing::info!("✓ Released {} expired reservations", released);
    }

    Ok(())
}
