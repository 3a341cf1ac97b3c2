mod jobs;

use std::sync::Arc;
use std::time::Duration;

use boxoffice_core::TicketingConfig;
use boxoffice_store::{KvStore, MemoryKv, MemoryQueue, Queue};
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "boxoffice_jobs=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Boxoffice background jobs...");

    let cfg = TicketingConfig::from_env();

    // In-memory backend; hosted store/queue adapters plug in behind the same
    // contracts.
    let kv: Arc<dyn KvStore> = Arc::new(MemoryKv::new());
    let dead_letter = Arc::new(MemoryQueue::new(Duration::from_secs(
        cfg.worker_visibility_timeout_seconds,
    )));
    let queue: Arc<dyn Queue> = Arc::new(MemoryQueue::with_dead_letter(
        Duration::from_secs(cfg.worker_visibility_timeout_seconds),
        5,
        dead_letter,
    ));

    tracing::info!("✓ Store and queues initialized");

    // Initialize job scheduler
    let scheduler = JobScheduler::new().await?;

    // Job 1: Release expired reservations (configured sweep interval)
    let sweep_interval = Duration::from_millis(cfg.reservation_check_interval_ms);
    let kv_clone = Arc::clone(&kv);
    let cfg_clone = cfg.clone();
    let sweep_job = Job::new_repeated_async(sweep_interval, move |_uuid, _l| {
        let kv = Arc::clone(&kv_clone);
        let cfg = cfg_clone.clone();
        Box::pin(async move {
            tracing::debug!("Running release_expired_reservations job");
            if let Err(e) = jobs::release_expired_reservations(kv.as_ref(), &cfg).await {
                tracing::error!("release_expired_reservations job failed: {}", e);
            }
        })
    })?;

    scheduler.add(sweep_job).await?;

    tracing::info!(
        "✓ Registered job: release_expired_reservations (every {} ms)",
        cfg.reservation_check_interval_ms
    );

    // Job 2: Async order worker pool (long-running consumer)
    let shutdown = CancellationToken::new();
    let worker = tokio::spawn(jobs::run_order_worker(
        Arc::clone(&kv),
        Arc::clone(&queue),
        cfg.clone(),
        shutdown.clone(),
    ));

    tracing::info!(
        "✓ Started order worker (parallelism {})",
        cfg.worker_parallelism
    );

    // Start scheduler
    scheduler.start().await?;

    tracing::info!("✓ Job scheduler started");
    tracing::info!("📡 Background jobs running");

    // Run until interrupted, then drain the worker.
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");
    shutdown.cancel();
    worker.await??;

    Ok(())
}
