use std::sync::Arc;
use std::time::Duration;

use boxoffice_core::{order, TicketingConfig};
use boxoffice_store::{KvStore, Queue, QueueMessage};
use boxoffice_types::OrderQueueMessage;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

const WORKER_NAME: &str = "order-worker";
const POLL_WAIT: Duration = Duration::from_secs(5);

/// Long-running consumer for the order-processing queue.
///
/// Pulls batches, handles each message on the bounded worker pool, and acks
/// only on success; failed messages stay in flight until the visibility
/// timeout redelivers them, and the queue backend redirects poison to the
/// dead-letter queue. Shuts down when the token fires, draining in-flight
/// handlers first.
pub async fn run_order_worker(
    kv: Arc<dyn KvStore>,
    queue: Arc<dyn Queue>,
    cfg: TicketingConfig,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let limiter = Arc::new(Semaphore::new(cfg.worker_parallelism));
    let mut handlers: JoinSet<()> = JoinSet::new();

    tracing::info!(
        parallelism = cfg.worker_parallelism,
        batch = cfg.worker_poll_batch_size,
        "order worker started"
    );

    loop {
        let batch = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = queue.receive(cfg.worker_poll_batch_size, POLL_WAIT) => received?,
        };

        for message in batch {
            let permit = Arc::clone(&limiter).acquire_owned().await?;
            let kv = Arc::clone(&kv);
            let queue = Arc::clone(&queue);
            handlers.spawn(async move {
                let _permit = permit;
                handle_message(kv.as_ref(), queue.as_ref(), message).await;
            });
        }

        // Reap whatever finished; the semaphore already bounds the pool.
        while handlers.try_join_next().is_some() {}
    }

    // Drain in-flight handlers before returning.
    while handlers.join_next().await.is_some() {}
    tracing::info!("order worker stopped");
    Ok(())
}

/// One message: reload the order and promote it. No ack on failure; the
/// visibility timeout hands the message back for another try.
async fn handle_message(kv: &dyn KvStore, queue: &dyn Queue, message: QueueMessage) {
    let parsed: OrderQueueMessage = match serde_json::from_str(&message.body) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::error!(
                message_id = %message.message_id,
                receive_count = message.receive_count,
                error = %err,
                "unparseable message body; leaving for redelivery"
            );
            return;
        }
    };

    match order::process_order(kv, &parsed.order_id, WORKER_NAME).await {
        Ok(_) => {
            if let Err(err) = queue.delete(&message.receipt).await {
                // Processing is idempotent, so a redelivered ack race is
                // harmless.
                tracing::warn!(order_id = %parsed.order_id, error = %err, "ack failed");
            }
        }
        Err(err) => {
            tracing::error!(
                order_id = %parsed.order_id,
                receive_count = message.receive_count,
                kind = err.kind(),
                error = %err,
                "processing failed; leaving for redelivery"
            );
        }
    }
}
