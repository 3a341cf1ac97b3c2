//! In-memory [`Queue`] backend with visibility timeouts and an optional
//! dead-letter queue.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use uuid::Uuid;

use crate::queue::{Queue, QueueError, QueueMessage};

#[derive(Debug, Clone)]
struct Stored {
    message_id: String,
    body: String,
    attributes: HashMap<String, String>,
    receive_count: u32,
}

#[derive(Default)]
struct Inner {
    ready: VecDeque<Stored>,
    /// Receipt handle -> (message, visibility deadline).
    inflight: HashMap<String, (Stored, Instant)>,
}

pub struct MemoryQueue {
    inner: Mutex<Inner>,
    notify: Notify,
    visibility_timeout: Duration,
    /// Deliveries beyond this count go to the dead-letter queue instead of
    /// being redelivered. Ignored when no dead-letter queue is attached.
    max_receive_count: u32,
    dead_letter: Option<Arc<MemoryQueue>>,
}

impl MemoryQueue {
    pub fn new(visibility_timeout: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            notify: Notify::new(),
            visibility_timeout,
            max_receive_count: u32::MAX,
            dead_letter: None,
        }
    }

    pub fn with_dead_letter(
        visibility_timeout: Duration,
        max_receive_count: u32,
        dead_letter: Arc<MemoryQueue>,
    ) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            notify: Notify::new(),
            visibility_timeout,
            max_receive_count,
            dead_letter: Some(dead_letter),
        }
    }

    /// Messages currently visible plus in flight. Test observability.
    pub async fn depth(&self) -> usize {
        let inner = self.inner.lock().await;
        inner.ready.len() + inner.inflight.len()
    }

    /// Return timed-out in-flight messages to the ready deque, or hand them
    /// to the dead-letter queue once their delivery count is exhausted.
    async fn redrive(&self, inner: &mut Inner, now: Instant) {
        let expired: Vec<String> = inner
            .inflight
            .iter()
            .filter(|(_, (_, deadline))| *deadline <= now)
            .map(|(receipt, _)| receipt.clone())
            .collect();

        for receipt in expired {
            let Some((stored, _)) = inner.inflight.remove(&receipt) else {
                continue;
            };
            if stored.receive_count >= self.max_receive_count {
                if let Some(dlq) = &self.dead_letter {
                    tracing::warn!(
                        message_id = %stored.message_id,
                        receive_count = stored.receive_count,
                        "redirecting poisoned message to dead-letter queue"
                    );
                    let mut dlq_inner = dlq.inner.lock().await;
                    dlq_inner.ready.push_back(Stored {
                        receive_count: 0,
                        ..stored
                    });
                    dlq.notify.notify_waiters();
                    continue;
                }
            }
            inner.ready.push_back(stored);
        }
    }
}

#[async_trait]
impl Queue for MemoryQueue {
    async fn send(
        &self,
        body: &str,
        attributes: Option<HashMap<String, String>>,
    ) -> Result<(), QueueError> {
        let mut inner = self.inner.lock().await;
        inner.ready.push_back(Stored {
            message_id: Uuid::new_v4().to_string(),
            body: body.to_string(),
            attributes: attributes.unwrap_or_default(),
            receive_count: 0,
        });
        drop(inner);
        self.notify.notify_waiters();
        Ok(())
    }

    async fn receive(&self, max: usize, wait: Duration) -> Result<Vec<QueueMessage>, QueueError> {
        let deadline = Instant::now() + wait;
        loop {
            let mut messages = Vec::new();
            {
                let mut inner = self.inner.lock().await;
                let now = Instant::now();
                self.redrive(&mut inner, now).await;

                while messages.len() < max {
                    let Some(mut stored) = inner.ready.pop_front() else {
                        break;
                    };
                    stored.receive_count += 1;
                    let receipt = Uuid::new_v4().to_string();
                    messages.push(QueueMessage {
                        message_id: stored.message_id.clone(),
                        receipt: receipt.clone(),
                        body: stored.body.clone(),
                        attributes: stored.attributes.clone(),
                        receive_count: stored.receive_count,
                    });
                    inner
                        .inflight
                        .insert(receipt, (stored, now + self.visibility_timeout));
                }
            }

            if !messages.is_empty() {
                return Ok(messages);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(messages);
            }
            // Long poll: wake on send, or re-check when the earliest
            // visibility deadline could have passed.
            let _ = tokio::time::timeout(
                remaining.min(self.visibility_timeout).min(Duration::from_millis(100)),
                self.notify.notified(),
            )
            .await;
        }
    }

    async fn delete(&self, receipt: &str) -> Result<(), QueueError> {
        let mut inner = self.inner.lock().await;
        inner
            .inflight
            .remove(receipt)
            .map(|_| ())
            .ok_or_else(|| QueueError::InvalidReceipt(receipt.to_string()))
    }
}
