//! At-least-once message queue contract.
//!
//! One trait object per queue. Received messages stay invisible for the
//! queue's visibility timeout; a consumer acknowledges with `delete` or lets
//! the timeout redeliver. Poison redirection to a dead-letter queue is the
//! backend's responsibility.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue unavailable: {0}")]
    Unavailable(String),

    #[error("unknown or expired receipt: {0}")]
    InvalidReceipt(String),
}

#[derive(Debug, Clone)]
pub struct QueueMessage {
    pub message_id: String,
    /// Handle for acknowledging this delivery. Valid until the visibility
    /// timeout elapses.
    pub receipt: String,
    pub body: String,
    pub attributes: HashMap<String, String>,
    /// How many times this message has been delivered, this one included.
    pub receive_count: u32,
}

#[async_trait]
pub trait Queue: Send + Sync {
    async fn send(
        &self,
        body: &str,
        attributes: Option<HashMap<String, String>>,
    ) -> Result<(), QueueError>;

    /// Receive up to `max` messages, long-polling up to `wait`.
    async fn receive(&self, max: usize, wait: Duration) -> Result<Vec<QueueMessage>, QueueError>;

    /// Acknowledge a delivery.
    async fn delete(&self, receipt: &str) -> Result<(), QueueError>;
}
