use boxoffice_store::{KvError, QueueError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TicketError>;

#[derive(Debug, Error)]
pub enum TicketError {
    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("event not found: {0}")]
    EventNotFound(String),

    #[error("inventory not found: {0}")]
    InventoryNotFound(String),

    #[error("insufficient inventory: requested {requested}, available {available}")]
    InsufficientInventory { available: u32, requested: u32 },

    #[error("invalid state transition from {from}: {required} required")]
    InvalidStateTransition { from: String, required: String },

    #[error("inventory already exists: {0}")]
    DuplicateInventory(String),

    #[error("duplicate ticket in request: {0}")]
    DuplicateTicket(String),

    #[error("seat pool exhausted")]
    SeatExhaustion,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("optimistic lock conflict on {0}")]
    OptimisticLockConflict(String),

    #[error("seat assignment failed after {attempts} attempts")]
    SeatAssignmentFailed { attempts: u32 },

    #[error("store error: {0}")]
    Store(#[from] KvError),

    #[error("serialization error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
}

impl TicketError {
    /// Stable machine-readable kind for the API layer and logs. No stack
    /// traces or backend detail leak through this.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OrderNotFound(_) => "ORDER_NOT_FOUND",
            Self::EventNotFound(_) => "EVENT_NOT_FOUND",
            Self::InventoryNotFound(_) => "INVENTORY_NOT_FOUND",
            Self::InsufficientInventory { .. } => "INSUFFICIENT_INVENTORY",
            Self::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            Self::DuplicateInventory(_) => "DUPLICATE_INVENTORY",
            Self::DuplicateTicket(_) => "DUPLICATE_TICKET",
            Self::SeatExhaustion => "SEAT_EXHAUSTION",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::OptimisticLockConflict(_) => "OPTIMISTIC_LOCK_CONFLICT",
            Self::SeatAssignmentFailed { .. } => "SEAT_ASSIGNMENT_FAILED",
            Self::Store(KvError::Timeout) => "TIMEOUT",
            Self::Store(KvError::Cancelled) => "CANCELLED",
            Self::Store(_) => "STORE_UNAVAILABLE",
            Self::Codec(_) => "SERIALIZATION_ERROR",
            Self::Queue(_) => "QUEUE_UNAVAILABLE",
        }
    }

    /// Whether a caller may reasonably retry the whole operation. Domain-rule
    /// and not-found failures are final; contention and infrastructure
    /// failures are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::OptimisticLockConflict(_)
                | Self::SeatAssignmentFailed { .. }
                | Self::Store(KvError::Unavailable(_))
                | Self::Store(KvError::Timeout)
                | Self::Queue(QueueError::Unavailable(_))
        )
    }
}
