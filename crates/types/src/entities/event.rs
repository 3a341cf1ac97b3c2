use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::EventStatus;
use crate::errors::{Result, TicketError};

/// Aggregate event row with capacity counters.
///
/// Counter mutations return a new value with `version + 1`; the previous
/// value is untouched. Conservation law: `available + reserved + sold`
/// never exceeds `total_capacity` and no counter goes negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub name: String,
    pub venue: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub event_date: DateTime<Utc>,
    pub total_capacity: u32,
    pub available: u32,
    pub reserved: u32,
    pub sold: u32,
    pub status: EventStatus,
    pub version: u64,
}

impl Event {
    pub fn new(
        name: impl Into<String>,
        venue: impl Into<String>,
        event_date: DateTime<Utc>,
        total_capacity: u32,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            name: name.into(),
            venue: venue.into(),
            // Stored precision is whole epoch seconds.
            event_date: event_date.trunc_subsecs(0),
            total_capacity,
            available: total_capacity,
            reserved: 0,
            sold: 0,
            status: EventStatus::Active,
            version: 1,
        }
    }

    /// Move `quantity` seats from the open pool into held state.
    pub fn reserve(self, quantity: u32) -> Result<Self> {
        if self.available < quantity {
            return Err(TicketError::InsufficientInventory {
                available: self.available,
                requested: quantity,
            });
        }
        Ok(Self {
            available: self.available - quantity,
            reserved: self.reserved + quantity,
            version: self.version + 1,
            ..self
        })
    }

    /// Return `quantity` held seats to the open pool.
    pub fn release_reserved(self, quantity: u32) -> Result<Self> {
        if self.reserved < quantity {
            return Err(TicketError::InsufficientInventory {
                available: self.reserved,
                requested: quantity,
            });
        }
        Ok(Self {
            available: self.available + quantity,
            reserved: self.reserved - quantity,
            version: self.version + 1,
            ..self
        })
    }

    /// Promote `quantity` held seats to sold. The open pool is untouched.
    pub fn confirm_reserved(self, quantity: u32) -> Result<Self> {
        if self.reserved < quantity {
            return Err(TicketError::InsufficientInventory {
                available: self.reserved,
                requested: quantity,
            });
        }
        Ok(Self {
            reserved: self.reserved - quantity,
            sold: self.sold + quantity,
            version: self.version + 1,
            ..self
        })
    }
}
