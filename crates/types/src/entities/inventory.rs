use serde::{Deserialize, Serialize};

use crate::enums::TicketType;
use crate::errors::{Result, TicketError};
use crate::money::Money;

/// Per-`(event, ticket_type)` counter row. The price is fixed at creation.
///
/// Same conservation law as [`crate::entities::Event`], enforced per row:
/// `available + reserved + sold ≤ total`, all counters non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketInventory {
    pub event_id: String,
    pub ticket_type: TicketType,
    pub event_name: String,
    pub total: u32,
    pub available: u32,
    pub reserved: u32,
    pub sold: u32,
    pub price: Money,
    pub version: u64,
}

impl TicketInventory {
    pub fn new(
        event_id: impl Into<String>,
        event_name: impl Into<String>,
        ticket_type: TicketType,
        total: u32,
        price: Money,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            ticket_type,
            event_name: event_name.into(),
            total,
            available: total,
            reserved: 0,
            sold: 0,
            price,
            version: 1,
        }
    }

    /// Storage key: `{event_id}#{ticket_type}`.
    pub fn key(&self) -> String {
        Self::key_for(&self.event_id, self.ticket_type)
    }

    pub fn key_for(event_id: &str, ticket_type: TicketType) -> String {
        format!("{event_id}#{}", ticket_type.as_str())
    }

    /// Hold `quantity` tickets: `available -= n`, `reserved += n`.
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

    /// Reverse of [`Self::reserve`]: the hold lapses and the tickets return
    /// to the pool.
    pub fn release_reservation(self, quantity: u32) -> Result<Self> {
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

    /// Settle a hold: `reserved -= n`, `sold += n`. `available` untouched.
    pub fn confirm_reservation(self, quantity: u32) -> Result<Self> {
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
