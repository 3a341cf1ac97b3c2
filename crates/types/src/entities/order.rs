use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{TicketStatus, TicketType};
use crate::errors::{Result, TicketError};
use crate::money::Money;

/// A customer's intent to buy `quantity` tickets of one type for one event.
///
/// ```text
/// AVAILABLE ──reserve──► RESERVED ──confirm──► PENDING_CONFIRMATION ──sold──► SOLD
/// {AVAILABLE,RESERVED,PENDING_CONFIRMATION} ──complimentary──► COMPLIMENTARY
/// {AVAILABLE,RESERVED,PENDING_CONFIRMATION} ──cancel──► CANCELLED
/// ```
///
/// `SOLD` and `COMPLIMENTARY` are terminal. Every transition checks the
/// source status and bumps `version`, which is the optimistic-lock field
/// linearizing concurrent updates to one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketOrder {
    pub order_id: String,
    pub customer_id: String,
    pub order_number: String,
    pub event_id: String,
    pub event_name: String,
    pub ticket_type: TicketType,
    pub quantity: u32,
    pub status: TicketStatus,
    pub total_amount: Money,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

impl TicketOrder {
    pub fn new(
        customer_id: impl Into<String>,
        order_number: impl Into<String>,
        event_id: impl Into<String>,
        event_name: impl Into<String>,
        ticket_type: TicketType,
        quantity: u32,
        total_amount: Money,
    ) -> Self {
        let now = super::now();
        Self {
            order_id: Uuid::new_v4().to_string(),
            customer_id: customer_id.into(),
            order_number: order_number.into(),
            event_id: event_id.into(),
            event_name: event_name.into(),
            ticket_type,
            quantity,
            status: TicketStatus::Available,
            total_amount,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    fn transition(self, allowed: &[TicketStatus], target: TicketStatus, required: &str) -> Result<Self> {
        if !allowed.contains(&self.status) {
            return Err(TicketError::InvalidStateTransition {
                from: self.status.to_string(),
                required: required.to_string(),
            });
        }
        Ok(Self {
            status: target,
            updated_at: super::now(),
            version: self.version + 1,
            ..self
        })
    }

    /// `AVAILABLE → RESERVED` (async worker).
    pub fn reserve(self) -> Result<Self> {
        self.transition(&[TicketStatus::Available], TicketStatus::Reserved, "AVAILABLE")
    }

    /// `RESERVED → PENDING_CONFIRMATION` (payment details attached).
    pub fn confirm(self) -> Result<Self> {
        self.transition(
            &[TicketStatus::Reserved],
            TicketStatus::PendingConfirmation,
            "RESERVED",
        )
    }

    /// `PENDING_CONFIRMATION → SOLD`. Terminal.
    pub fn mark_sold(self) -> Result<Self> {
        self.transition(
            &[TicketStatus::PendingConfirmation],
            TicketStatus::Sold,
            "PENDING_CONFIRMATION",
        )
    }

    /// Any non-terminal, non-cancelled state `→ COMPLIMENTARY`. Terminal.
    pub fn mark_complimentary(self) -> Result<Self> {
        self.transition(
            &[
                TicketStatus::Available,
                TicketStatus::Reserved,
                TicketStatus::PendingConfirmation,
            ],
            TicketStatus::Complimentary,
            "AVAILABLE, RESERVED or PENDING_CONFIRMATION",
        )
    }

    /// Any non-terminal, non-cancelled state `→ CANCELLED`.
    pub fn cancel(self) -> Result<Self> {
        self.transition(
            &[
                TicketStatus::Available,
                TicketStatus::Reserved,
                TicketStatus::PendingConfirmation,
            ],
            TicketStatus::Cancelled,
            "AVAILABLE, RESERVED or PENDING_CONFIRMATION",
        )
    }
}
