use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{TicketStatus, TicketType};
use crate::errors::{Result, TicketError};
use crate::money::Money;

/// One purchasable unit. Acquires its seat number on the terminal transition
/// and never changes it afterwards; a terminal status is never left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketItem {
    pub ticket_id: String,
    pub order_id: String,
    pub reservation_id: String,
    pub event_id: String,
    pub ticket_type: TicketType,
    pub seat_number: Option<String>,
    pub price: Money,
    pub status: TicketStatus,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub status_changed_at: DateTime<Utc>,
    pub status_changed_by: String,
}

impl TicketItem {
    pub fn new(
        order_id: impl Into<String>,
        reservation_id: impl Into<String>,
        event_id: impl Into<String>,
        ticket_type: TicketType,
        price: Money,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            ticket_id: Uuid::new_v4().to_string(),
            order_id: order_id.into(),
            reservation_id: reservation_id.into(),
            event_id: event_id.into(),
            ticket_type,
            seat_number: None,
            price,
            status: TicketStatus::Available,
            status_changed_at: super::now(),
            status_changed_by: created_by.into(),
        }
    }

    fn transition(
        self,
        allowed: &[TicketStatus],
        target: TicketStatus,
        required: &str,
        by: &str,
    ) -> Result<Self> {
        if !allowed.contains(&self.status) {
            return Err(TicketError::InvalidStateTransition {
                from: self.status.to_string(),
                required: required.to_string(),
            });
        }
        Ok(Self {
            status: target,
            status_changed_at: super::now(),
            status_changed_by: by.to_string(),
            ..self
        })
    }

    pub fn reserve(self, by: &str) -> Result<Self> {
        self.transition(&[TicketStatus::Available], TicketStatus::Reserved, "AVAILABLE", by)
    }

    pub fn confirm(self, by: &str) -> Result<Self> {
        self.transition(
            &[TicketStatus::Reserved],
            TicketStatus::PendingConfirmation,
            "RESERVED",
            by,
        )
    }

    pub fn cancel(self, by: &str) -> Result<Self> {
        self.transition(
            &[
                TicketStatus::Available,
                TicketStatus::Reserved,
                TicketStatus::PendingConfirmation,
            ],
            TicketStatus::Cancelled,
            "AVAILABLE, RESERVED or PENDING_CONFIRMATION",
            by,
        )
    }

    /// Local view of the seat-assignment commit: seat set exactly once,
    /// status moved to the requested terminal state. The authoritative write
    /// is the store transaction; this mirrors it on the in-memory value.
    pub fn assign_seat(self, seat_number: &str, target: TicketStatus, by: &str) -> Result<Self> {
        if !target.is_terminal() {
            return Err(TicketError::InvalidStateTransition {
                from: self.status.to_string(),
                required: "SOLD or COMPLIMENTARY".to_string(),
            });
        }
        if self.status.is_terminal() || self.seat_number.is_some() {
            return Err(TicketError::InvalidStateTransition {
                from: self.status.to_string(),
                required: "a non-terminal, seatless ticket".to_string(),
            });
        }
        Ok(Self {
            seat_number: Some(seat_number.to_string()),
            status: target,
            status_changed_at: super::now(),
            status_changed_by: by.to_string(),
            ..self
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn ticket() -> TicketItem {
        TicketItem::new(
            "O1",
            "R1",
            "E1",
            TicketType::Vip,
            Money::usd(Decimal::new(15000, 2)),
            "system",
        )
    }

    #[test]
    fn seat_is_assigned_exactly_once() {
        let t = ticket()
            .assign_seat("A-1", TicketStatus::Sold, "seller")
            .unwrap();
        assert_eq!(t.seat_number.as_deref(), Some("A-1"));
        assert_eq!(t.status, TicketStatus::Sold);
        assert!(t.assign_seat("A-2", TicketStatus::Sold, "seller").is_err());
    }

    #[test]
    fn assign_rejects_non_terminal_target() {
        assert!(ticket()
            .assign_seat("A-1", TicketStatus::Reserved, "seller")
            .is_err());
    }

    #[test]
    fn reserve_then_confirm_tracks_actor() {
        let t = ticket().reserve("worker-1").unwrap();
        assert_eq!(t.status_changed_by, "worker-1");
        let t = t.confirm("checkout").unwrap();
        assert_eq!(t.status, TicketStatus::PendingConfirmation);
    }

    #[test]
    fn terminal_ticket_rejects_cancel() {
        let sold = ticket()
            .assign_seat("A-1", TicketStatus::Complimentary, "host")
            .unwrap();
        assert!(sold.cancel("anyone").is_err());
    }
}
