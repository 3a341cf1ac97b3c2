use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{ReservationStatus, TicketType};
use crate::errors::{Result, TicketError};

/// Time-bounded hold on `quantity` tickets, attached to one order.
///
/// Terminated either by confirmation (sale/complimentary) or by the sweeper
/// once `expires_at` has passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketReservation {
    pub reservation_id: String,
    pub order_id: String,
    pub event_id: String,
    pub ticket_type: TicketType,
    pub quantity: u32,
    pub status: ReservationStatus,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

impl TicketReservation {
    pub fn new(
        order_id: impl Into<String>,
        event_id: impl Into<String>,
        ticket_type: TicketType,
        quantity: u32,
        lifetime: Duration,
    ) -> Self {
        let now = super::now();
        Self {
            reservation_id: Uuid::new_v4().to_string(),
            order_id: order_id.into(),
            event_id: event_id.into(),
            ticket_type,
            quantity,
            status: ReservationStatus::Active,
            expires_at: now + lifetime,
            created_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == ReservationStatus::Active && self.expires_at < now
    }

    /// `ACTIVE → CONFIRMED`: the hold settled into a sale or comp.
    pub fn confirm(self) -> Result<Self> {
        if self.status != ReservationStatus::Active {
            return Err(TicketError::InvalidStateTransition {
                from: self.status.to_string(),
                required: "ACTIVE".to_string(),
            });
        }
        Ok(Self {
            status: ReservationStatus::Confirmed,
            ..self
        })
    }

    /// `ACTIVE → RELEASED`: the order was cancelled before payment.
    pub fn release(self) -> Result<Self> {
        if self.status != ReservationStatus::Active {
            return Err(TicketError::InvalidStateTransition {
                from: self.status.to_string(),
                required: "ACTIVE".to_string(),
            });
        }
        Ok(Self {
            status: ReservationStatus::Released,
            ..self
        })
    }

    /// `→ EXPIRED`, unconditionally. The sweeper marks a reservation expired
    /// even when counter compensation was skipped, so one reservation is
    /// never swept twice.
    pub fn expire(self) -> Self {
        Self {
            status: ReservationStatus::Expired,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reservation(lifetime: Duration) -> TicketReservation {
        TicketReservation::new("O1", "E1", TicketType::Vip, 5, lifetime)
    }

    #[test]
    fn expires_after_lifetime() {
        let r = reservation(Duration::minutes(10));
        assert!(r.expires_at > r.created_at);
        assert!(!r.is_expired(Utc::now()));
        assert!(r.is_expired(Utc::now() + Duration::minutes(11)));
    }

    #[test]
    fn confirmed_reservation_never_reads_expired() {
        let r = reservation(Duration::minutes(10)).confirm().unwrap();
        assert_eq!(r.status, ReservationStatus::Confirmed);
        assert!(!r.is_expired(Utc::now() + Duration::hours(1)));
        assert!(r.confirm().is_err());
    }

    #[test]
    fn expire_is_unconditional() {
        let r = reservation(Duration::minutes(10)).confirm().unwrap().expire();
        assert_eq!(r.status, ReservationStatus::Expired);
    }
}
