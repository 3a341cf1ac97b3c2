use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::TicketType;
use crate::seat;

/// Durable uniqueness lock for one seat.
///
/// Keyed `{event_id}#{ticket_type}#{seat_number}`; created only by the
/// seat-assignment transaction with a not-exists precondition, and never
/// updated afterwards. The conditional create on this key is what serializes
/// concurrent claims for the same seat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatReservation {
    pub event_id: String,
    pub ticket_type: TicketType,
    pub seat_number: String,
    pub ticket_id: String,
    pub order_id: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub reserved_at: DateTime<Utc>,
}

impl SeatReservation {
    pub fn new(
        event_id: impl Into<String>,
        ticket_type: TicketType,
        seat_number: impl Into<String>,
        ticket_id: impl Into<String>,
        order_id: impl Into<String>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            ticket_type,
            seat_number: seat_number.into(),
            ticket_id: ticket_id.into(),
            order_id: order_id.into(),
            reserved_at: super::now(),
        }
    }

    pub fn key(&self) -> String {
        seat::seat_key(&self.event_id, self.ticket_type, &self.seat_number)
    }
}
