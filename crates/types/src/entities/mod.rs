pub mod audit;
pub mod customer;
pub mod event;
pub mod inventory;
pub mod order;
pub mod reservation;
pub mod seat_reservation;
pub mod ticket;

use chrono::{DateTime, SubsecRound, Utc};

/// Current time at stored precision. Timestamps persist as whole epoch
/// seconds, so entities are born without sub-second noise and round-trip
/// byte-equal.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

pub use audit::TicketStateTransitionAudit;
pub use customer::CustomerInfo;
pub use event::Event;
pub use inventory::TicketInventory;
pub use order::TicketOrder;
pub use reservation::TicketReservation;
pub use seat_reservation::SeatReservation;
pub use ticket::TicketItem;
