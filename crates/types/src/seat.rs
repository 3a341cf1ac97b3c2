//! Seat label and seat-key encoding.
//!
//! Seats are laid out ten per row, rows lettered from `A`. These string forms
//! are wire formats: stored rows compare them byte-for-byte, so the encoding
//! here must never change.

use crate::enums::TicketType;

/// Seats per row in the candidate layout.
pub const SEATS_PER_ROW: u32 = 10;

/// Label for the seat at linear index `i`: `A-1` .. `A-10`, `B-1`, ...
pub fn seat_label(index: u32) -> String {
    let row = char::from_u32('A' as u32 + index / SEATS_PER_ROW).unwrap_or('?');
    let seat = index % SEATS_PER_ROW + 1;
    format!("{row}-{seat}")
}

/// Uniqueness-lock key for one seat: `{event_id}#{ticket_type}#{seat}`.
pub fn seat_key(event_id: &str, ticket_type: TicketType, seat_number: &str) -> String {
    format!("{event_id}#{}#{seat_number}", ticket_type.as_str())
}

/// Key prefix selecting every seat of one `(event, ticket_type)` namespace.
pub fn seat_key_prefix(event_id: &str, ticket_type: TicketType) -> String {
    format!("{event_id}#{}#", ticket_type.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_walk_rows_of_ten() {
        assert_eq!(seat_label(0), "A-1");
        assert_eq!(seat_label(9), "A-10");
        assert_eq!(seat_label(10), "B-1");
        assert_eq!(seat_label(25), "C-6");
        assert_eq!(seat_label(259), "Z-10");
    }

    #[test]
    fn keys_are_hash_delimited() {
        assert_eq!(seat_key("E1", TicketType::Vip, "A-1"), "E1#VIP#A-1");
        assert_eq!(seat_key_prefix("E1", TicketType::Vip), "E1#VIP#");
        assert!(seat_key("E1", TicketType::Vip, "A-1").starts_with(&seat_key_prefix("E1", TicketType::Vip)));
    }
}
