use boxoffice_store::{Condition, KvStore, KEY_ATTR};
use boxoffice_types::{seat, Result, SeatReservation, TicketType};

use crate::codec::{drain_query, from_item};
use crate::tables;

/// Every seat lock held in one `(event, ticket_type)` namespace. This is the
/// authoritative occupied set for seat assignment.
pub async fn list_for_type(
    kv: &dyn KvStore,
    event_id: &str,
    ticket_type: TicketType,
) -> Result<Vec<SeatReservation>> {
    let prefix = seat::seat_key_prefix(event_id, ticket_type);
    let items = drain_query(
        kv,
        tables::SEAT_RESERVATIONS,
        None,
        Condition::BeginsWith(KEY_ATTR.to_string(), prefix),
        None,
    )
    .await?;
    items.into_iter().map(from_item).collect()
}

/// Look up a single seat lock
pub async fn find(
    kv: &dyn KvStore,
    event_id: &str,
    ticket_type: TicketType,
    seat_number: &str,
) -> Result<Option<SeatReservation>> {
    let key = seat::seat_key(event_id, ticket_type, seat_number);
    let item = kv.get(tables::SEAT_RESERVATIONS, &key).await?;
    item.map(from_item).transpose()
}
