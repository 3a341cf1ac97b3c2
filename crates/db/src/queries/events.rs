use boxoffice_store::{KvStore, Precondition};
use boxoffice_types::{Event, Result, TicketError};

use crate::codec::{from_item, to_item};
use crate::tables;

/// Find event by ID
pub async fn find_by_id(kv: &dyn KvStore, event_id: &str) -> Result<Option<Event>> {
    let item = kv.get(tables::EVENTS, event_id).await?;
    item.map(from_item).transpose()
}

/// Create event (fails if the ID is already taken)
pub async fn create(kv: &dyn KvStore, event: &Event) -> Result<()> {
    kv.put_if(
        tables::EVENTS,
        &event.event_id,
        to_item(event)?,
        Precondition::NotExists,
    )
    .await?;
    Ok(())
}

/// Persist a counter mutation under the optimistic version lock.
///
/// The stored row must still be at `event.version - 1`; a concurrent writer
/// surfaces as [`TicketError::OptimisticLockConflict`] and the caller
/// re-reads and re-applies.
pub async fn update_with_lock(kv: &dyn KvStore, event: &Event) -> Result<()> {
    kv.put_if(
        tables::EVENTS,
        &event.event_id,
        to_item(event)?,
        Precondition::VersionIs(event.version - 1),
    )
    .await
    .map_err(|err| match err {
        boxoffice_store::KvError::PreconditionFailed => {
            TicketError::OptimisticLockConflict(format!("Events {}", event.event_id))
        }
        other => other.into(),
    })
}
