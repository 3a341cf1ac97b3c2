use boxoffice_store::{KvStore, Precondition};
use boxoffice_types::{Result, TicketError, TicketInventory, TicketType};

use crate::codec::{from_item, to_item};
use crate::tables;

/// Find inventory by (event, ticket type)
pub async fn find(
    kv: &dyn KvStore,
    event_id: &str,
    ticket_type: TicketType,
) -> Result<Option<TicketInventory>> {
    let key = TicketInventory::key_for(event_id, ticket_type);
    let item = kv.get(tables::TICKET_INVENTORY, &key).await?;
    item.map(from_item).transpose()
}

/// Create inventory for a (event, ticket type) pair. The price is fixed
/// here; a second create for the same pair is a domain error.
pub async fn create(kv: &dyn KvStore, inventory: &TicketInventory) -> Result<()> {
    kv.put_if(
        tables::TICKET_INVENTORY,
        &inventory.key(),
        to_item(inventory)?,
        Precondition::NotExists,
    )
    .await
    .map_err(|err| match err {
        boxoffice_store::KvError::PreconditionFailed => {
            TicketError::DuplicateInventory(inventory.key())
        }
        other => other.into(),
    })
}

/// Persist a counter mutation under the optimistic version lock.
pub async fn update_with_lock(kv: &dyn KvStore, inventory: &TicketInventory) -> Result<()> {
    kv.put_if(
        tables::TICKET_INVENTORY,
        &inventory.key(),
        to_item(inventory)?,
        Precondition::VersionIs(inventory.version - 1),
    )
    .await
    .map_err(|err| match err {
        boxoffice_store::KvError::PreconditionFailed => {
            TicketError::OptimisticLockConflict(format!("TicketInventory {}", inventory.key()))
        }
        other => other.into(),
    })
}
