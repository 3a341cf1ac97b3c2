use boxoffice_store::{Condition, KvStore};
use boxoffice_types::{Result, TicketStateTransitionAudit};
use serde_json::json;

use crate::codec::{drain_query, from_item, to_item};
use crate::tables;

/// Append one transition record. The table is append-only; nothing updates
/// or deletes audit rows.
pub async fn append(kv: &dyn KvStore, audit: &TicketStateTransitionAudit) -> Result<()> {
    kv.put(tables::TRANSITION_AUDIT, &audit.audit_id, to_item(audit)?)
        .await?;
    Ok(())
}

/// A ticket's transition history
pub async fn list_for_ticket(
    kv: &dyn KvStore,
    ticket_id: &str,
) -> Result<Vec<TicketStateTransitionAudit>> {
    let items = drain_query(
        kv,
        tables::TRANSITION_AUDIT,
        Some(tables::indexes::TICKET_ID_INDEX),
        Condition::Eq("ticket_id".to_string(), json!(ticket_id)),
        None,
    )
    .await?;
    let mut audits: Vec<TicketStateTransitionAudit> = items
        .into_iter()
        .map(from_item)
        .collect::<Result<_>>()?;
    audits.sort_by_key(|a| a.at);
    Ok(audits)
}
