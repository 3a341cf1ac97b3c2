use boxoffice_db::queries::{audit, customers, orders, tickets};
use boxoffice_store::KvStore;
use boxoffice_types::{
    CustomerInfo, Result, TicketError, TicketOrder, TicketStateTransitionAudit, TicketStatus,
};

/// Customer payment metadata captured at confirmation.
#[derive(Debug, Clone)]
pub struct PaymentDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub payment_method: String,
}

/// Attach payment metadata and move a reserved order to
/// `PENDING_CONFIRMATION`.
pub async fn confirm_order(
    kv: &dyn KvStore,
    order_id: &str,
    details: PaymentDetails,
) -> Result<TicketOrder> {
    let order = orders::get(kv, order_id).await?;
    if order.status != TicketStatus::Reserved {
        return Err(TicketError::InvalidStateTransition {
            from: order.status.to_string(),
            required: "RESERVED".to_string(),
        });
    }

    // One customer-info row per order.
    let customer = CustomerInfo::new(
        &order.order_id,
        &order.customer_id,
        details.name,
        details.email,
        details.phone,
        details.address,
        details.city,
        details.country,
        details.payment_method,
    );
    customers::save(kv, &customer).await?;

    // Tickets follow the order proportionally.
    let performed_by = order.customer_id.clone();
    let items = tickets::list_for_order(kv, order_id).await?;
    for item in items {
        let from = item.status;
        let ticket_id = item.ticket_id.clone();
        match item.confirm(&performed_by) {
            Ok(confirmed) => {
                tickets::save(kv, &confirmed).await?;
                let _ = audit::append(
                    kv,
                    &TicketStateTransitionAudit::success(
                        &ticket_id,
                        from,
                        TicketStatus::PendingConfirmation,
                        &performed_by,
                        None,
                    ),
                )
                .await;
            }
            Err(err) => {
                tracing::warn!(order_id, ticket_id = %ticket_id, error = %err, "skipping ticket");
                let _ = audit::append(
                    kv,
                    &TicketStateTransitionAudit::failure(
                        &ticket_id,
                        from,
                        TicketStatus::PendingConfirmation,
                        &performed_by,
                        err.to_string(),
                    ),
                )
                .await;
            }
        }
    }

    let confirmed = order.confirm()?;
    orders::update_with_lock(kv, &confirmed).await?;

    tracing::info!(order_id, "order confirmed, awaiting settlement");
    Ok(confirmed)
}
