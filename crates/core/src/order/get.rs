use boxoffice_db::queries::{customers, orders, reservations, tickets};
use boxoffice_store::KvStore;
use boxoffice_types::{CustomerInfo, Result, TicketItem, TicketOrder, TicketReservation};

/// An order with everything hanging off it.
#[derive(Debug, Clone)]
pub struct OrderDetails {
    pub order: TicketOrder,
    pub tickets: Vec<TicketItem>,
    pub reservation: Option<TicketReservation>,
    pub customer: Option<CustomerInfo>,
}

pub async fn get_order(kv: &dyn KvStore, order_id: &str) -> Result<OrderDetails> {
    let order = orders::get(kv, order_id).await?;
    let tickets = tickets::list_for_order(kv, order_id).await?;
    let reservation = reservations::find_by_order(kv, order_id).await?;
    let customer = customers::find_by_order(kv, order_id).await?;
    Ok(OrderDetails {
        order,
        tickets,
        reservation,
        customer,
    })
}

pub async fn list_orders_for_customer(
    kv: &dyn KvStore,
    customer_id: &str,
) -> Result<Vec<TicketOrder>> {
    let mut list = orders::list_for_customer(kv, customer_id).await?;
    list.sort_by_key(|o| std::cmp::Reverse(o.created_at));
    Ok(list)
}
