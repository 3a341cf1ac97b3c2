pub mod cancel;
pub mod complimentary;
pub mod confirm;
pub mod create;
pub mod get;
pub mod process;
pub mod sell;
pub mod utils;

pub use cancel::cancel_order;
pub use complimentary::mark_as_complimentary;
pub use confirm::{confirm_order, PaymentDetails};
pub use create::create_order;
pub use get::{get_order, list_orders_for_customer, OrderDetails};
pub use process::process_order;
pub use sell::mark_as_sold;
pub use utils::generate_order_number;
