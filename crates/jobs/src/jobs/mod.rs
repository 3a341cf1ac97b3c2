pub mod expire_reservations;
pub mod order_worker;

pub use expire_reservations::release_expired_reservations;
pub use order_worker::run_order_worker;
