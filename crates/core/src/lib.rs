pub mod config;
pub mod events;
pub mod inventory;
pub mod order;
pub mod seating;
pub mod sweeper;

pub use config::TicketingConfig;
