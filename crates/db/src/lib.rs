pub mod codec;
pub mod queries;
pub mod tables;

pub use boxoffice_store::{KvStore, MemoryKv};
pub use codec::{from_item, to_item};
