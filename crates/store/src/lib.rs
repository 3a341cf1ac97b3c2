pub mod kv;
pub mod memory;
pub mod memory_queue;
pub mod queue;

pub use kv::{
    Condition, Filter, Item, KvError, KvStore, Page, Precondition, TransactWriteItem, KEY_ATTR,
};
pub use memory::MemoryKv;
pub use memory_queue::MemoryQueue;
pub use queue::{Queue, QueueError, QueueMessage};
