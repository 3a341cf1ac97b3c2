//! Key-value store contract.
//!
//! Every mutable domain row lives behind this trait. The engine coordinates
//! exclusively through conditional writes and multi-row transactions, so the
//! contract carries preconditions on every write path. Backends are pluggable
//! (`MemoryKv` ships with the workspace; a hosted document store slots in
//! behind the same trait).

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// A stored row: a flat attribute map.
pub type Item = serde_json::Map<String, Value>;

/// Pseudo-attribute naming the row key, usable in conditions and filters.
pub const KEY_ATTR: &str = "#key";

#[derive(Debug, Error)]
pub enum KvError {
    #[error("conditional write precondition failed")]
    PreconditionFailed,

    #[error("transaction cancelled ({} items)", .reasons.len())]
    TransactionCancelled {
        /// One entry per transaction item; `Some` carries the cancellation
        /// reason for the item that failed its precondition.
        reasons: Vec<Option<String>>,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store operation timed out")]
    Timeout,

    #[error("store operation cancelled")]
    Cancelled,
}

/// Write precondition, evaluated atomically against the current row.
#[derive(Debug, Clone)]
pub enum Precondition {
    None,
    /// The row must exist.
    Exists,
    /// The row must not exist. Conditional-create on a primary key; this is
    /// the uniqueness gate the seat protocol relies on.
    NotExists,
    /// The row's `version` attribute must equal the given value exactly.
    VersionIs(u64),
    /// The named attribute must be absent or null.
    AttributeNotSet(String),
    /// Conjunction.
    All(Vec<Precondition>),
}

impl Precondition {
    pub fn all(conds: impl IntoIterator<Item = Precondition>) -> Self {
        Self::All(conds.into_iter().collect())
    }
}

/// A single comparison against a named attribute (or [`KEY_ATTR`]).
#[derive(Debug, Clone)]
pub enum Condition {
    Eq(String, Value),
    Lt(String, Value),
    Le(String, Value),
    Gt(String, Value),
    BeginsWith(String, String),
}

/// Conjunction of conditions applied to scan/query results.
#[derive(Debug, Clone, Default)]
pub struct Filter(pub Vec<Condition>);

impl Filter {
    pub fn new(conds: impl IntoIterator<Item = Condition>) -> Self {
        Self(conds.into_iter().collect())
    }
}

/// One page of a lazy scan/query. `last_evaluated_key` feeds the next call's
/// `exclusive_start_key`; `None` means the sequence is exhausted.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<Item>,
    pub last_evaluated_key: Option<String>,
}

/// One member of a transactional write batch.
#[derive(Debug, Clone)]
pub enum TransactWriteItem {
    Put {
        table: String,
        key: String,
        item: Item,
        precondition: Precondition,
    },
    Update {
        table: String,
        key: String,
        /// Top-level attributes merged into the existing row.
        patch: Item,
        precondition: Precondition,
    },
    ConditionCheck {
        table: String,
        key: String,
        precondition: Precondition,
    },
}

/// Key-value store with conditional and transactional writes.
///
/// Suspension points: every method may suspend. Writes commit at a single
/// point, so a caller aborted between calls never leaves a torn row.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, table: &str, key: &str) -> Result<Option<Item>, KvError>;

    /// Unconditional put (create or replace).
    async fn put(&self, table: &str, key: &str, item: Item) -> Result<(), KvError>;

    /// Conditional put. Fails with [`KvError::PreconditionFailed`] when the
    /// precondition does not hold against the current row.
    async fn put_if(
        &self,
        table: &str,
        key: &str,
        item: Item,
        precondition: Precondition,
    ) -> Result<(), KvError>;

    /// Conditional partial update. The patch's top-level attributes are
    /// merged into the existing row (created empty when absent and the
    /// precondition allows it).
    async fn update_if(
        &self,
        table: &str,
        key: &str,
        patch: Item,
        precondition: Precondition,
    ) -> Result<(), KvError>;

    async fn delete(&self, table: &str, key: &str) -> Result<(), KvError>;

    /// Query by key condition, optionally on a secondary index. Backends
    /// without native indexes may evaluate the key condition as a filter.
    async fn query(
        &self,
        table: &str,
        index: Option<&str>,
        key_condition: Condition,
        filter: Option<Filter>,
        exclusive_start_key: Option<String>,
        limit: Option<usize>,
    ) -> Result<Page, KvError>;

    /// Full-table scan with an optional filter.
    async fn scan(
        &self,
        table: &str,
        filter: Option<Filter>,
        exclusive_start_key: Option<String>,
        limit: Option<usize>,
    ) -> Result<Page, KvError>;

    /// Atomically commit a batch of conditional puts, updates and condition
    /// checks. Either every item applies or none does; a cancelled batch
    /// reports per-item reasons.
    async fn transact_write(&self, items: Vec<TransactWriteItem>) -> Result<(), KvError>;
}
