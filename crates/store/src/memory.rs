//! In-memory [`KvStore`] backend.
//!
//! Tables are ordered maps, so scans are deterministic and key-prefix queries
//! work without secondary indexes. All preconditions of a transactional batch
//! are evaluated under one write guard before any item is applied.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::kv::{
    Condition, Filter, Item, KvError, KvStore, Page, Precondition, TransactWriteItem, KEY_ATTR,
};

type Table = BTreeMap<String, Item>;

#[derive(Default)]
pub struct MemoryKv {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Evaluate a precondition against the current row. `Err` carries the reason
/// string reported for cancelled transaction items.
fn check(precondition: &Precondition, existing: Option<&Item>) -> Result<(), String> {
    match precondition {
        Precondition::None => Ok(()),
        Precondition::Exists => {
            if existing.is_some() {
                Ok(())
            } else {
                Err("row does not exist".to_string())
            }
        }
        Precondition::NotExists => {
            if existing.is_none() {
                Ok(())
            } else {
                Err("row already exists".to_string())
            }
        }
        Precondition::VersionIs(expected) => {
            let stored = existing.and_then(|item| item.get("version")).and_then(Value::as_u64);
            if stored == Some(*expected) {
                Ok(())
            } else {
                Err(format!(
                    "version mismatch: expected {expected}, stored {stored:?}"
                ))
            }
        }
        Precondition::AttributeNotSet(name) => {
            let set = existing
                .and_then(|item| item.get(name))
                .map(|v| !v.is_null())
                .unwrap_or(false);
            if set {
                Err(format!("attribute {name} is already set"))
            } else {
                Ok(())
            }
        }
        Precondition::All(conds) => {
            for cond in conds {
                check(cond, existing)?;
            }
            Ok(())
        }
    }
}

fn attr<'a>(key: &'a str, item: &'a Item, name: &str) -> Option<Value> {
    if name == KEY_ATTR {
        Some(Value::String(key.to_string()))
    } else {
        item.get(name).cloned()
    }
}

fn compare(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                Some(x.cmp(&y))
            } else {
                x.as_f64().zip(y.as_f64()).and_then(|(x, y)| x.partial_cmp(&y))
            }
        }
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn matches(key: &str, item: &Item, condition: &Condition) -> bool {
    match condition {
        Condition::Eq(name, expected) => attr(key, item, name).as_ref() == Some(expected),
        Condition::Lt(name, bound) => attr(key, item, name)
            .and_then(|v| compare(&v, bound))
            .is_some_and(|ord| ord.is_lt()),
        Condition::Le(name, bound) => attr(key, item, name)
            .and_then(|v| compare(&v, bound))
            .is_some_and(|ord| ord.is_le()),
        Condition::Gt(name, bound) => attr(key, item, name)
            .and_then(|v| compare(&v, bound))
            .is_some_and(|ord| ord.is_gt()),
        Condition::BeginsWith(name, prefix) => attr(key, item, name)
            .and_then(|v| v.as_str().map(|s| s.starts_with(prefix.as_str())))
            .unwrap_or(false),
    }
}

fn matches_filter(key: &str, item: &Item, filter: Option<&Filter>) -> bool {
    filter.map_or(true, |f| f.0.iter().all(|c| matches(key, item, c)))
}

fn collect_page(
    table: &Table,
    mut accept: impl FnMut(&str, &Item) -> bool,
    exclusive_start_key: Option<String>,
    limit: Option<usize>,
) -> Page {
    let limit = limit.unwrap_or(usize::MAX);
    let mut items = Vec::new();
    let mut last_evaluated_key: Option<String> = None;
    let mut truncated = false;

    let range: Box<dyn Iterator<Item = (&String, &Item)>> = match &exclusive_start_key {
        Some(start) => Box::new(table.range::<String, _>((
            std::ops::Bound::Excluded(start.clone()),
            std::ops::Bound::Unbounded,
        ))),
        None => Box::new(table.iter()),
    };

    for (key, item) in range {
        if items.len() == limit {
            truncated = true;
            break;
        }
        // Track the last evaluated (not last matched) key so continuation
        // resumes past filtered-out rows too.
        last_evaluated_key = Some(key.clone());
        if accept(key, item) {
            items.push(item.clone());
        }
    }

    Page {
        items,
        last_evaluated_key: if truncated { last_evaluated_key } else { None },
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, table: &str, key: &str) -> Result<Option<Item>, KvError> {
        let tables = self.tables.read().await;
        Ok(tables.get(table).and_then(|t| t.get(key)).cloned())
    }

    async fn put(&self, table: &str, key: &str, item: Item) -> Result<(), KvError> {
        let mut tables = self.tables.write().await;
        tables.entry(table.to_string()).or_default().insert(key.to_string(), item);
        Ok(())
    }

    async fn put_if(
        &self,
        table: &str,
        key: &str,
        item: Item,
        precondition: Precondition,
    ) -> Result<(), KvError> {
        let mut tables = self.tables.write().await;
        let t = tables.entry(table.to_string()).or_default();
        check(&precondition, t.get(key)).map_err(|_| KvError::PreconditionFailed)?;
        t.insert(key.to_string(), item);
        Ok(())
    }

    async fn update_if(
        &self,
        table: &str,
        key: &str,
        patch: Item,
        precondition: Precondition,
    ) -> Result<(), KvError> {
        let mut tables = self.tables.write().await;
        let t = tables.entry(table.to_string()).or_default();
        check(&precondition, t.get(key)).map_err(|_| KvError::PreconditionFailed)?;
        let row = t.entry(key.to_string()).or_default();
        for (name, value) in patch {
            row.insert(name, value);
        }
        Ok(())
    }

    async fn delete(&self, table: &str, key: &str) -> Result<(), KvError> {
        let mut tables = self.tables.write().await;
        if let Some(t) = tables.get_mut(table) {
            t.remove(key);
        }
        Ok(())
    }

    async fn query(
        &self,
        table: &str,
        _index: Option<&str>,
        key_condition: Condition,
        filter: Option<Filter>,
        exclusive_start_key: Option<String>,
        limit: Option<usize>,
    ) -> Result<Page, KvError> {
        let tables = self.tables.read().await;
        let Some(t) = tables.get(table) else {
            return Ok(Page::default());
        };
        // No native indexes here: the key condition is evaluated row by row.
        Ok(collect_page(
            t,
            |key, item| matches(key, item, &key_condition) && matches_filter(key, item, filter.as_ref()),
            exclusive_start_key,
            limit,
        ))
    }

    async fn scan(
        &self,
        table: &str,
        filter: Option<Filter>,
        exclusive_start_key: Option<String>,
        limit: Option<usize>,
    ) -> Result<Page, KvError> {
        let tables = self.tables.read().await;
        let Some(t) = tables.get(table) else {
            return Ok(Page::default());
        };
        Ok(collect_page(
            t,
            |key, item| matches_filter(key, item, filter.as_ref()),
            exclusive_start_key,
            limit,
        ))
    }

    async fn transact_write(&self, items: Vec<TransactWriteItem>) -> Result<(), KvError> {
        let mut tables = self.tables.write().await;

        // Phase 1: evaluate every precondition against the pre-batch state.
        let mut reasons: Vec<Option<String>> = Vec::with_capacity(items.len());
        let mut cancelled = false;
        for item in &items {
            let (table, key, precondition) = match item {
                TransactWriteItem::Put {
                    table,
                    key,
                    precondition,
                    ..
                }
                | TransactWriteItem::Update {
                    table,
                    key,
                    precondition,
                    ..
                }
                | TransactWriteItem::ConditionCheck {
                    table,
                    key,
                    precondition,
                } => (table, key, precondition),
            };
            let existing = tables.get(table.as_str()).and_then(|t| t.get(key.as_str()));
            match check(precondition, existing) {
                Ok(()) => reasons.push(None),
                Err(reason) => {
                    cancelled = true;
                    reasons.push(Some(reason));
                }
            }
        }
        if cancelled {
            return Err(KvError::TransactionCancelled { reasons });
        }

        // Phase 2: apply. Nothing below can fail, so the batch is atomic.
        for item in items {
            match item {
                TransactWriteItem::Put {
                    table, key, item, ..
                } => {
                    tables.entry(table).or_default().insert(key, item);
                }
                TransactWriteItem::Update {
                    table, key, patch, ..
                } => {
                    let row = tables.entry(table).or_default().entry(key).or_default();
                    for (name, value) in patch {
                        row.insert(name, value);
                    }
                }
                TransactWriteItem::ConditionCheck { .. } => {}
            }
        }
        Ok(())
    }
}
