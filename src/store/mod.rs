//! Flat, persistent table of named items.

mod sqlite;

pub use sqlite::{SqliteItemStore, open_pool};

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// Async item persistence contract. Ids are assigned on insert and never
/// reused, not even after `reset`.
pub trait ItemStore: Send + Sync {
    fn create<'a>(
        &'a self,
        name: &'a str,
        description: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Item, StoreError>> + Send + 'a>>;

    /// All items in insertion order.
    fn list(&self) -> Pin<Box<dyn Future<Output = Result<Vec<Item>, StoreError>> + Send + '_>>;

    fn get(&self, id: i64) -> Pin<Box<dyn Future<Output = Result<Item, StoreError>> + Send + '_>>;

    /// Delete every item. Returns how many were removed.
    fn reset(&self) -> Pin<Box<dyn Future<Output = Result<u64, StoreError>> + Send + '_>>;
}
