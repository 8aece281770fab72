//! Last-resort tier: built-in defaults plus every write made by this process.

use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<&'static str, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents of a collection, seeding it with `defaults` on first use.
    pub async fn snapshot<F>(&self, collection: &'static str, defaults: F) -> Vec<Value>
    where
        F: FnOnce() -> Vec<Value>,
    {
        if let Some(items) = self.collections.read().await.get(collection) {
            return items.clone();
        }

        let mut guard = self.collections.write().await;
        guard.entry(collection).or_insert_with(defaults).clone()
    }

    /// Apply a mutation to a collection, seeding it with `defaults` on first use.
    pub async fn update<D, F>(&self, collection: &'static str, defaults: D, apply: F)
    where
        D: FnOnce() -> Vec<Value>,
        F: FnOnce(&mut Vec<Value>),
    {
        let mut guard = self.collections.write().await;
        let items = guard.entry(collection).or_insert_with(defaults);
        apply(items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn seeds_once_then_keeps_writes() {
        tokio_test::block_on(async {
            let memory = MemoryStore::new();

            let first = memory.snapshot("posts", || vec![json!({"id": 1})]).await;
            assert_eq!(first.len(), 1);

            memory
                .update("posts", Vec::new, |items| items.push(json!({"id": 2})))
                .await;

            // Defaults are not applied a second time.
            let second = memory.snapshot("posts", || vec![json!({"id": 9})]).await;
            assert_eq!(second.len(), 2);
        });
    }
}
