// src/store/memory.rs
use super::{Entity, Repository, StoreError};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Coleção em memória, com a mesma semântica da versão em ficheiro.
pub struct MemoryRepository<T> {
    name: String,
    items: RwLock<Vec<T>>,
}

impl<T: Entity> MemoryRepository<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), items: RwLock::new(Vec::new()) }
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for MemoryRepository<T> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list(&self) -> Result<Vec<T>, StoreError> {
        Ok(self.items.read().await.clone())
    }

    async fn find(&self, id: &str) -> Result<Option<T>, StoreError> {
        Ok(self.items.read().await.iter().find(|item| item.id() == id).cloned())
    }

    async fn insert(&self, item: T) -> Result<T, StoreError> {
        let mut items = self.items.write().await;
        if items.iter().any(|existing| existing.id() == item.id()) {
            return Err(StoreError::DuplicateId(item.id().to_string()));
        }
        items.push(item.clone());
        Ok(item)
    }

    async fn replace(&self, item: T) -> Result<bool, StoreError> {
        let mut items = self.items.write().await;
        match items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(slot) => {
                *slot = item;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: &str) -> Result<Option<T>, StoreError> {
        let mut items = self.items.write().await;
        Ok(items.iter().position(|item| item.id() == id).map(|pos| items.remove(pos)))
    }

    async fn clear(&self) -> Result<usize, StoreError> {
        let mut items = self.items.write().await;
        let count = items.len();
        items.clear();
        Ok(count)
    }
}
