// src/store/json_file.rs
use super::{Entity, Repository, StoreError};
use async_trait::async_trait;
use std::{
    io::ErrorKind,
    marker::PhantomData,
    path::{Path, PathBuf},
};
use tokio::sync::Mutex;

/// Coleção guardada como um array JSON (formatado) num único ficheiro.
pub struct JsonFileRepository<T> {
    path: PathBuf,
    name: String,
    // Serializa o ciclo ler-alterar-gravar deste ficheiro
    lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> JsonFileRepository<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name, lock: Mutex::new(()), _marker: PhantomData }
    }

    async fn read_all(&self) -> Result<Vec<T>, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            // Ficheiro ainda não criado = coleção vazia
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path: self.path.clone(), source }),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|source| StoreError::Json { path: self.path.clone(), source })
    }

    async fn write_all(&self, items: &[T]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(items)
            .map_err(|source| StoreError::Json { path: self.path.clone(), source })?;

        // Grava num temporário e renomeia, para nunca deixar o ficheiro a meio
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|source| StoreError::Io { path: tmp.clone(), source })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| StoreError::Io { path: self.path.clone(), source })?;

        tracing::debug!("{} gravado ({} registos)", self.name, items.len());
        Ok(())
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for JsonFileRepository<T> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list(&self) -> Result<Vec<T>, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_all().await
    }

    async fn find(&self, id: &str) -> Result<Option<T>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.into_iter().find(|item| item.id() == id))
    }

    async fn insert(&self, item: T) -> Result<T, StoreError> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_all().await?;
        if items.iter().any(|existing| existing.id() == item.id()) {
            return Err(StoreError::DuplicateId(item.id().to_string()));
        }
        items.push(item.clone());
        self.write_all(&items).await?;
        Ok(item)
    }

    async fn replace(&self, item: T) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_all().await?;
        match items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(slot) => {
                *slot = item;
                self.write_all(&items).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: &str) -> Result<Option<T>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_all().await?;
        let Some(pos) = items.iter().position(|item| item.id() == id) else {
            return Ok(None);
        };
        let removed = items.remove(pos);
        self.write_all(&items).await?;
        Ok(Some(removed))
    }

    async fn clear(&self) -> Result<usize, StoreError> {
        let _guard = self.lock.lock().await;
        let count = self.read_all().await?.len();
        self.write_all(&[]).await?;
        Ok(count)
    }
}

/// Cria o ficheiro com `[]` se não existir. Falhas são registadas e não impedem o arranque.
pub async fn ensure_file(path: &Path) {
    match tokio::fs::try_exists(path).await {
        Ok(true) => {}
        Ok(false) => match tokio::fs::write(path, "[]").await {
            Ok(()) => tracing::info!("📄 Ficheiro {} criado", path.display()),
            Err(e) => tracing::error!("Não foi possível criar {}: {}", path.display(), e),
        },
        Err(e) => tracing::error!("Não foi possível verificar {}: {}", path.display(), e),
    }
}
