// src/store/mod.rs
//! Coleções de entidades. Cada coleção é a única autoridade para as entidades
//! naquele estado; um registo nunca está em duas coleções ao mesmo tempo.

pub mod json_file;
pub mod memory;

use crate::models::{
    pdf::Pdf,
    quiz::Quiz,
    user::{PendingRegistration, User},
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::{path::Path, path::PathBuf, sync::Arc};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};

pub use json_file::JsonFileRepository;
pub use memory::MemoryRepository;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("falha de E/S em {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON inválido em {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("id duplicado '{0}' na coleção")]
    DuplicateId(String),

    #[error("{0}")]
    Unavailable(String),
}

pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
}

#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Nome curto da coleção, usado nos logs.
    fn name(&self) -> &str;
    async fn list(&self) -> Result<Vec<T>, StoreError>;
    async fn find(&self, id: &str) -> Result<Option<T>, StoreError>;
    /// Acrescenta no fim. Falha com `DuplicateId` se o id já existir.
    async fn insert(&self, item: T) -> Result<T, StoreError>;
    /// Substitui o registo com o mesmo id; devolve `false` se não existir.
    async fn replace(&self, item: T) -> Result<bool, StoreError>;
    async fn remove(&self, id: &str) -> Result<Option<T>, StoreError>;
    /// Esvazia a coleção, devolvendo quantos registos foram apagados.
    async fn clear(&self) -> Result<usize, StoreError>;
}

/// Move um registo de `from` para `to`, aplicando `stamp` pelo caminho.
///
/// Insere primeiro no destino e só depois remove da origem. Se a remoção falhar,
/// a inserção é desfeita; se até isso falhar, o registo fica nas duas coleções e
/// o erro é registado para reconciliação manual.
pub async fn transfer<T, F>(
    from: &dyn Repository<T>,
    to: &dyn Repository<T>,
    id: &str,
    stamp: F,
) -> Result<Option<T>, StoreError>
where
    T: Entity,
    F: FnOnce(T) -> T + Send,
{
    let Some(item) = from.find(id).await? else {
        return Ok(None);
    };

    let moved = to.insert(stamp(item)).await.map_err(|e| {
        tracing::error!("Falha ao gravar '{}' em {} (origem {} intacta): {}", id, to.name(), from.name(), e);
        e
    })?;

    if let Err(e) = from.remove(id).await {
        tracing::error!("Falha ao remover '{}' de {} após gravar em {}: {}", id, from.name(), to.name(), e);
        if let Err(rollback) = to.remove(id).await {
            tracing::error!(
                "RECONCILIAR: '{}' está em {} e {} (desfazer falhou: {})",
                id,
                from.name(),
                to.name(),
                rollback
            );
        }
        return Err(e);
    }

    Ok(Some(moved))
}

pub const USERS_FILE: &str = "usuarios.json";
pub const PENDING_FILE: &str = "cadastros_pendentes.json";
pub const QUIZZES_FILE: &str = "quizzes.json";
pub const ARCHIVED_QUIZZES_FILE: &str = "quizzes_arquivados.json";
pub const DELETED_QUIZZES_FILE: &str = "quizzes_excluidos.json";
pub const PDFS_FILE: &str = "pdfs.json";
pub const DELETED_PDFS_FILE: &str = "pdfs_excluidos.json";

/// Todas as coleções da aplicação, mais o trinco que serializa as transições.
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn Repository<User>>,
    pub pending: Arc<dyn Repository<PendingRegistration>>,
    pub quizzes: Arc<dyn Repository<Quiz>>,
    pub archived_quizzes: Arc<dyn Repository<Quiz>>,
    pub deleted_quizzes: Arc<dyn Repository<Quiz>>,
    pub pdfs: Arc<dyn Repository<Pdf>>,
    pub deleted_pdfs: Arc<dyn Repository<Pdf>>,
    writer: Arc<Mutex<()>>,
}

impl Store {
    /// Coleções em ficheiros JSON dentro de `dir`. Os ficheiros em falta são criados como `[]`.
    pub async fn open(dir: &Path) -> Self {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            tracing::error!("Não foi possível criar o diretório de dados {}: {}", dir.display(), e);
        }

        let store = Self {
            users: Arc::new(JsonFileRepository::<User>::new(dir.join(USERS_FILE))),
            pending: Arc::new(JsonFileRepository::<PendingRegistration>::new(dir.join(PENDING_FILE))),
            quizzes: Arc::new(JsonFileRepository::<Quiz>::new(dir.join(QUIZZES_FILE))),
            archived_quizzes: Arc::new(JsonFileRepository::<Quiz>::new(dir.join(ARCHIVED_QUIZZES_FILE))),
            deleted_quizzes: Arc::new(JsonFileRepository::<Quiz>::new(dir.join(DELETED_QUIZZES_FILE))),
            pdfs: Arc::new(JsonFileRepository::<Pdf>::new(dir.join(PDFS_FILE))),
            deleted_pdfs: Arc::new(JsonFileRepository::<Pdf>::new(dir.join(DELETED_PDFS_FILE))),
            writer: Arc::new(Mutex::new(())),
        };

        for file in [
            USERS_FILE,
            PENDING_FILE,
            QUIZZES_FILE,
            ARCHIVED_QUIZZES_FILE,
            DELETED_QUIZZES_FILE,
            PDFS_FILE,
            DELETED_PDFS_FILE,
        ] {
            json_file::ensure_file(&dir.join(file)).await;
        }

        store
    }

    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryRepository::<User>::new("usuarios")),
            pending: Arc::new(MemoryRepository::<PendingRegistration>::new("cadastros_pendentes")),
            quizzes: Arc::new(MemoryRepository::<Quiz>::new("quizzes")),
            archived_quizzes: Arc::new(MemoryRepository::<Quiz>::new("quizzes_arquivados")),
            deleted_quizzes: Arc::new(MemoryRepository::<Quiz>::new("quizzes_excluidos")),
            pdfs: Arc::new(MemoryRepository::<Pdf>::new("pdfs")),
            deleted_pdfs: Arc::new(MemoryRepository::<Pdf>::new("pdfs_excluidos")),
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Escritor único: qualquer operação que leia, verifique e grave segura este trinco.
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().await
    }
}
