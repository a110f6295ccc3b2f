// src/services/quiz_service.rs
//! Ciclo de vida dos quizzes: ativo ⇄ arquivado, {ativo, arquivado} → excluído,
//! excluído → ativo (restaurar) e limpeza definitiva da lixeira.

use crate::{
    error::{AppError, AppResult},
    models::{
        quiz::{Quiz, QuizRequest},
        user::Principal,
    },
    policy::{self, ADMIN_ONLY, STAFF},
    store::{self, Store},
};
use chrono::Utc;
use uuid::Uuid;

fn not_found() -> AppError {
    AppError::NotFound("Quiz não encontrado".into())
}

pub async fn list_active(store: &Store) -> AppResult<Vec<Quiz>> {
    Ok(store.quizzes.list().await?)
}

pub async fn list_archived(store: &Store) -> AppResult<Vec<Quiz>> {
    Ok(store.archived_quizzes.list().await?)
}

pub async fn list_deleted(store: &Store) -> AppResult<Vec<Quiz>> {
    Ok(store.deleted_quizzes.list().await?)
}

pub async fn find_active(store: &Store, id: &str) -> AppResult<Quiz> {
    store.quizzes.find(id).await?.ok_or_else(not_found)
}

pub async fn create(store: &Store, request: QuizRequest, actor: &Principal) -> AppResult<Quiz> {
    policy::authorize(actor, STAFF)?;
    let (name, questions) = request.validate()?;

    let quiz = Quiz {
        id: Uuid::new_v4().to_string(),
        name,
        questions,
        created_by: actor.username.clone(),
        created_at: Utc::now(),
        modified_at: None,
        archived_at: None,
        deleted_at: None,
        deleted_by: None,
    };

    let _guard = store.lock().await;
    let quiz = store.quizzes.insert(quiz).await?;
    tracing::info!("📚 Quiz '{}' ({}) criado por {}", quiz.name, quiz.id, actor.username);
    Ok(quiz)
}

/// Edita nome e perguntas de um quiz ativo, carimbando `modificadoEm`.
pub async fn update(store: &Store, id: &str, request: QuizRequest, actor: &Principal) -> AppResult<Quiz> {
    policy::authorize(actor, STAFF)?;
    let (name, questions) = request.validate()?;

    let _guard = store.lock().await;
    let mut quiz = store.quizzes.find(id).await?.ok_or_else(not_found)?;
    quiz.name = name;
    quiz.questions = questions;
    quiz.modified_at = Some(Utc::now());

    if !store.quizzes.replace(quiz.clone()).await? {
        return Err(not_found());
    }
    tracing::info!("Quiz '{}' editado por {}", quiz.id, actor.username);
    Ok(quiz)
}

/// ativo → arquivado. Só procura nos ativos.
pub async fn archive(store: &Store, id: &str, actor: &Principal) -> AppResult<Quiz> {
    policy::authorize(actor, STAFF)?;

    let _guard = store.lock().await;
    let quiz = store::transfer(store.quizzes.as_ref(), store.archived_quizzes.as_ref(), id, |mut q| {
        q.archived_at = Some(Utc::now());
        q
    })
    .await?
    .ok_or_else(not_found)?;

    tracing::info!("🗄️ Quiz '{}' arquivado por {}", id, actor.username);
    Ok(quiz)
}

/// arquivado → ativo, limpando o carimbo de arquivo.
pub async fn unarchive(store: &Store, id: &str, actor: &Principal) -> AppResult<Quiz> {
    policy::authorize(actor, STAFF)?;

    let _guard = store.lock().await;
    let quiz = store::transfer(store.archived_quizzes.as_ref(), store.quizzes.as_ref(), id, |mut q| {
        q.archived_at = None;
        q
    })
    .await?
    .ok_or_else(not_found)?;

    tracing::info!("Quiz '{}' desarquivado por {}", id, actor.username);
    Ok(quiz)
}

/// {ativo, arquivado} → excluído. Procura primeiro nos ativos e depois nos arquivados,
/// removendo da coleção onde o quiz foi de facto encontrado.
pub async fn delete(store: &Store, id: &str, actor: &Principal) -> AppResult<Quiz> {
    policy::authorize(actor, ADMIN_ONLY)?;

    let _guard = store.lock().await;
    let source = if store.quizzes.find(id).await?.is_some() {
        store.quizzes.as_ref()
    } else if store.archived_quizzes.find(id).await?.is_some() {
        store.archived_quizzes.as_ref()
    } else {
        return Err(not_found());
    };

    let deleted_by = actor.username.clone();
    let quiz = store::transfer(source, store.deleted_quizzes.as_ref(), id, move |mut q| {
        q.deleted_at = Some(Utc::now());
        q.deleted_by = Some(deleted_by);
        q
    })
    .await?
    .ok_or_else(not_found)?;

    tracing::info!("🗑️ Quiz '{}' movido de {} para a lixeira por {}", id, source.name(), actor.username);
    Ok(quiz)
}

/// excluído → ativo, limpando os carimbos de exclusão e de arquivo.
pub async fn restore(store: &Store, id: &str, actor: &Principal) -> AppResult<Quiz> {
    policy::authorize(actor, ADMIN_ONLY)?;

    let _guard = store.lock().await;
    let quiz = store::transfer(store.deleted_quizzes.as_ref(), store.quizzes.as_ref(), id, |mut q| {
        q.deleted_at = None;
        q.deleted_by = None;
        q.archived_at = None;
        q
    })
    .await?
    .ok_or_else(not_found)?;

    tracing::info!("♻️ Quiz '{}' restaurado por {}", id, actor.username);
    Ok(quiz)
}

/// Apaga definitivamente um quiz que está na lixeira.
pub async fn purge(store: &Store, id: &str, actor: &Principal) -> AppResult<Quiz> {
    policy::authorize(actor, ADMIN_ONLY)?;

    let _guard = store.lock().await;
    let quiz = store.deleted_quizzes.remove(id).await?.ok_or_else(not_found)?;
    tracing::info!("Quiz '{}' excluído definitivamente por {}", id, actor.username);
    Ok(quiz)
}

/// Esvazia a lixeira. Irreversível.
pub async fn purge_all(store: &Store, actor: &Principal) -> AppResult<usize> {
    policy::authorize(actor, ADMIN_ONLY)?;

    let _guard = store.lock().await;
    let count = store.deleted_quizzes.clear().await?;
    tracing::info!("🧹 Lixeira esvaziada por {} ({} quizzes)", actor.username, count);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{quiz::Question, user::Role};

    fn admin() -> Principal {
        Principal { id: "a".into(), username: "admin".into(), role: Role::Administrador }
    }

    fn moderador() -> Principal {
        Principal { id: "m".into(), username: "mod".into(), role: Role::Moderador }
    }

    fn request(nome: &str) -> QuizRequest {
        QuizRequest {
            nome: nome.into(),
            perguntas: vec![Question {
                text: "Capital de Portugal?".into(),
                options: vec!["Porto".into(), "Lisboa".into()],
                correct: 1,
            }],
        }
    }

    async fn counts(store: &Store) -> (usize, usize, usize) {
        (
            list_active(store).await.unwrap().len(),
            list_archived(store).await.unwrap().len(),
            list_deleted(store).await.unwrap().len(),
        )
    }

    #[tokio::test]
    async fn create_archive_delete_from_archived() {
        let store = Store::in_memory();
        let quiz = create(&store, request("Q1"), &moderador()).await.unwrap();
        assert!(!quiz.id.is_empty());
        assert_eq!(quiz.created_by, "mod");
        assert_eq!(counts(&store).await, (1, 0, 0));

        let archived = archive(&store, &quiz.id, &moderador()).await.unwrap();
        assert!(archived.archived_at.is_some());
        assert_eq!(counts(&store).await, (0, 1, 0));

        let deleted = delete(&store, &quiz.id, &admin()).await.unwrap();
        assert!(deleted.deleted_at.is_some());
        assert_eq!(deleted.deleted_by.as_deref(), Some("admin"));
        assert_eq!(counts(&store).await, (0, 0, 1));
    }

    #[tokio::test]
    async fn delete_from_archived_does_not_touch_active() {
        let store = Store::in_memory();
        let keep = create(&store, request("Fica"), &admin()).await.unwrap();
        let gone = create(&store, request("Vai"), &admin()).await.unwrap();
        archive(&store, &gone.id, &admin()).await.unwrap();

        delete(&store, &gone.id, &admin()).await.unwrap();

        let active = list_active(&store).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, keep.id);
        assert!(list_archived(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn archive_then_unarchive_restores_original() {
        let store = Store::in_memory();
        let original = create(&store, request("Q1"), &admin()).await.unwrap();

        archive(&store, &original.id, &admin()).await.unwrap();
        let back = unarchive(&store, &original.id, &admin()).await.unwrap();

        assert_eq!(back, original);
        assert_eq!(list_active(&store).await.unwrap(), vec![original]);
    }

    #[tokio::test]
    async fn archive_only_searches_active() {
        let store = Store::in_memory();
        let quiz = create(&store, request("Q1"), &admin()).await.unwrap();
        archive(&store, &quiz.id, &admin()).await.unwrap();

        assert!(matches!(archive(&store, &quiz.id, &admin()).await, Err(AppError::NotFound(_))));
        assert!(matches!(unarchive(&store, "nada", &admin()).await, Err(AppError::NotFound(_))));
        assert!(matches!(delete(&store, "nada", &admin()).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn restore_purge_and_purge_all() {
        let store = Store::in_memory();
        let a = create(&store, request("A"), &admin()).await.unwrap();
        let b = create(&store, request("B"), &admin()).await.unwrap();
        let c = create(&store, request("C"), &admin()).await.unwrap();
        for id in [&a.id, &b.id, &c.id] {
            delete(&store, id, &admin()).await.unwrap();
        }

        let restored = restore(&store, &a.id, &admin()).await.unwrap();
        assert!(restored.deleted_at.is_none());
        assert!(restored.deleted_by.is_none());
        assert_eq!(counts(&store).await, (1, 0, 2));

        purge(&store, &b.id, &admin()).await.unwrap();
        assert!(matches!(purge(&store, &b.id, &admin()).await, Err(AppError::NotFound(_))));

        assert_eq!(purge_all(&store, &admin()).await.unwrap(), 1);
        assert_eq!(counts(&store).await, (1, 0, 0));
    }

    #[tokio::test]
    async fn moderators_cannot_delete_and_update_stamps_modification() {
        let store = Store::in_memory();
        let quiz = create(&store, request("Q1"), &admin()).await.unwrap();

        assert!(matches!(delete(&store, &quiz.id, &moderador()).await, Err(AppError::Forbidden(_))));
        assert!(matches!(purge_all(&store, &moderador()).await, Err(AppError::Forbidden(_))));

        let edited = update(&store, &quiz.id, request("Q1 revisto"), &moderador()).await.unwrap();
        assert_eq!(edited.name, "Q1 revisto");
        assert!(edited.modified_at.is_some());
    }
}
