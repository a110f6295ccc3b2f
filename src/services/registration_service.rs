// src/services/registration_service.rs
//! Ciclo de vida do cadastro: pendente → aprovado | rejeitado.

use crate::{
    error::{AppError, AppResult},
    models::user::{NewRegistration, PendingRegistration, Principal, RegistrationStatus, Role, User},
    policy::{self, STAFF},
    services::{auth_service, user_service},
    store::Store,
};
use chrono::Utc;
use uuid::Uuid;

/// Submete um cadastro. Falha com `Conflict` se o usuário ou email já existir
/// em utilizadores ou cadastros pendentes.
pub async fn submit(store: &Store, data: NewRegistration, bcrypt_cost: u32) -> AppResult<PendingRegistration> {
    tracing::info!("Novo cadastro recebido para: {}", data.username);

    // Hash fora do trinco; a unicidade é verificada já com o trinco
    let password_hash = auth_service::hash_password(&data.password, bcrypt_cost).await?;

    let _guard = store.lock().await;
    user_service::ensure_unique(store, &data.username, &data.email, None).await?;

    let pending = PendingRegistration {
        id: Uuid::new_v4().to_string(),
        username: data.username,
        password_hash,
        name: data.name,
        surname: data.surname,
        email: data.email,
        phone: data.phone,
        photo_base64: data.photo_base64,
        role: Role::Aluno,
        status: RegistrationStatus::Pendente,
        created_at: Utc::now(),
    };

    let pending = store.pending.insert(pending).await?;
    tracing::info!("📝 Cadastro '{}' ({}) pendente de aprovação", pending.username, pending.id);
    Ok(pending)
}

pub async fn list_pending(store: &Store) -> AppResult<Vec<PendingRegistration>> {
    Ok(store.pending.list().await?)
}

/// Aprova um cadastro pendente, criando o utilizador correspondente.
///
/// O utilizador é gravado primeiro; o cadastro só é removido depois. Se a remoção
/// falhar, o utilizador acabado de criar é apagado e o erro devolvido, deixando o
/// cadastro pendente para nova tentativa.
pub async fn approve(store: &Store, id: &str, actor: &Principal) -> AppResult<User> {
    policy::authorize(actor, STAFF)?;

    let _guard = store.lock().await;
    let pending = store
        .pending
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cadastro não encontrado".into()))?;

    // O mesmo usuário pode ter sido criado por outro caminho entretanto
    let users = store.users.list().await?;
    if users
        .iter()
        .any(|u| u.username == pending.username || u.email.eq_ignore_ascii_case(&pending.email))
    {
        tracing::warn!("Aprovação de '{}' recusada: já existe utilizador com o mesmo usuário/email", pending.username);
        return Err(AppError::Conflict("Usuário ou email já cadastrado".into()));
    }

    let user = pending.into_user(&actor.id, Utc::now());
    let user = store.users.insert(user).await?;

    if let Err(e) = store.pending.remove(id).await {
        tracing::error!("Falha ao remover cadastro '{}' após criar utilizador: {}", id, e);
        if let Err(rollback) = store.users.remove(&user.id).await {
            tracing::error!(
                "RECONCILIAR: '{}' está em {} e {} (desfazer falhou: {})",
                user.username,
                store.users.name(),
                store.pending.name(),
                rollback
            );
        }
        return Err(e.into());
    }

    tracing::info!("✅ Cadastro '{}' aprovado por {}", user.username, actor.username);
    Ok(user)
}

/// Rejeita um cadastro: é apagado sem deixar registo além da linha de auditoria.
pub async fn reject(store: &Store, id: &str, actor: &Principal, reason: Option<&str>) -> AppResult<()> {
    policy::authorize(actor, STAFF)?;

    let _guard = store.lock().await;
    let removed = store
        .pending
        .remove(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cadastro não encontrado".into()))?;

    tracing::info!(
        actor = %actor.username,
        cadastro = %removed.username,
        motivo = reason.unwrap_or("-"),
        "🗑️ Cadastro rejeitado"
    );
    Ok(())
}
