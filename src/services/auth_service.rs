// src/services/auth_service.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{RegistrationStatus, User},
    store::Store,
};
use chrono::Utc;

/// Verifica se a senha fornecida corresponde ao hash guardado.
pub async fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Verificando hash bcrypt...");
        bcrypt::verify(&password, &stored_hash)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (verify_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("Erro bcrypt ao verificar senha: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Gera um hash bcrypt para uma senha.
pub async fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Gerando hash bcrypt (custo {})...", cost);
        bcrypt::hash(&password, cost)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (hash_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("Erro bcrypt ao gerar hash: {:?}", e);
        AppError::PasswordHashingError
    })
}

fn is_bcrypt_hash(stored: &str) -> bool {
    stored.starts_with("$2a$") || stored.starts_with("$2b$") || stored.starts_with("$2y$")
}

/// Compara a senha com o valor guardado. Ficheiros antigos guardavam a senha em texto
/// simples; nesse caso devolve também o novo hash a gravar.
pub async fn check_stored_password(
    password: &str,
    stored: &str,
    cost: u32,
) -> AppResult<(bool, Option<String>)> {
    if is_bcrypt_hash(stored) {
        return Ok((verify_password(password, stored).await?, None));
    }
    if password == stored {
        Ok((true, Some(hash_password(password, cost).await?)))
    } else {
        Ok((false, None))
    }
}

/// Autentica um utilizador ativo e aprovado, atualizando `ultimoLogin`.
///
/// O bcrypt corre sem o trinco do store; o trinco só cobre a releitura e a gravação.
pub async fn login(store: &Store, username: &str, password: &str, cost: u32) -> AppResult<User> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AppError::Validation("Usuário e senha são obrigatórios".into()));
    }

    // Mensagem genérica: não revela se o utilizador existe
    let invalid = || AppError::Unauthorized("Usuário ou senha inválidos".into());

    let found = store
        .users
        .list()
        .await?
        .into_iter()
        .find(|u| u.username == username);
    let Some(candidate) = found else {
        tracing::warn!("Utilizador não encontrado: {}", username);
        return Err(invalid());
    };

    let (valid, upgraded_hash) = check_stored_password(password, &candidate.password_hash, cost).await?;
    if !valid {
        tracing::warn!("Senha incorreta para: {}", username);
        return Err(invalid());
    }

    let _guard = store.lock().await;
    // Releitura: o registo pode ter mudado (ou sumido) durante a verificação
    let mut user = store
        .users
        .find(&candidate.id)
        .await?
        .filter(|u| u.username == candidate.username && u.password_hash == candidate.password_hash)
        .ok_or_else(invalid)?;

    if !user.active || user.status != RegistrationStatus::Aprovado {
        tracing::warn!("Login recusado para '{}': conta inativa", username);
        return Err(AppError::Unauthorized("Conta inativa. Contacte um administrador.".into()));
    }

    if let Some(hash) = upgraded_hash {
        tracing::info!("🔐 Senha em texto simples de '{}' convertida para bcrypt", username);
        user.password_hash = hash;
    }
    user.last_login = Some(Utc::now());
    store.users.replace(user.clone()).await?;

    tracing::info!("✅ Login bem-sucedido para: {}", user.username);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use std::time::Duration;

    const COST: u32 = 4;

    fn user(username: &str, password_hash: &str, active: bool) -> User {
        let raw = serde_json::json!({
            "id": format!("id-{}", username),
            "usuario": username,
            "senha": password_hash,
            "nome": "Teste",
            "email": format!("{}@x.com", username),
            "tipo": "administrador",
            "ativo": active,
        });
        serde_json::from_value(raw).unwrap()
    }

    #[tokio::test]
    async fn hash_then_verify() {
        let hash = hash_password("abcdef", COST).await.unwrap();
        assert!(verify_password("abcdef", &hash).await.unwrap());
        assert!(!verify_password("errada", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn login_upgrades_legacy_plaintext_password() {
        let store = Store::in_memory();
        store.users.insert(user("admin", "admin123", true)).await.unwrap();

        let logged = login(&store, "admin", "admin123", COST).await.unwrap();
        assert_eq!(logged.role, Role::Administrador);

        let stored = store.users.find("id-admin").await.unwrap().unwrap();
        assert!(stored.password_hash.starts_with("$2"));
        assert!(stored.last_login.is_some());

        // Continua a funcionar com o hash novo
        assert!(login(&store, "admin", "admin123", COST).await.is_ok());
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_inactive_accounts() {
        let store = Store::in_memory();
        let hash = hash_password("abcdef", COST).await.unwrap();
        store.users.insert(user("ana", &hash, true)).await.unwrap();
        store.users.insert(user("bia", &hash, false)).await.unwrap();

        assert!(matches!(
            login(&store, "ana", "zzzzzz", COST).await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            login(&store, "bia", "abcdef", COST).await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            login(&store, "ninguem", "abcdef", COST).await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(login(&store, "", "", COST).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn password_check_does_not_wait_for_store_lock() {
        let store = Store::in_memory();
        let hash = hash_password("abcdef", COST).await.unwrap();
        store.users.insert(user("ana", &hash, true)).await.unwrap();

        // Com o trinco ocupado, uma senha errada é recusada sem esperar por ele
        let guard = store.lock().await;
        let refused = tokio::time::timeout(Duration::from_secs(5), login(&store, "ana", "zzzzzz", COST))
            .await
            .expect("login ficou à espera do trinco");
        assert!(matches!(refused, Err(AppError::Unauthorized(_))));

        // Uma senha certa só espera pela gravação de `ultimoLogin`
        let pending = tokio::spawn({
            let store = store.clone();
            async move { login(&store, "ana", "abcdef", COST).await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!pending.is_finished());
        drop(guard);
        assert!(pending.await.unwrap().is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_logins_all_succeed() {
        let store = Store::in_memory();
        let hash = hash_password("abcdef", COST).await.unwrap();
        for name in ["ana", "bia", "caio", "duda"] {
            store.users.insert(user(name, &hash, true)).await.unwrap();
        }

        let tasks: Vec<_> = ["ana", "bia", "caio", "duda"]
            .into_iter()
            .map(|name| {
                let store = store.clone();
                tokio::spawn(async move { login(&store, name, "abcdef", COST).await })
            })
            .collect();
        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }
        let users = store.users.list().await.unwrap();
        assert!(users.iter().all(|u| u.last_login.is_some()));
    }
}
