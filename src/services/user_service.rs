// src/services/user_service.rs
use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::user::{
        validate_email, Principal, RegistrationStatus, Role, UpdateUserRequest, User, MIN_PASSWORD_LEN,
    },
    policy::{self, STAFF},
    services::auth_service,
    store::Store,
};
use chrono::Utc;
use uuid::Uuid;

/// Garante que usuário e email são únicos entre utilizadores e cadastros pendentes.
/// `ignore_id` exclui o próprio registo numa edição. Deve ser chamado com o trinco do store.
pub async fn ensure_unique(
    store: &Store,
    username: &str,
    email: &str,
    ignore_id: Option<&str>,
) -> AppResult<()> {
    let clashes = |id: &str, u: &str, e: &str| {
        Some(id) != ignore_id && (u == username || e.eq_ignore_ascii_case(email))
    };

    let in_users = store
        .users
        .list()
        .await?
        .iter()
        .any(|u| clashes(&u.id, &u.username, &u.email));
    let in_pending = store
        .pending
        .list()
        .await?
        .iter()
        .any(|p| clashes(&p.id, &p.username, &p.email));

    if in_users || in_pending {
        tracing::warn!("Usuário '{}' ou email '{}' já cadastrado", username, email);
        return Err(AppError::Conflict("Usuário ou email já cadastrado".into()));
    }
    Ok(())
}

/// Busca um utilizador pelo seu ID.
pub async fn find_user_by_id(store: &Store, user_id: &str) -> AppResult<Option<User>> {
    tracing::debug!("Buscando utilizador por ID: {}", user_id);
    Ok(store.users.find(user_id).await?)
}

pub async fn find_all_users(store: &Store) -> AppResult<Vec<User>> {
    let users = store.users.list().await?;
    tracing::debug!("Encontrados {} utilizadores.", users.len());
    Ok(users)
}

// Moderadores não mexem em administradores nem promovem ninguém a administrador
fn check_hierarchy(actor: &Principal, target: &User, new_role: Option<Role>) -> AppResult<()> {
    if actor.role == Role::Administrador {
        return Ok(());
    }
    if target.role == Role::Administrador || new_role == Some(Role::Administrador) {
        return Err(AppError::Forbidden("Apenas administradores podem gerir administradores".into()));
    }
    Ok(())
}

/// Atualiza os dados de um utilizador. Exige a senha de quem edita como confirmação.
pub async fn update_user(
    store: &Store,
    user_id: &str,
    changes: UpdateUserRequest,
    actor: &Principal,
    bcrypt_cost: u32,
) -> AppResult<User> {
    policy::authorize(actor, STAFF)?;
    tracing::info!("Atualizando dados para user: {}", user_id);

    if changes.senha_confirmacao.is_empty() {
        return Err(AppError::Validation("Digite sua senha para confirmar as alterações".into()));
    }

    // bcrypt fora do trinco: verifica a senha de quem edita e prepara o hash novo
    let actor_record = store
        .users
        .find(&actor.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Sessão inválida".into()))?;
    if !auth_service::verify_password(&changes.senha_confirmacao, &actor_record.password_hash).await? {
        return Err(AppError::Unauthorized("Senha de confirmação incorreta".into()));
    }
    let new_hash = match changes.nova_senha.as_deref().filter(|p| !p.is_empty()) {
        Some(password) if password.chars().count() < MIN_PASSWORD_LEN => {
            return Err(AppError::Validation(format!(
                "A senha deve ter pelo menos {} caracteres",
                MIN_PASSWORD_LEN
            )));
        }
        Some(password) => Some(auth_service::hash_password(password, bcrypt_cost).await?),
        None => None,
    };

    let _guard = store.lock().await;

    // A senha de quem edita pode ter mudado enquanto o bcrypt corria
    let still_valid = store
        .users
        .find(&actor.id)
        .await?
        .is_some_and(|current| current.password_hash == actor_record.password_hash);
    if !still_valid {
        return Err(AppError::Unauthorized("Sessão inválida".into()));
    }

    let mut user = store
        .users
        .find(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuário não encontrado".into()))?;
    check_hierarchy(actor, &user, changes.tipo)?;

    if let Some(name) = changes.nome.map(|n| n.trim().to_string()) {
        if name.is_empty() {
            return Err(AppError::Validation("O nome não pode ficar vazio".into()));
        }
        user.name = name;
    }
    if let Some(surname) = changes.sobrenome {
        user.surname = surname.trim().to_string();
    }
    if let Some(phone) = changes.telefone {
        user.phone = phone.trim().to_string();
    }
    if let Some(username) = changes.usuario.map(|u| u.trim().to_string()) {
        if username.is_empty() || username.chars().any(char::is_whitespace) {
            return Err(AppError::Validation("Usuário inválido".into()));
        }
        user.username = username;
    }
    if let Some(email) = changes.email.map(|e| e.trim().to_lowercase()) {
        validate_email(&email)?;
        user.email = email;
    }
    if let Some(role) = changes.tipo {
        if user.id == actor.id && role != user.role {
            return Err(AppError::Validation("Não pode alterar o seu próprio papel".into()));
        }
        user.role = role;
    }
    if let Some(hash) = new_hash {
        user.password_hash = hash;
    }

    ensure_unique(store, &user.username, &user.email, Some(&user.id)).await?;

    if !store.users.replace(user.clone()).await? {
        return Err(AppError::NotFound("Usuário não encontrado".into()));
    }
    tracing::info!("✅ Dados atualizados com sucesso para user: {} (por {})", user.username, actor.username);
    Ok(user)
}

/// Ativa ou desativa um utilizador.
pub async fn set_active(store: &Store, user_id: &str, active: bool, actor: &Principal) -> AppResult<User> {
    policy::authorize(actor, STAFF)?;
    if user_id == actor.id && !active {
        return Err(AppError::Validation("Não pode desativar a sua própria conta".into()));
    }

    let _guard = store.lock().await;
    let mut user = store
        .users
        .find(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuário não encontrado".into()))?;
    check_hierarchy(actor, &user, None)?;

    user.active = active;
    store.users.replace(user.clone()).await?;
    tracing::info!(
        "Utilizador '{}' {} por {}",
        user.username,
        if active { "ativado" } else { "desativado" },
        actor.username
    );
    Ok(user)
}

pub async fn delete_user(store: &Store, user_id: &str, actor: &Principal) -> AppResult<User> {
    policy::authorize(actor, STAFF)?;
    if user_id == actor.id {
        return Err(AppError::Validation("Não pode excluir a sua própria conta".into()));
    }

    let _guard = store.lock().await;
    let user = store
        .users
        .find(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuário não encontrado".into()))?;
    check_hierarchy(actor, &user, None)?;

    store.users.remove(user_id).await?;
    tracing::info!("🗑️ Utilizador '{}' excluído por {}", user.username, actor.username);
    Ok(user)
}

/// Cria o administrador inicial quando `ADMIN_PASSWORD` está definida e ainda não há nenhum.
pub async fn ensure_bootstrap_admin(store: &Store, config: &Config) -> AppResult<Option<User>> {
    let Some(password) = config.admin_password.as_deref() else {
        return Ok(None);
    };

    let _guard = store.lock().await;
    let users = store.users.list().await?;
    if users.iter().any(|u| u.role == Role::Administrador) {
        tracing::debug!("Já existe administrador; bootstrap ignorado.");
        return Ok(None);
    }
    if users.iter().any(|u| u.username == config.admin_username) {
        tracing::warn!(
            "⚠️ Usuário '{}' já existe sem papel de administrador; bootstrap ignorado.",
            config.admin_username
        );
        return Ok(None);
    }

    let now = Utc::now();
    let admin = User {
        id: Uuid::new_v4().to_string(),
        username: config.admin_username.clone(),
        password_hash: auth_service::hash_password(password, config.bcrypt_cost).await?,
        name: "Administrador".into(),
        surname: String::new(),
        email: format!("{}@brainquiz.local", config.admin_username),
        phone: String::new(),
        photo_base64: None,
        role: Role::Administrador,
        status: RegistrationStatus::Aprovado,
        active: true,
        created_at: now,
        last_login: None,
        approved_at: Some(now),
        approved_by: None,
    };
    let admin = store.users.insert(admin).await?;
    tracing::info!("👑 Administrador inicial '{}' criado.", admin.username);
    Ok(Some(admin))
}
