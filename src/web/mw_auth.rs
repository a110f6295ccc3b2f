// src/web/mw_auth.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{Principal, RegistrationStatus},
    policy::{self, ANY_AUTHENTICATED},
    state::AppState,
    store::Store,
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;

/// Chave da sessão onde fica o id do utilizador autenticado.
pub const SESSION_USER_KEY: &str = "user_id";

// Middleware que verifica se o utilizador está logado e anexa o Principal ao pedido
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = session
        .get::<String>(SESSION_USER_KEY)
        .await
        .map_err(|e| AppError::SessionError(format!("Erro ao verificar sessão: {}", e)))?;

    let Some(user_id) = user_id else {
        tracing::debug!("Autenticação MW: Não autenticado (sem user_id).");
        return Err(AppError::Unauthorized("Sessão não encontrada. Faça login.".into()));
    };

    match resolve_principal(&state.store, &user_id).await? {
        Some(principal) => {
            policy::authorize(&principal, ANY_AUTHENTICATED)?;
            tracing::debug!("Autenticação MW: '{}' ({}) autenticado.", principal.username, principal.role);
            request.extensions_mut().insert(principal);
            Ok(next.run(request).await)
        }
        None => {
            // O utilizador foi removido ou desativado depois do login
            tracing::warn!("Autenticação MW: sessão de '{}' já não corresponde a um utilizador ativo.", user_id);
            if let Err(e) = session.flush().await {
                tracing::error!("Falha ao limpar sessão inválida: {:?}", e);
            }
            Err(AppError::Unauthorized("Usuário não encontrado ou inativo".into()))
        }
    }
}

/// Resolve o utilizador da sessão, apenas se ainda estiver ativo e aprovado.
pub async fn resolve_principal(store: &Store, user_id: &str) -> AppResult<Option<Principal>> {
    let user = store.users.find(user_id).await?;
    Ok(user
        .filter(|u| u.active && u.status == RegistrationStatus::Aprovado)
        .map(|u| Principal::from(&u)))
}
