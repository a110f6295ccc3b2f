// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{LoginRequest, Principal, UserProfile},
    services::{auth_service, user_service},
    state::AppState,
    web::{json_body, mw_auth::SESSION_USER_KEY},
};
use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tower_sessions::Session;

// POST /login
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let form = json_body(payload)?;
    tracing::info!("Tentativa de login para: {}", form.usuario);

    let user = auth_service::login(&state.store, &form.usuario, &form.senha, state.config.bcrypt_cost).await?;

    // Novo ID de sessão a cada login
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao rodar ID: {}", e)))?;
    session
        .insert(SESSION_USER_KEY, &user.id)
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao inserir na sessão: {}", e)))?;

    Ok(Json(json!({
        "success": true,
        "message": "Login realizado com sucesso",
        "usuario": UserProfile::from(&user),
    })))
}

// POST /logout
pub async fn handle_logout(session: Session) -> AppResult<impl IntoResponse> {
    let user_id: Option<String> = session.get(SESSION_USER_KEY).await.ok().flatten();

    session
        .delete()
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao apagar sessão: {}", e)))?;

    match user_id {
        Some(id) => tracing::info!("🚪 Utilizador '{}' desligado.", id),
        None => tracing::info!("🚪 Sessão anónima desligada."),
    }

    Ok(Json(json!({ "success": true, "message": "Sessão terminada" })))
}

// GET /usuario
pub async fn handle_current_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> AppResult<impl IntoResponse> {
    let user = user_service::find_user_by_id(&state.store, &principal.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Usuário não encontrado ou inativo".into()))?;

    Ok(Json(json!({ "success": true, "usuario": UserProfile::from(&user) })))
}
