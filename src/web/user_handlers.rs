// src/web/user_handlers.rs
use crate::{
    error::AppResult,
    models::user::{Principal, StatusRequest, UpdateUserRequest, UserProfile},
    services::user_service,
    state::AppState,
    web::json_body,
};
use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

// GET /api/usuarios
pub async fn list_users(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let usuarios: Vec<UserProfile> = user_service::find_all_users(&state.store)
        .await?
        .iter()
        .map(UserProfile::from)
        .collect();
    Ok(Json(json!({ "success": true, "usuarios": usuarios })))
}

// PUT /api/usuarios/{id}
pub async fn handle_update_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let changes = json_body(payload)?;
    let user =
        user_service::update_user(&state.store, &id, changes, &principal, state.config.bcrypt_cost).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Usuário atualizado com sucesso",
        "usuario": UserProfile::from(&user),
    })))
}

// PATCH /api/usuarios/{id}/status
pub async fn handle_set_status(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let StatusRequest { ativo } = json_body(payload)?;
    let user = user_service::set_active(&state.store, &id, ativo, &principal).await?;
    Ok(Json(json!({
        "success": true,
        "message": if ativo { "Usuário ativado com sucesso" } else { "Usuário desativado com sucesso" },
        "usuario": UserProfile::from(&user),
    })))
}

// DELETE /api/usuarios/{id}
pub async fn handle_delete_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    user_service::delete_user(&state.store, &id, &principal).await?;
    Ok(Json(json!({ "success": true, "message": "Usuário excluído com sucesso" })))
}
