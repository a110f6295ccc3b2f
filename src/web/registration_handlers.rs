// src/web/registration_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{PendingProfile, Principal, RegistrationRequest, RejectRequest, UserProfile},
    services::registration_service,
    state::AppState,
    web::json_body,
};
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

// POST /cadastro (público)
pub async fn handle_submit(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let data = json_body(payload)?.validate()?;
    let pending = registration_service::submit(&state.store, data, state.config.bcrypt_cost).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Cadastro enviado. Aguarde a aprovação de um administrador.",
            "cadastro": PendingProfile::from(&pending),
        })),
    ))
}

// GET /api/cadastros
pub async fn list_pending(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let cadastros: Vec<PendingProfile> = registration_service::list_pending(&state.store)
        .await?
        .iter()
        .map(PendingProfile::from)
        .collect();
    Ok(Json(json!({ "success": true, "cadastros": cadastros })))
}

// POST /api/cadastros/{id}/aprovar
pub async fn handle_approve(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let user = registration_service::approve(&state.store, &id, &principal).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Cadastro aprovado com sucesso",
        "usuario": UserProfile::from(&user),
    })))
}

// DELETE /api/cadastros/{id} e POST /api/cadastros/{id}/rejeitar
// Corpo opcional: { "motivo": "..." }
pub async fn handle_reject(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let request: RejectRequest = if body.iter().all(u8::is_ascii_whitespace) {
        RejectRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|_| AppError::Validation("Corpo do pedido inválido".into()))?
    };

    registration_service::reject(&state.store, &id, &principal, request.motivo.as_deref()).await?;
    Ok(Json(json!({ "success": true, "message": "Cadastro rejeitado com sucesso" })))
}
