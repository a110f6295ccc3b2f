// src/web/quiz_handlers.rs
use crate::{
    error::AppResult,
    models::{quiz::QuizRequest, user::Principal},
    services::quiz_service,
    state::AppState,
    web::json_body,
};
use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

// --- Listagens ---

pub async fn list_active(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let quizzes = quiz_service::list_active(&state.store).await?;
    Ok(Json(json!({ "success": true, "quizzes": quizzes })))
}

pub async fn list_archived(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let quizzes = quiz_service::list_archived(&state.store).await?;
    Ok(Json(json!({ "success": true, "quizzes": quizzes })))
}

pub async fn list_deleted(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let quizzes = quiz_service::list_deleted(&state.store).await?;
    Ok(Json(json!({ "success": true, "quizzes": quizzes })))
}

// GET /api/quizzes/{id}
pub async fn show_quiz(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let quiz = quiz_service::find_active(&state.store, &id).await?;
    Ok(Json(json!({ "success": true, "quiz": quiz })))
}

// --- Criação e edição ---

pub async fn handle_create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<QuizRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let request = json_body(payload)?;
    let quiz = quiz_service::create(&state.store, request, &principal).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "quiz": quiz }))))
}

pub async fn handle_update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    payload: Result<Json<QuizRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let request = json_body(payload)?;
    let quiz = quiz_service::update(&state.store, &id, request, &principal).await?;
    Ok(Json(json!({ "success": true, "quiz": quiz })))
}

// --- Transições ---

pub async fn handle_archive(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let quiz = quiz_service::archive(&state.store, &id, &principal).await?;
    Ok(Json(json!({ "success": true, "message": "Quiz arquivado com sucesso", "quiz": quiz })))
}

pub async fn handle_unarchive(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let quiz = quiz_service::unarchive(&state.store, &id, &principal).await?;
    Ok(Json(json!({ "success": true, "message": "Quiz desarquivado com sucesso", "quiz": quiz })))
}

pub async fn handle_delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let quiz = quiz_service::delete(&state.store, &id, &principal).await?;
    Ok(Json(json!({ "success": true, "message": "Quiz movido para a lixeira", "quiz": quiz })))
}

pub async fn handle_restore(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let quiz = quiz_service::restore(&state.store, &id, &principal).await?;
    Ok(Json(json!({ "success": true, "message": "Quiz restaurado com sucesso", "quiz": quiz })))
}

pub async fn handle_purge(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    quiz_service::purge(&state.store, &id, &principal).await?;
    Ok(Json(json!({ "success": true, "message": "Quiz excluído definitivamente" })))
}

pub async fn handle_purge_all(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> AppResult<impl IntoResponse> {
    let removidos = quiz_service::purge_all(&state.store, &principal).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Lixeira esvaziada com sucesso",
        "removidos": removidos,
    })))
}
