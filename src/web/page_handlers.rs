// src/web/page_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::Role,
    services::{pdf_service, quiz_service, registration_service, user_service},
    state::AppState,
    templates::{DashboardPage, DashboardStats, LoginPage, PdfRow, QuizCard, UserRow},
    web::mw_auth::{resolve_principal, SESSION_USER_KEY},
};
use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

// Código usado no redirecionamento quando a sessão deixou de ser válida
const STALE_SESSION_CODE: &str = "sessao";

// Query string de GET /: só códigos conhecidos viram mensagem
#[derive(Debug, Default, Deserialize)]
pub struct LoginParams {
    erro: Option<String>,
}

fn login_error_message(code: Option<&str>) -> Option<String> {
    match code? {
        STALE_SESSION_CODE => Some("A sua sessão expirou ou a conta foi desativada. Entre novamente.".into()),
        _ => None,
    }
}

// GET / (página de login; quem já tem sessão vai direto para o painel)
pub async fn show_login_page(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<LoginParams>,
) -> Response {
    if let Some(user_id) = session.get::<String>(SESSION_USER_KEY).await.ok().flatten() {
        if let Ok(Some(_)) = resolve_principal(&state.store, &user_id).await {
            tracing::debug!("GET /: Utilizador já logado, redirecionando para /dashboard");
            return Redirect::to("/dashboard").into_response();
        }
    }

    let template = LoginPage { error: login_error_message(params.erro.as_deref()) };
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Falha ao renderizar template de login: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Erro ao carregar a página.").into_response()
        }
    }
}

// GET /dashboard (sem sessão válida volta para o login)
pub async fn show_dashboard(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    let user_id: Option<String> = session
        .get(SESSION_USER_KEY)
        .await
        .map_err(|e| AppError::SessionError(format!("Erro ao verificar sessão: {}", e)))?;

    let Some(user_id) = user_id else {
        tracing::debug!("GET /dashboard sem sessão, redirecionando para /");
        return Ok(Redirect::to("/").into_response());
    };
    let Some(principal) = resolve_principal(&state.store, &user_id).await? else {
        tracing::warn!("GET /dashboard: sessão de '{}' já não é válida", user_id);
        if let Err(e) = session.flush().await {
            tracing::error!("Falha ao limpar sessão inválida: {:?}", e);
        }
        return Ok(Redirect::to(&format!("/?erro={}", STALE_SESSION_CODE)).into_response());
    };

    let me = user_service::find_user_by_id(&state.store, &principal.id)
        .await?
        .ok_or(AppError::InternalServerError)?;
    let is_staff = principal.role.is_staff();
    let is_admin = principal.role == Role::Administrador;

    let users = user_service::find_all_users(&state.store).await?;
    let pending = registration_service::list_pending(&state.store).await?;
    let quizzes = quiz_service::list_active(&state.store).await?;
    let archived = quiz_service::list_archived(&state.store).await?;
    let deleted = quiz_service::list_deleted(&state.store).await?;
    let pdfs = pdf_service::list(&state.store).await?;

    let stats = DashboardStats {
        users: users.len(),
        pending: pending.len(),
        quizzes: quizzes.len(),
        archived: archived.len(),
        deleted: deleted.len(),
        pdfs: pdfs.len(),
    };
    // Os totais são para todos; as listas de pendentes e da lixeira só para quem as gere
    let pending = if is_staff { pending } else { Vec::new() };
    let deleted = if is_admin { deleted } else { Vec::new() };

    let template = DashboardPage {
        user_name: me.full_name(),
        role_label: me.role.label().to_string(),
        is_staff,
        is_admin,
        stats,
        users: users.iter().map(UserRow::from).collect(),
        pending: pending.iter().map(UserRow::from).collect(),
        quizzes: quizzes.iter().map(|q| QuizCard::new(q, q.modified_at.as_ref())).collect(),
        archived: archived.iter().map(|q| QuizCard::new(q, q.archived_at.as_ref())).collect(),
        deleted: deleted.iter().map(|q| QuizCard::new(q, q.deleted_at.as_ref())).collect(),
        pdfs: pdfs.iter().map(PdfRow::from).collect(),
    };

    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("Falha ao renderizar template DashboardPage: {}", e);
            Err(AppError::InternalServerError)
        }
    }
}
