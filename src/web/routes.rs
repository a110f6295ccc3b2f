// src/web/routes.rs
use crate::{
    error::AppError,
    state::AppState,
    web::{
        auth_handlers, mw_auth, mw_roles, page_handlers, pdf_handlers, quiz_handlers, registration_handlers,
        user_handlers,
    },
};
use axum::{
    extract::DefaultBodyLimit,
    http::Uri,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{delete, get, patch, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

// Folga para os campos do formulário multipart além do próprio ficheiro
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

pub fn create_router(app_state: AppState) -> Router {
    // --- Rotas Públicas ---
    let public_routes = Router::new()
        .route("/", get(page_handlers::show_login_page))
        .route("/dashboard", get(page_handlers::show_dashboard))
        .route("/login", post(auth_handlers::handle_login))
        .route("/logout", post(auth_handlers::handle_logout))
        .route("/cadastro", post(registration_handlers::handle_submit));

    // --- Qualquer utilizador autenticado ---
    let member_routes = Router::new()
        .route("/usuario", get(auth_handlers::handle_current_user))
        .route("/api/usuarios", get(user_handlers::list_users))
        .route("/api/quizzes", get(quiz_handlers::list_active))
        .route("/api/quizzes/arquivados", get(quiz_handlers::list_archived))
        .route("/api/quizzes/{id}", get(quiz_handlers::show_quiz))
        .route("/api/pdfs", get(pdf_handlers::list_pdfs))
        .route("/api/pdfs/{id}", get(pdf_handlers::view_pdf))
        .route("/api/pdfs/{id}/download", get(pdf_handlers::download_pdf));

    // --- Administrador ou moderador ---
    let staff_routes = Router::new()
        .route(
            "/api/usuarios/{id}",
            put(user_handlers::handle_update_user).delete(user_handlers::handle_delete_user),
        )
        .route("/api/usuarios/{id}/status", patch(user_handlers::handle_set_status))
        .route("/api/cadastros", get(registration_handlers::list_pending))
        .route("/api/cadastros/{id}", delete(registration_handlers::handle_reject))
        .route("/api/cadastros/{id}/aprovar", post(registration_handlers::handle_approve))
        .route("/api/cadastros/{id}/rejeitar", post(registration_handlers::handle_reject))
        .route("/api/quizzes", post(quiz_handlers::handle_create))
        .route("/api/quizzes/excluidos", get(quiz_handlers::list_deleted))
        .route("/api/quizzes/{id}", put(quiz_handlers::handle_update))
        .route("/api/quizzes/{id}/arquivar", put(quiz_handlers::handle_archive))
        .route("/api/quizzes/{id}/desarquivar", put(quiz_handlers::handle_unarchive))
        .route("/api/pdfs", post(pdf_handlers::upload_pdf))
        .route("/api/upload-pdf", post(pdf_handlers::upload_pdf))
        // Aplica APENAS mw_roles aqui (mw_auth é aplicado no router pai)
        .route_layer(middleware::from_fn(mw_roles::require_staff));

    // --- Só administrador ---
    let admin_routes = Router::new()
        .route("/api/quizzes/{id}", delete(quiz_handlers::handle_delete))
        .route("/api/quizzes/{id}/restaurar", put(quiz_handlers::handle_restore))
        .route("/api/quizzes/{id}/definitivo", delete(quiz_handlers::handle_purge))
        .route("/api/quizzes/lixeira", delete(quiz_handlers::handle_purge_all))
        .route("/api/pdfs/{id}", delete(pdf_handlers::delete_pdf))
        .route("/api/pdfs/{id}/toggle-lock", put(pdf_handlers::toggle_lock))
        .route("/api/pdfs/excluidos", get(pdf_handlers::list_deleted_pdfs))
        .route_layer(middleware::from_fn(mw_roles::require_admin));

    // Mesmo caminho com métodos diferentes em grupos diferentes: o merge junta os MethodRouter,
    // e cada método mantém a sua camada de papel.
    let authenticated_routes = Router::new()
        .merge(member_routes)
        .merge(staff_routes)
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(app_state.clone(), mw_auth::require_auth));

    // --- Router Final ---
    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .fallback(fallback)
        .with_state(app_state)
}

/// Router completo com as camadas de trace, sessão e limite de corpo.
pub fn build_app<S>(app_state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let ttl_hours = app_state.config.session_ttl_hours;
    let body_limit = app_state.config.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(ttl_hours)));

    create_router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(session_layer)
            .layer(DefaultBodyLimit::max(body_limit)),
    )
}

// API desconhecida responde JSON 404; o resto volta para a página inicial
async fn fallback(uri: Uri) -> Response {
    if uri.path().starts_with("/api/") || uri.path() == "/api" {
        tracing::debug!("Rota de API inexistente: {}", uri.path());
        return AppError::NotFound("Rota não encontrada".into()).into_response();
    }
    Redirect::to("/").into_response()
}
