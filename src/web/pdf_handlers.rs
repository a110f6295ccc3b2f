// src/web/pdf_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        pdf::{PdfSummary, PDF_MIME},
        user::Principal,
    },
    services::pdf_service,
    state::AppState,
};
use axum::{
    extract::{multipart::MultipartRejection, Extension, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

// Campo do formulário multipart que traz o ficheiro
const UPLOAD_FIELD: &str = "pdf";

// GET /api/pdfs
pub async fn list_pdfs(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let pdfs: Vec<PdfSummary> = pdf_service::list(&state.store).await?.iter().map(PdfSummary::from).collect();
    Ok(Json(json!({ "success": true, "pdfs": pdfs })))
}

// GET /api/pdfs/excluidos
pub async fn list_deleted_pdfs(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let pdfs: Vec<PdfSummary> = pdf_service::list_deleted(&state.store)
        .await?
        .iter()
        .map(PdfSummary::from)
        .collect();
    Ok(Json(json!({ "success": true, "pdfs": pdfs })))
}

// POST /api/pdfs e /api/upload-pdf (multipart, campo "pdf")
pub async fn upload_pdf(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<impl IntoResponse> {
    let mut multipart =
        multipart.map_err(|e| AppError::Validation(format!("Formulário inválido: {}", e.body_text())))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Falha ao ler o envio: {}", e.body_text())))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Falha ao ler o arquivo: {}", e.body_text())))?;

        let pdf = pdf_service::upload(
            &state.store,
            &file_name,
            &content_type,
            &bytes,
            state.config.max_upload_bytes,
            &principal,
        )
        .await?;

        return Ok((
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "PDF enviado com sucesso",
                "pdf": PdfSummary::from(&pdf),
            })),
        ));
    }

    Err(AppError::Validation("Nenhum arquivo enviado".into()))
}

// GET /api/pdfs/{id}
pub async fn view_pdf(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let (pdf, bytes) = pdf_service::content(&state.store, &id).await?;
    let disposition = format!("inline; filename=\"{}\"", sanitize_filename(&pdf.name));
    Ok(([(header::CONTENT_TYPE, PDF_MIME.to_string()), (header::CONTENT_DISPOSITION, disposition)], bytes))
}

// GET /api/pdfs/{id}/download
pub async fn download_pdf(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let (pdf, bytes) = pdf_service::download(&state.store, &id, &principal).await?;
    tracing::debug!("Download do PDF '{}' por {}", pdf.name, principal.username);
    let disposition = format!("attachment; filename=\"{}\"", sanitize_filename(&pdf.name));
    Ok(([(header::CONTENT_TYPE, PDF_MIME.to_string()), (header::CONTENT_DISPOSITION, disposition)], bytes))
}

// PUT /api/pdfs/{id}/toggle-lock
pub async fn toggle_lock(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let pdf = pdf_service::toggle_lock(&state.store, &id, &principal).await?;
    Ok(Json(json!({
        "success": true,
        "message": if pdf.locked { "PDF bloqueado com sucesso" } else { "PDF desbloqueado com sucesso" },
        "pdf": PdfSummary::from(&pdf),
    })))
}

// DELETE /api/pdfs/{id}
pub async fn delete_pdf(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    pdf_service::delete(&state.store, &id, &principal).await?;
    Ok(Json(json!({ "success": true, "message": "PDF excluído com sucesso" })))
}

/// Nome seguro para o cabeçalho Content-Disposition (só ASCII visível, sem aspas nem barras).
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' | '/' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "documento.pdf".to_string()
    } else {
        cleaned.to_string()
    }
}
