// src/services/pdf_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        pdf::{Pdf, PDF_MIME},
        user::{Principal, Role},
    },
    policy::{self, ADMIN_ONLY, STAFF},
    store::{self, Store},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use uuid::Uuid;

fn not_found() -> AppError {
    AppError::NotFound("PDF não encontrado".into())
}

pub async fn list(store: &Store) -> AppResult<Vec<Pdf>> {
    Ok(store.pdfs.list().await?)
}

pub async fn list_deleted(store: &Store) -> AppResult<Vec<Pdf>> {
    Ok(store.deleted_pdfs.list().await?)
}

pub async fn find(store: &Store, id: &str) -> AppResult<Pdf> {
    store.pdfs.find(id).await?.ok_or_else(not_found)
}

/// Guarda um PDF enviado. O conteúdo fica em base64 como data URL.
pub async fn upload(
    store: &Store,
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
    max_bytes: usize,
    actor: &Principal,
) -> AppResult<Pdf> {
    policy::authorize(actor, STAFF)?;

    if content_type != PDF_MIME {
        return Err(AppError::Validation("Apenas arquivos PDF são permitidos".into()));
    }
    if bytes.is_empty() {
        return Err(AppError::Validation("Arquivo vazio".into()));
    }
    if bytes.len() > max_bytes {
        return Err(AppError::Validation(format!(
            "Arquivo muito grande. Máximo {}MB permitido",
            max_bytes / (1024 * 1024)
        )));
    }
    let name = file_name.trim();
    let name = if name.is_empty() { "documento.pdf" } else { name };

    let pdf = Pdf {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        payload: format!("data:{};base64,{}", PDF_MIME, STANDARD.encode(bytes)),
        locked: false,
        uploaded_by: actor.username.clone(),
        uploaded_at: Utc::now(),
        deleted_at: None,
        deleted_by: None,
    };

    let _guard = store.lock().await;
    let pdf = store.pdfs.insert(pdf).await?;
    tracing::info!("📄 PDF '{}' ({} bytes) enviado por {}", pdf.name, bytes.len(), actor.username);
    Ok(pdf)
}

/// Bytes do PDF para visualização (não depende do bloqueio).
pub async fn content(store: &Store, id: &str) -> AppResult<(Pdf, Vec<u8>)> {
    let pdf = find(store, id).await?;
    let bytes = decode(&pdf)?;
    Ok((pdf, bytes))
}

/// Bytes do PDF para download. PDFs bloqueados só podem ser baixados por administradores.
pub async fn download(store: &Store, id: &str, actor: &Principal) -> AppResult<(Pdf, Vec<u8>)> {
    let pdf = find(store, id).await?;
    if pdf.locked && actor.role != Role::Administrador {
        tracing::warn!("Download do PDF bloqueado '{}' recusado para {}", id, actor.username);
        return Err(AppError::Forbidden(
            "Este PDF está bloqueado para download. Entre em contato com um administrador.".into(),
        ));
    }
    let bytes = decode(&pdf)?;
    Ok((pdf, bytes))
}

fn decode(pdf: &Pdf) -> AppResult<Vec<u8>> {
    STANDARD.decode(pdf.base64_body()).map_err(|e| {
        tracing::error!("Conteúdo base64 inválido no PDF '{}': {}", pdf.id, e);
        AppError::InternalServerError
    })
}

/// Inverte o bloqueio no próprio registo, sem mudar de coleção.
pub async fn toggle_lock(store: &Store, id: &str, actor: &Principal) -> AppResult<Pdf> {
    policy::authorize(actor, ADMIN_ONLY)?;

    let _guard = store.lock().await;
    let mut pdf = store.pdfs.find(id).await?.ok_or_else(not_found)?;
    pdf.locked = !pdf.locked;
    if !store.pdfs.replace(pdf.clone()).await? {
        return Err(not_found());
    }
    tracing::info!(
        "PDF '{}' {} por {}",
        pdf.name,
        if pdf.locked { "bloqueado" } else { "desbloqueado" },
        actor.username
    );
    Ok(pdf)
}

/// ativo → excluído (sem volta).
pub async fn delete(store: &Store, id: &str, actor: &Principal) -> AppResult<Pdf> {
    policy::authorize(actor, ADMIN_ONLY)?;

    let _guard = store.lock().await;
    let deleted_by = actor.username.clone();
    let pdf = store::transfer(store.pdfs.as_ref(), store.deleted_pdfs.as_ref(), id, move |mut p| {
        p.deleted_at = Some(Utc::now());
        p.deleted_by = Some(deleted_by);
        p
    })
    .await?
    .ok_or_else(not_found)?;

    tracing::info!("🗑️ PDF '{}' excluído por {}", pdf.name, actor.username);
    Ok(pdf)
}
