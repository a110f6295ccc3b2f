// src/error.rs
use crate::store::StoreError;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // Campos em falta ou mal formados (400)
    #[error("Dados inválidos: {0}")]
    Validation(String),

    // Sem sessão ou credenciais inválidas (401)
    #[error("Não autenticado: {0}")]
    Unauthorized(String),

    // Autenticado, mas sem o papel necessário (403)
    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("Não encontrado: {0}")]
    NotFound(String),

    // Usuário ou email duplicado (409)
    #[error("Conflito: {0}")]
    Conflict(String),

    #[error("Erro de armazenamento: {0}")]
    Storage(#[from] StoreError),

    #[error("Erro na base de dados de sessões: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Erro ao processar password")]
    PasswordHashingError,

    #[error("Erro na sessão: {0}")]
    SessionError(String),

    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro interno inesperado")]
    InternalServerError,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Como converter AppError numa resposta HTTP: sempre { success: false, message }
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();

        let message = match &self {
            AppError::Validation(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => {
                tracing::debug!("Pedido recusado ({}): {}", status.as_u16(), msg);
                msg.clone()
            }
            // Nada foi alterado quando o armazenamento falha; o cliente pode repetir
            AppError::Storage(e) => {
                tracing::error!("Erro de armazenamento: {:?}", e);
                "Erro ao aceder aos dados. Tente novamente.".to_string()
            }
            AppError::SqlxError(e) => {
                tracing::error!("Erro na base de dados de sessões: {:?}", e);
                "Erro ao aceder aos dados. Tente novamente.".to_string()
            }
            AppError::PasswordHashingError => {
                tracing::error!("Erro processado: {:?}", self);
                "Erro ao processar credenciais.".to_string()
            }
            AppError::SessionError(e) => {
                tracing::error!("Erro de sessão: {}", e);
                "Erro na gestão da sua sessão.".to_string()
            }
            AppError::Config(_) | AppError::InternalServerError => {
                tracing::error!("Erro processado: {:?}", self);
                "Erro interno do servidor".to_string()
            }
        };

        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

// Tipo Result padrão para a aplicação
pub type AppResult<T = ()> = Result<T, AppError>;
