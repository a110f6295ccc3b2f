// src/web/mod.rs
pub mod auth_handlers;
pub mod mw_auth;
pub mod mw_roles;
pub mod page_handlers;
pub mod pdf_handlers;
pub mod quiz_handlers;
pub mod registration_handlers;
pub mod routes;
pub mod user_handlers;

use crate::error::{AppError, AppResult};
use axum::{extract::rejection::JsonRejection, Json};

/// Converte a rejeição do extrator JSON num erro de validação com corpo `{success:false}`.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!("Corpo JSON rejeitado: {}", rejection.body_text());
        AppError::Validation("Corpo do pedido inválido ou em falta".into())
    })
}
