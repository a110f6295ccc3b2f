// src/web/mw_roles.rs
use crate::{
    error::AppError,
    models::user::Principal,
    policy::{self, ADMIN_ONLY, STAFF},
};
use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::Response,
};

/// Exige papel de administrador ou moderador.
/// Deve ser executado *depois* do middleware `require_auth`.
pub async fn require_staff(
    Extension(principal): Extension<Principal>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    policy::authorize(&principal, STAFF)?;
    Ok(next.run(request).await)
}

/// Exige papel de administrador.
pub async fn require_admin(
    Extension(principal): Extension<Principal>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    policy::authorize(&principal, ADMIN_ONLY)?;
    Ok(next.run(request).await)
}
