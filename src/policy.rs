// src/policy.rs
//! Listas estáticas de papéis autorizados por endpoint.

use crate::{
    error::{AppError, AppResult},
    models::user::{Principal, Role},
};

/// Qualquer utilizador autenticado.
pub const ANY_AUTHENTICATED: &[Role] = &[Role::Aluno, Role::Moderador, Role::Administrador];
/// Administradores e moderadores.
pub const STAFF: &[Role] = &[Role::Administrador, Role::Moderador];
pub const ADMIN_ONLY: &[Role] = &[Role::Administrador];

pub fn authorize(principal: &Principal, allowed: &[Role]) -> AppResult<()> {
    if allowed.contains(&principal.role) {
        Ok(())
    } else {
        tracing::warn!(
            "Acesso negado para '{}' (papel {}, requer {:?})",
            principal.username,
            principal.role,
            allowed
        );
        Err(AppError::Forbidden("Permissão insuficiente para esta operação".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal { id: "1".into(), username: "x".into(), role }
    }

    #[test]
    fn staff_list_excludes_students() {
        assert!(authorize(&principal(Role::Moderador), STAFF).is_ok());
        assert!(authorize(&principal(Role::Administrador), STAFF).is_ok());
        assert!(matches!(authorize(&principal(Role::Aluno), STAFF), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn admin_only_excludes_moderators() {
        assert!(authorize(&principal(Role::Administrador), ADMIN_ONLY).is_ok());
        assert!(authorize(&principal(Role::Moderador), ADMIN_ONLY).is_err());
        assert!(authorize(&principal(Role::Aluno), ANY_AUTHENTICATED).is_ok());
    }
}
