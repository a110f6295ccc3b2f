// src/models/user.rs
use crate::{
    error::{AppError, AppResult},
    store::Entity,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Papel de um utilizador, tal como gravado em `tipo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    // O painel antigo enviava "usuario" para o papel base
    #[serde(alias = "usuario")]
    Aluno,
    Moderador,
    Administrador,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Aluno => "aluno",
            Role::Moderador => "moderador",
            Role::Administrador => "administrador",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Aluno => "Usuário",
            Role::Moderador => "Moderador",
            Role::Administrador => "Administrador",
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Moderador | Role::Administrador)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Pendente,
    Aprovado,
}

fn status_aprovado() -> RegistrationStatus {
    RegistrationStatus::Aprovado
}

fn status_pendente() -> RegistrationStatus {
    RegistrationStatus::Pendente
}

fn default_true() -> bool {
    true
}

// Representa um utilizador aprovado, tal como guardado em usuarios.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(rename = "usuario")]
    pub username: String,
    // Hash bcrypt (ou texto simples em ficheiros antigos, convertido no primeiro login)
    #[serde(rename = "senha")]
    pub password_hash: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "sobrenome", default)]
    pub surname: String,
    pub email: String,
    #[serde(rename = "telefone", default)]
    pub phone: String,
    #[serde(rename = "fotoBase64", default, skip_serializing_if = "Option::is_none")]
    pub photo_base64: Option<String>,
    #[serde(rename = "tipo")]
    pub role: Role,
    #[serde(default = "status_aprovado")]
    pub status: RegistrationStatus,
    #[serde(rename = "ativo", default = "default_true")]
    pub active: bool,
    #[serde(rename = "criadoEm", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "ultimoLogin", default)]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(rename = "aprovadoEm", default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(rename = "aprovadoPor", default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
}

impl Entity for User {
    fn id(&self) -> &str {
        &self.id
    }
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname).trim().to_string()
    }
}

/// Cadastro submetido e à espera de decisão (cadastros_pendentes.json).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRegistration {
    pub id: String,
    #[serde(rename = "usuario")]
    pub username: String,
    #[serde(rename = "senha")]
    pub password_hash: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "sobrenome", default)]
    pub surname: String,
    pub email: String,
    #[serde(rename = "telefone", default)]
    pub phone: String,
    #[serde(rename = "fotoBase64", default, skip_serializing_if = "Option::is_none")]
    pub photo_base64: Option<String>,
    #[serde(rename = "tipo")]
    pub role: Role,
    #[serde(default = "status_pendente")]
    pub status: RegistrationStatus,
    #[serde(rename = "criadoEm", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Entity for PendingRegistration {
    fn id(&self) -> &str {
        &self.id
    }
}

impl PendingRegistration {
    /// Constrói o utilizador aprovado a partir do cadastro, carimbando quem aprovou.
    pub fn into_user(self, approved_by: &str, now: DateTime<Utc>) -> User {
        User {
            id: self.id,
            username: self.username,
            password_hash: self.password_hash,
            name: self.name,
            surname: self.surname,
            email: self.email,
            phone: self.phone,
            photo_base64: self.photo_base64,
            role: self.role,
            status: RegistrationStatus::Aprovado,
            active: true,
            created_at: self.created_at,
            last_login: None,
            approved_at: Some(now),
            approved_by: Some(approved_by.to_string()),
        }
    }
}

/// Vista pública de um utilizador (nunca inclui o hash da senha).
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(rename = "usuario")]
    pub username: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "sobrenome")]
    pub surname: String,
    pub email: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    #[serde(rename = "fotoBase64", skip_serializing_if = "Option::is_none")]
    pub photo_base64: Option<String>,
    #[serde(rename = "tipo")]
    pub role: Role,
    pub status: RegistrationStatus,
    #[serde(rename = "ativo")]
    pub active: bool,
    #[serde(rename = "criadoEm")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "ultimoLogin")]
    pub last_login: Option<DateTime<Utc>>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            name: user.name.clone(),
            surname: user.surname.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            photo_base64: user.photo_base64.clone(),
            role: user.role,
            status: user.status,
            active: user.active,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingProfile {
    pub id: String,
    #[serde(rename = "usuario")]
    pub username: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "sobrenome")]
    pub surname: String,
    pub email: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    #[serde(rename = "tipo")]
    pub role: Role,
    pub status: RegistrationStatus,
    #[serde(rename = "criadoEm")]
    pub created_at: DateTime<Utc>,
}

impl From<&PendingRegistration> for PendingProfile {
    fn from(p: &PendingRegistration) -> Self {
        Self {
            id: p.id.clone(),
            username: p.username.clone(),
            name: p.name.clone(),
            surname: p.surname.clone(),
            email: p.email.clone(),
            phone: p.phone.clone(),
            role: p.role,
            status: p.status,
            created_at: p.created_at,
        }
    }
}

/// Identidade autenticada anexada ao pedido.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub username: String,
    pub role: Role,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self { id: user.id.clone(), username: user.username.clone(), role: user.role }
    }
}

// --- DTOs de entrada ---

// Corpo JSON de POST /login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub usuario: String,
    #[serde(default)]
    pub senha: String,
}

pub const MIN_PASSWORD_LEN: usize = 6;

// Corpo JSON de POST /cadastro
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    #[serde(default)]
    pub usuario: String,
    #[serde(default)]
    pub senha: String,
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub sobrenome: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telefone: Option<String>,
    #[serde(default)]
    pub foto_base64: Option<String>,
}

/// Cadastro já validado e normalizado, pronto para ganhar hash e id.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub username: String,
    pub password: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    pub photo_base64: Option<String>,
}

impl RegistrationRequest {
    pub fn validate(self) -> AppResult<NewRegistration> {
        let username = self.usuario.trim().to_string();
        let name = self.nome.trim().to_string();
        let email = self.email.trim().to_lowercase();

        if username.is_empty() || self.senha.is_empty() || name.is_empty() || email.is_empty() {
            return Err(AppError::Validation(
                "Campos obrigatórios: usuário, senha, nome e email".into(),
            ));
        }
        if username.chars().any(char::is_whitespace) {
            return Err(AppError::Validation("O usuário não pode conter espaços".into()));
        }
        if self.senha.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation(format!(
                "A senha deve ter pelo menos {} caracteres",
                MIN_PASSWORD_LEN
            )));
        }
        validate_email(&email)?;

        Ok(NewRegistration {
            username,
            password: self.senha,
            name,
            surname: self.sobrenome.unwrap_or_default().trim().to_string(),
            email,
            phone: self.telefone.unwrap_or_default().trim().to_string(),
            photo_base64: self.foto_base64.filter(|f| !f.is_empty()),
        })
    }
}

pub fn validate_email(email: &str) -> AppResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(AppError::Validation("Email inválido".into()))
    }
}

// Corpo JSON de PUT /api/usuarios/{id}
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub nome: Option<String>,
    pub sobrenome: Option<String>,
    pub email: Option<String>,
    pub usuario: Option<String>,
    pub telefone: Option<String>,
    pub tipo: Option<Role>,
    pub nova_senha: Option<String>,
    // Senha de quem está a editar, para confirmar a alteração
    #[serde(default)]
    pub senha_confirmacao: String,
}

// Corpo JSON de PATCH /api/usuarios/{id}/status
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub ativo: bool,
}

// Corpo opcional ao rejeitar um cadastro
#[derive(Debug, Default, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub motivo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegistrationRequest {
        RegistrationRequest {
            usuario: " ana ".into(),
            senha: "abcdef".into(),
            nome: "Ana".into(),
            sobrenome: None,
            email: "A@X.com".into(),
            telefone: None,
            foto_base64: Some(String::new()),
        }
    }

    #[test]
    fn registration_is_normalized() {
        let reg = request().validate().unwrap();
        assert_eq!(reg.username, "ana");
        assert_eq!(reg.email, "a@x.com");
        assert_eq!(reg.surname, "");
        assert!(reg.photo_base64.is_none());
    }

    #[test]
    fn registration_requires_fields_and_password_length() {
        let missing = RegistrationRequest { email: String::new(), ..request() };
        assert!(matches!(missing.validate(), Err(AppError::Validation(_))));

        let short = RegistrationRequest { senha: "abc".into(), ..request() };
        assert!(matches!(short.validate(), Err(AppError::Validation(_))));

        let bad_email = RegistrationRequest { email: "sem-arroba".into(), ..request() };
        assert!(matches!(bad_email.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn legacy_role_alias_and_defaults_deserialize() {
        let raw = r#"{
            "id": "u1", "usuario": "admin", "senha": "admin123",
            "nome": "Admin", "email": "admin@x.com", "tipo": "usuario"
        }"#;
        let user: User = serde_json::from_str(raw).unwrap();
        assert_eq!(user.role, Role::Aluno);
        assert_eq!(user.status, RegistrationStatus::Aprovado);
        assert!(user.active);
        assert!(user.last_login.is_none());
    }

    #[test]
    fn approval_stamps_actor_and_status() {
        let pending = PendingRegistration {
            id: "p1".into(),
            username: "ana".into(),
            password_hash: "$2b$04$hash".into(),
            name: "Ana".into(),
            surname: String::new(),
            email: "a@x.com".into(),
            phone: String::new(),
            photo_base64: None,
            role: Role::Aluno,
            status: RegistrationStatus::Pendente,
            created_at: Utc::now(),
        };
        let now = Utc::now();
        let user = pending.into_user("admin-id", now);
        assert_eq!(user.id, "p1");
        assert_eq!(user.status, RegistrationStatus::Aprovado);
        assert!(user.active);
        assert_eq!(user.approved_by.as_deref(), Some("admin-id"));
        assert_eq!(user.approved_at, Some(now));
    }

    #[test]
    fn profile_never_serializes_password() {
        let raw = r#"{"id":"u1","usuario":"a","senha":"segredo","nome":"A","email":"a@x.com","tipo":"moderador"}"#;
        let user: User = serde_json::from_str(raw).unwrap();
        let json = serde_json::to_value(UserProfile::from(&user)).unwrap();
        assert!(json.get("senha").is_none());
        assert_eq!(json["tipo"], "moderador");
        assert_eq!(json["ativo"], true);
    }
}
