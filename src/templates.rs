// src/templates.rs
use askama::Template;
use chrono::{DateTime, Utc};

use crate::models::{
    pdf::Pdf,
    quiz::Quiz,
    user::{PendingRegistration, User},
};

// Struct para o template `login.html`
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    // Mensagem mostrada acima do formulário (ex.: sessão expirada)
    pub error: Option<String>,
}

// Painel principal. Só recebe texto já formatado para o template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub user_name: String,
    pub role_label: String,
    pub is_staff: bool,
    pub is_admin: bool,
    pub stats: DashboardStats,
    pub users: Vec<UserRow>,
    pub pending: Vec<UserRow>,
    pub quizzes: Vec<QuizCard>,
    pub archived: Vec<QuizCard>,
    pub deleted: Vec<QuizCard>,
    pub pdfs: Vec<PdfRow>,
}

/// Totais de cada coleção, mostrados no topo do painel.
#[derive(Clone, Debug, Default)]
pub struct DashboardStats {
    pub users: usize,
    pub pending: usize,
    pub quizzes: usize,
    pub archived: usize,
    pub deleted: usize,
    pub pdfs: usize,
}

#[derive(Clone, Debug)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub name: String,
    pub full_name: String,
    pub email: String,
    pub role_label: String,
    pub active: bool,
    pub since: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            username: u.username.clone(),
            name: u.name.clone(),
            full_name: u.full_name(),
            email: u.email.clone(),
            role_label: u.role.label().to_string(),
            active: u.active,
            since: format_date(&u.created_at),
        }
    }
}

impl From<&PendingRegistration> for UserRow {
    fn from(p: &PendingRegistration) -> Self {
        Self {
            id: p.id.clone(),
            username: p.username.clone(),
            name: p.name.clone(),
            full_name: format!("{} {}", p.name, p.surname).trim().to_string(),
            email: p.email.clone(),
            role_label: p.role.label().to_string(),
            active: false,
            since: format_date(&p.created_at),
        }
    }
}

#[derive(Clone, Debug)]
pub struct QuizCard {
    pub id: String,
    pub name: String,
    pub question_count: usize,
    pub created_by: String,
    pub stamp: String,
}

impl QuizCard {
    /// `stamp` é a data mais relevante para a coleção onde o quiz está.
    pub fn new(quiz: &Quiz, stamp: Option<&DateTime<Utc>>) -> Self {
        Self {
            id: quiz.id.clone(),
            name: quiz.name.clone(),
            question_count: quiz.questions.len(),
            created_by: quiz.created_by.clone(),
            stamp: format_date(stamp.unwrap_or(&quiz.created_at)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PdfRow {
    pub id: String,
    pub name: String,
    pub locked: bool,
    pub uploaded_by: String,
    pub uploaded_at: String,
    pub size_kb: usize,
}

impl From<&Pdf> for PdfRow {
    fn from(p: &Pdf) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            locked: p.locked,
            uploaded_by: p.uploaded_by.clone(),
            uploaded_at: format_date(&p.uploaded_at),
            size_kb: p.size_hint().div_ceil(1024),
        }
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%d/%m/%Y %H:%M").to_string()
}
