// src/services/mod.rs
pub mod auth_service;
pub mod pdf_service;
pub mod quiz_service;
pub mod registration_service;
pub mod user_service;
