// src/lib.rs

// --- Declaração dos Módulos ---
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod policy;
pub mod services;
pub mod state;
pub mod store;
pub mod templates;
pub mod web;
