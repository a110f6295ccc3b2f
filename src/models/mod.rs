// src/models/mod.rs
pub mod pdf;
pub mod quiz;
pub mod user;
