// src/handlers/mod.rs

pub mod admin;
pub mod attempt;
pub mod auth;
pub mod catalog;
pub mod summary;
