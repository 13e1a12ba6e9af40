// src/config/mod.rs
pub mod monitor;
