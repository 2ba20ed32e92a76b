// src/repositories/sqlite/mod.rs
pub mod progress;
