// src/repositories/mod.rs

pub mod memory;
pub mod sqlite;

pub use smspay_common::traits::repository_traits::ProgressRepository;
pub use memory::InMemoryProgressRepository;
pub use sqlite::progress::SqliteProgressRepository;
