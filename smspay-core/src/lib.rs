// src/lib.rs

pub mod config;
pub mod db;
pub mod eventbus;
pub mod http;
pub mod network;
pub mod purchase;
pub mod repositories;
pub mod services;
pub mod tasks;
pub mod test_utils;
pub mod utils;

pub use db::Database;
pub use smspay_common::error::Error;
pub use http::{DefaultHttpClient, HttpClient};
pub use purchase::{PurchaseContext, PurchaseDriver, SessionState, Termination};
