// File: smspay-common/src/lib.rs
//
// Shared types for the SMS purchase engine: the error type, the data model
// and the traits every external collaborator implements.

pub mod error;
pub mod models;
pub mod traits;

pub use error::Error;
