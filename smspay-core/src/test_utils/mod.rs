// src/test_utils/mod.rs
//
// Scripted collaborators and helpers shared by unit and integration tests.

pub mod fixtures;
pub mod helpers;
