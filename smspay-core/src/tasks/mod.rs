// src/tasks/mod.rs
//
// Background timers that feed the purchase driver's inbox.

pub mod countdown;

pub use countdown::{spawn_countdown, spawn_after};
