// src/purchase/mod.rs
//
// The purchase driver: a single actor that owns one purchase session at a
// time and serialises every timer tick, transmitter callback and HTTP
// completion through its inbox.

pub mod context;
pub mod driver;
pub mod inbox;
pub mod pacing;
pub mod state;

pub use context::{DriverSettings, PurchaseContext, PurchaseDeps, SmsErrorPolicy};
pub use driver::PurchaseDriver;
pub use pacing::PacingPlan;
pub use state::{SessionState, Termination};
