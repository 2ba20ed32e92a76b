// src/network/mod.rs

pub mod rest_client;
pub mod slot;

pub use rest_client::{RestEligibilityClient, SDK_KEY_HEADER};
pub use slot::{RequestSlot, RequestSlots};
