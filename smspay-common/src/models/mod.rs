// File: smspay-common/src/models/mod.rs
pub mod product;
pub mod progress;
pub mod event;
pub mod sms;
pub mod network;

pub use product::Product;
pub use progress::ProgressRecord;
pub use event::PurchaseEvent;
pub use sms::{DeliveryResult, OutgoingSms, SentResult};
pub use network::{HniStatus, LogEntry, NetworkIdentity, PostLogsBody, ReceivedStatus, ReceivedStatusQuery};
