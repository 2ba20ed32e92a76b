// src/services/mod.rs
//
// Default implementations of the collaborators the purchase driver talks to.

pub mod catalogue;
pub mod intervals;
pub mod transmitter;

pub use catalogue::{DestinationRange, StaticCatalogue, TemplateMessageGenerator};
pub use intervals::UniformIntervalGenerator;
pub use transmitter::LoopbackTransmitter;
