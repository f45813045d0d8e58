//! Service layer.
//!
//! Services coordinate the device registry and the push providers.

pub mod push;

pub use push::{PushDeviceManager, PushDispatcher};
