//! Repository layer for data access operations.
//!
//! Provides async access to the device registry.

mod device_repo;

pub use device_repo::{DeviceRepository, DeviceStore};
