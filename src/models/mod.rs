mod device;

pub use device::{Device, NewDevice, Platform};
