//! Outbound HTTP plumbing shared by the push providers.

pub mod client;
