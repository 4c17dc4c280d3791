mod client;
mod error;
mod mib;

pub use client::{Client, DEFAULT_TIMEOUT};
pub use error::SnmpError;
