mod device;
pub use device::{Device, DeviceSnapshot};

// Per-outlet sensor-field declarations and their wire-name mapping
//
pub mod fields;
pub use fields::SensorField;

// Telemetry-link contract shared by every transport implementation
//
pub mod link;
pub use link::{TelemetryLink, TelemetryRequest, TelemetryValue};

mod outlet;
pub use outlet::{Outlet, OutletSnapshot};

/// Prefix of the system description reported by every unit in the supported
/// device family. Used by the authentication probe.
pub const DEVICE_SIGNATURE: &str = "Raritan Dominion PX";
