use serde::Deserialize;
use std::{collections::BTreeMap, time::Duration};

const DEFAULT_PORT: u16 = 161;
const DEFAULT_INTERVAL_SECONDS: u64 = 30;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub devices: Vec<DeviceConfig>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DeviceConfig {
	pub host: String,
	pub port: Option<u16>,
	pub community: String,

	/// Seconds between refresh cycles.
	pub interval_seconds: Option<u64>,
	/// Seconds to wait for a telemetry round trip.
	pub timeout_seconds: Option<u64>,

	/// Energy totals carried over from previous runs, keyed by the
	/// device's 1-based outlet number. Applied once, after the first
	/// refresh that discovers outlets.
	#[serde(default)]
	pub initial_energy: BTreeMap<u32, f64>,
}

impl DeviceConfig {
	pub fn port(&self) -> u16 {
		self.port.unwrap_or(DEFAULT_PORT)
	}

	pub fn interval(&self) -> Duration {
		Duration::from_secs(self.interval_seconds.unwrap_or(DEFAULT_INTERVAL_SECONDS))
	}

	pub fn timeout(&self) -> Duration {
		self.timeout_seconds
			.map(Duration::from_secs)
			.unwrap_or(snmp::DEFAULT_TIMEOUT)
	}
}

#[cfg(test)]
mod tests {
	use super::Config;
	use std::time::Duration;

	const MINIMAL: &str = r#"
devices:
  - host: pdu.example.net
    community: public
"#;

	const FULL: &str = r#"
devices:
  - host: 10.0.0.7
    port: 1161
    community: private
    interval_seconds: 10
    timeout_seconds: 2
    initial_energy:
      1: 512.5
      4: 90.0
"#;

	#[test]
	fn test_minimal_device_entry_gets_defaults() {
		let config: Config = serde_yaml::from_str(MINIMAL).unwrap();

		let device = &config.devices[0];
		assert_eq!(device.port(), 161);
		assert_eq!(device.interval(), Duration::from_secs(30));
		assert_eq!(device.timeout(), snmp::DEFAULT_TIMEOUT);
		assert!(device.initial_energy.is_empty());
	}

	#[test]
	fn test_full_device_entry() {
		let config: Config = serde_yaml::from_str(FULL).unwrap();

		let device = &config.devices[0];
		assert_eq!(device.port(), 1161);
		assert_eq!(device.interval(), Duration::from_secs(10));
		assert_eq!(device.timeout(), Duration::from_secs(2));
		assert_eq!(device.initial_energy.get(&1), Some(&512.5));
		assert_eq!(device.initial_energy.get(&4), Some(&90.0));
	}
}
