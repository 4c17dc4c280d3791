use crate::{fields::SensorField, link::TelemetryValue};
use serde::Serialize;
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// One switched socket on the unit, with its latest sensor readings and the
/// state of its energy accumulator.
///
/// Outlets are created by device discovery and live until the next
/// discovery that changes the outlet count (or the energy capability);
/// routine refreshes mutate them in place so the accumulated energy
/// survives.
#[derive(Clone, Debug)]
pub struct Outlet {
	/// The device's own 1-based outlet number.
	index: u32,
	energy_support: bool,

	readings: BTreeMap<SensorField, TelemetryValue>,
	last_update: Option<OffsetDateTime>,

	/// Energy delivered before this process instance started, seeded at
	/// most once by the caller.
	initial_energy_delivered: f64,
	/// Energy integrated by this process instance. Non-decreasing.
	session_energy_delivered: f64,
}

impl Outlet {
	pub fn new(index: u32, energy_support: bool) -> Self {
		let mut readings = BTreeMap::new();
		for field in SensorField::for_capability(energy_support) {
			let initial = match field {
				SensorField::Label => TelemetryValue::Text(String::new()),
				_ => TelemetryValue::Integer(0),
			};
			readings.insert(*field, initial);
		}

		Self {
			index,
			energy_support,
			readings,
			last_update: None,
			initial_energy_delivered: 0.0,
			session_energy_delivered: 0.0,
		}
	}

	#[inline(always)]
	pub fn index(&self) -> u32 {
		self.index
	}

	#[inline(always)]
	pub fn energy_support(&self) -> bool {
		self.energy_support
	}

	/// The outlet's field set, in request order.
	pub fn fields(&self) -> &'static [SensorField] {
		SensorField::for_capability(self.energy_support)
	}

	/// Latest value received for a field, if the field belongs to this
	/// outlet's capability tier.
	pub fn reading(&self, field: SensorField) -> Option<&TelemetryValue> {
		self.readings.get(&field)
	}

	pub(crate) fn store_reading(&mut self, field: SensorField, value: TelemetryValue) {
		self.readings.insert(field, value);
	}

	/// Seeds the accumulator with a total carried over from previous runs,
	/// e.g. from persisted storage or the device's native counter.
	///
	/// Call at most once, before the first integration step; seeding later
	/// double-counts or discards history.
	pub fn initialize_energy_delivered(&mut self, initial_value: f64) {
		self.initial_energy_delivered = initial_value;
		tracing::debug!(
			"outlet {}: initial energy delivered set to {initial_value}",
			self.index
		);
	}

	/// Energy delivered across all sessions, in Watt-hours.
	pub fn energy_delivered(&self) -> f64 {
		self.session_energy_delivered + self.initial_energy_delivered
	}

	/// Left-rectangle integration step: assume the active power just
	/// fetched held constant since the previous update and accumulate the
	/// resulting Watt-hours. Must run before the update timestamp is
	/// overwritten.
	pub(crate) fn update_energy_delivered(&mut self, now: OffsetDateTime) {
		// No prior sample to integrate from.
		let Some(last_update) = self.last_update else {
			return;
		};

		let elapsed = now - last_update;
		if elapsed.is_negative() {
			tracing::warn!(
				"outlet {}: sensor timestamp moved backwards, skipping energy update",
				self.index
			);
			return;
		}

		let Some(active_power) = self
			.reading(SensorField::ActivePower)
			.and_then(TelemetryValue::as_f64)
		else {
			return;
		};

		let elapsed_hours = elapsed.as_seconds_f64() / 3600.0;
		self.session_energy_delivered += active_power * elapsed_hours;
	}

	pub(crate) fn mark_updated(&mut self, now: OffsetDateTime) {
		self.last_update = Some(now);
	}

	/// Owned copy of the outlet's current state.
	pub fn snapshot(&self) -> OutletSnapshot {
		OutletSnapshot {
			label: self
				.reading(SensorField::Label)
				.map(TelemetryValue::to_string)
				.unwrap_or_default(),
			current: self.numeric_reading(SensorField::Current),
			voltage: self.numeric_reading(SensorField::Voltage),
			active_power: self.numeric_reading(SensorField::ActivePower),
			power_factor: self.numeric_reading(SensorField::PowerFactor),
			watt_hours: self
				.energy_support
				.then(|| self.numeric_reading(SensorField::WattHours)),
			energy_delivered: self.energy_delivered(),
		}
	}

	fn numeric_reading(&self, field: SensorField) -> f64 {
		self.reading(field)
			.and_then(TelemetryValue::as_f64)
			.unwrap_or(0.0)
	}
}

/// Point-in-time copy of an outlet's readings, detached from the outlet
/// itself.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutletSnapshot {
	/// User-assigned outlet name.
	pub label: String,
	/// Current draw, in milliamps.
	pub current: f64,
	/// Voltage, in millivolts.
	pub voltage: f64,
	/// Real power consumption, in Watts.
	pub active_power: f64,
	/// Power factor percentage.
	pub power_factor: f64,
	/// The device's native cumulative counter, when the unit reports one.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub watt_hours: Option<f64>,
	/// Locally integrated energy plus any seeded prior total, Watt-hours.
	pub energy_delivered: f64,
}

#[cfg(test)]
mod tests {
	use super::*;
	use time::macros::datetime;

	fn outlet_with_power(watts: i64) -> Outlet {
		let mut outlet = Outlet::new(1, false);
		outlet.store_reading(SensorField::ActivePower, TelemetryValue::Integer(watts));
		outlet
	}

	#[test]
	fn test_no_integration_without_prior_sample() {
		let mut outlet = outlet_with_power(100);
		outlet.update_energy_delivered(datetime!(2024-05-01 12:00 UTC));
		assert_eq!(outlet.energy_delivered(), 0.0);
	}

	#[test]
	fn test_no_integration_over_negative_interval() {
		let mut outlet = outlet_with_power(100);
		outlet.mark_updated(datetime!(2024-05-01 12:00 UTC));
		outlet.update_energy_delivered(datetime!(2024-05-01 11:59 UTC));
		assert_eq!(outlet.energy_delivered(), 0.0);
	}

	#[test]
	fn test_one_hour_at_constant_power() {
		let mut outlet = outlet_with_power(100);
		outlet.mark_updated(datetime!(2024-05-01 12:00 UTC));
		outlet.update_energy_delivered(datetime!(2024-05-01 13:00 UTC));
		assert_eq!(outlet.energy_delivered(), 100.0);
	}

	#[test]
	fn test_session_energy_is_monotonic() {
		let mut outlet = Outlet::new(1, false);
		let start = datetime!(2024-05-01 00:00 UTC);

		let mut previous = outlet.energy_delivered();
		for (minutes, watts) in [(0, 60), (5, 0), (5, 250), (0, 40), (-3, 75), (12, 5)] {
			let now = start + time::Duration::minutes(minutes);
			outlet.store_reading(SensorField::ActivePower, TelemetryValue::Integer(watts));
			outlet.update_energy_delivered(now);
			outlet.mark_updated(now);

			assert!(outlet.energy_delivered() >= previous);
			previous = outlet.energy_delivered();
		}
	}

	#[test]
	fn test_seed_offsets_reported_energy() {
		let mut outlet = outlet_with_power(10);
		outlet.initialize_energy_delivered(500.0);
		outlet.mark_updated(datetime!(2024-05-01 12:00 UTC));
		outlet.update_energy_delivered(datetime!(2024-05-01 13:00 UTC));
		assert_eq!(outlet.energy_delivered(), 510.0);
	}

	#[test]
	fn test_non_numeric_power_is_skipped() {
		let mut outlet = Outlet::new(1, false);
		outlet.store_reading(
			SensorField::ActivePower,
			TelemetryValue::Text("n/a".to_owned()),
		);
		outlet.mark_updated(datetime!(2024-05-01 12:00 UTC));
		outlet.update_energy_delivered(datetime!(2024-05-01 13:00 UTC));
		assert_eq!(outlet.energy_delivered(), 0.0);
	}

	#[test]
	fn test_snapshot_watt_hours_follows_capability() {
		assert_eq!(Outlet::new(1, false).snapshot().watt_hours, None);
		assert_eq!(Outlet::new(1, true).snapshot().watt_hours, Some(0.0));
	}

	#[test]
	fn test_fresh_outlet_reads_zero() {
		let snapshot = Outlet::new(3, false).snapshot();
		assert_eq!(snapshot.label, "");
		assert_eq!(snapshot.current, 0.0);
		assert_eq!(snapshot.voltage, 0.0);
		assert_eq!(snapshot.active_power, 0.0);
		assert_eq!(snapshot.power_factor, 0.0);
		assert_eq!(snapshot.energy_delivered, 0.0);
	}
}
