use crate::{
	fields::SensorField,
	link::{TelemetryLink, TelemetryRequest, TelemetryValue, PDU_MIB, SYSTEM_MIB},
	outlet::{Outlet, OutletSnapshot},
	DEVICE_SIGNATURE,
};
use serde::Serialize;
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// A single power-distribution unit and the latest state fetched from it.
///
/// Construction performs no I/O; state is populated by [`Device::refresh`].
/// Refreshes take `&mut self`, so two refresh cycles against the same
/// device cannot overlap.
#[derive(Debug)]
pub struct Device<L> {
	host: String,
	port: u16,
	community: String,
	link: L,

	name: String,
	energy_support: bool,
	outlet_count: u32,
	cpu_temperature: f64,
	outlets: Vec<Outlet>,
}

impl<L> Device<L> {
	pub fn new(
		host: impl Into<String>,
		port: u16,
		community: impl Into<String>,
		link: L,
	) -> Self {
		Self {
			host: host.into(),
			port,
			community: community.into(),
			link,
			name: String::new(),
			energy_support: false,
			outlet_count: 0,
			cpu_temperature: 0.0,
			outlets: Vec::new(),
		}
	}

	/// Stable identifier derived from the connection identity.
	pub fn unique_id(&self) -> String {
		format!("{}:{} {}", self.host, self.port, self.community)
	}

	/// Unit name derived from discovery; empty until the first successful
	/// refresh.
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn energy_support(&self) -> bool {
		self.energy_support
	}

	pub fn outlet_count(&self) -> u32 {
		self.outlet_count
	}

	/// Unit CPU temperature in whole degrees celsius.
	pub fn cpu_temperature(&self) -> f64 {
		self.cpu_temperature
	}

	pub fn outlets(&self) -> &[Outlet] {
		&self.outlets
	}

	/// Outlet by the device's own 1-based numbering.
	pub fn outlet(&self, index: u32) -> Option<&Outlet> {
		index
			.checked_sub(1)
			.and_then(|position| self.outlets.get(position as usize))
	}

	/// Mutable outlet access, e.g. for seeding a prior energy total.
	pub fn outlet_mut(&mut self, index: u32) -> Option<&mut Outlet> {
		index
			.checked_sub(1)
			.and_then(|position| self.outlets.get_mut(position as usize))
	}

	/// Owned copy of everything the device currently reports. Mutating the
	/// returned structure never touches internal state.
	pub fn snapshot(&self) -> DeviceSnapshot {
		DeviceSnapshot {
			cpu_temperature: self.cpu_temperature,
			outlets: self
				.outlets
				.iter()
				.map(|outlet| (outlet.index(), outlet.snapshot()))
				.collect(),
		}
	}
}

impl<L: TelemetryLink> Device<L> {
	/// Probes whether the configured host speaks for a supported unit.
	///
	/// The one place a link failure is deliberately swallowed into a
	/// boolean instead of aborting a cycle.
	pub async fn authenticate(&self) -> bool {
		let probe = [TelemetryRequest::new(SYSTEM_MIB, "sysDescr", 0)];
		match self.link.fetch(&probe).await {
			Ok(values) => values
				.first()
				.map(|description| description.to_string().starts_with(DEVICE_SIGNATURE))
				.unwrap_or(false),
			Err(error) => {
				tracing::debug!(
					"device {}: authentication probe failed: {error:?}",
					self.unique_id()
				);
				false
			}
		}
	}

	/// One full refresh cycle: a discovery round trip for unit state and
	/// outlet count, then a single batched round trip for every sensor
	/// field of every outlet. A failed round trip aborts the cycle and
	/// leaves all prior state intact.
	pub async fn refresh(&mut self) {
		let discovery = [
			TelemetryRequest::new(SYSTEM_MIB, "sysDescr", 0),
			TelemetryRequest::new(SYSTEM_MIB, "sysName", 0),
			TelemetryRequest::new(PDU_MIB, "outletEnergySupport", 0),
			TelemetryRequest::new(PDU_MIB, "outletCount", 0),
			TelemetryRequest::new(PDU_MIB, "unitCpuTemp", 0),
		];
		let Some(values) = self.fetch_checked(&discovery).await else {
			return;
		};
		self.apply_discovery(&values);

		if self.outlets.is_empty() {
			return;
		}

		// One flat request list: outlets in index order, each outlet's
		// fields in declared order.
		let requests: Vec<TelemetryRequest> = self
			.outlets
			.iter()
			.flat_map(|outlet| {
				outlet
					.fields()
					.iter()
					.map(move |field| TelemetryRequest::new(PDU_MIB, field.object(), outlet.index()))
			})
			.collect();

		let Some(values) = self.fetch_checked(&requests).await else {
			return;
		};

		// Distribute the response in exactly the order the requests were
		// built: same outlet walk, same field walk. Each outlet integrates
		// energy against its previous timestamp before the timestamp is
		// overwritten, with `now` sampled once for the whole batch.
		let now = OffsetDateTime::now_utc();
		let per_outlet = SensorField::for_capability(self.energy_support).len();
		for (outlet, chunk) in self.outlets.iter_mut().zip(values.chunks(per_outlet)) {
			for (field, value) in outlet.fields().iter().zip(chunk) {
				outlet.store_reading(*field, value.clone());
			}
			outlet.update_energy_delivered(now);
			outlet.mark_updated(now);
		}
	}

	async fn fetch_checked(&self, requests: &[TelemetryRequest]) -> Option<Vec<TelemetryValue>> {
		match self.link.fetch(requests).await {
			Ok(values) if values.len() == requests.len() => Some(values),
			Ok(values) => {
				tracing::warn!(
					"device {}: expected {} telemetry values, received {}; ignoring response",
					self.unique_id(),
					requests.len(),
					values.len()
				);
				None
			}
			Err(error) => {
				tracing::warn!(
					"device {}: telemetry fetch failed: {error:?}",
					self.unique_id()
				);
				None
			}
		}
	}

	fn apply_discovery(&mut self, values: &[TelemetryValue]) {
		let [description, system_name, energy_support, outlet_count, cpu_temperature] = values
		else {
			return;
		};

		let description = description.to_string();
		let family = description.split(" - ").next().unwrap_or("");
		self.name = format!("{family} {system_name}");

		// The capability flag is a label on the wire, not a boolean.
		let energy_support = energy_support.to_string() == "Yes";
		let outlet_count = outlet_count.as_i64().unwrap_or(0).max(0) as u32;
		if let Some(tenths) = cpu_temperature.as_f64() {
			self.cpu_temperature = tenths / 10.0;
		}

		// A changed outlet count (or a flipped capability flag) invalidates
		// every outlet's field set: rebuild the collection with zeroed
		// energy state. Otherwise outlets stay in place so their
		// accumulators survive the refresh.
		if outlet_count != self.outlet_count || energy_support != self.energy_support {
			self.outlets = (1..=outlet_count)
				.map(|index| Outlet::new(index, energy_support))
				.collect();
			self.outlet_count = outlet_count;
		}
		self.energy_support = energy_support;
	}
}

/// Point-in-time copy of a device's state: one snapshot per outlet, keyed
/// by the device's 1-based outlet number, plus the unit-level readings.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeviceSnapshot {
	pub cpu_temperature: f64,
	pub outlets: BTreeMap<u32, OutletSnapshot>,
}
