use crate::config::DeviceConfig;
use raritan::Device;
use snmp::Client;
use std::collections::BTreeMap;
use tokio::{sync::watch, task::JoinHandle, time::interval};

pub fn create_task(
	device: Device<Client>,
	config: DeviceConfig,
	shutdown: watch::Receiver<bool>,
) -> JoinHandle<anyhow::Result<()>> {
	tracing::info!("starting polling task for {}", device.unique_id());
	tokio::spawn(start_task(device, config, shutdown))
}

pub async fn start_task(
	mut device: Device<Client>,
	config: DeviceConfig,
	mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
	if !device.authenticate().await {
		tracing::warn!(
			"{} does not identify as a {} unit; polling anyway",
			device.unique_id(),
			raritan::DEVICE_SIGNATURE
		);
	}

	// Prior totals are seeded exactly once, after the first refresh that
	// discovers outlets and before any integration has run.
	let mut seeds = Some(config.initial_energy.clone());

	let mut ticker = interval(config.interval());
	loop {
		tokio::select! {
			_ = ticker.tick() => {
				device.refresh().await;

				if device.outlet_count() > 0 {
					if let Some(seeds) = seeds.take() {
						apply_energy_seeds(&mut device, &seeds);
					}
				}

				match serde_json::to_string(&device.snapshot()) {
					Ok(snapshot) => tracing::info!("{}: {snapshot}", device.unique_id()),
					Err(error) => tracing::error!(
						"{}: error serialising snapshot: {error:?}",
						device.unique_id()
					),
				}
			}
			_ = shutdown.changed() => {
				tracing::info!("shutting down polling task for {}", device.unique_id());
				break;
			}
		}
	}

	Ok(())
}

fn apply_energy_seeds(device: &mut Device<Client>, seeds: &BTreeMap<u32, f64>) {
	for (&index, &watt_hours) in seeds {
		match device.outlet_mut(index) {
			Some(outlet) => outlet.initialize_energy_delivered(watt_hours),
			None => tracing::warn!(
				"{} has no outlet {index}; ignoring configured energy seed",
				device.unique_id()
			),
		}
	}
}
