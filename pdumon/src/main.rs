mod config;
mod tasks;

use clap::Parser;
use config::Config;
use raritan::Device;
use snmp::Client;
use std::{
	fs::File,
	path::{Path, PathBuf},
	sync::Arc,
};
use tokio::sync::watch;

#[derive(Parser)]
pub struct Arguments {
	#[clap(env = "PDUMON_CONFIG_PATH")]
	config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt::init();

	let arguments = Arguments::parse();
	let (shutdown_tx, shutdown_rx) = watch::channel(false);

	// Read the configuration file
	let config = load_config(arguments.config)?;

	// Spawn one polling task per configured device. Refreshes within a task
	// are strictly sequential; devices are independent of each other.
	let mut poll_tasks = Vec::new();
	for device_config in &config.devices {
		let link = Client::new(
			device_config.host.as_str(),
			device_config.port(),
			device_config.community.as_str(),
		)
		.with_timeout(device_config.timeout());

		let device = Device::new(
			device_config.host.as_str(),
			device_config.port(),
			device_config.community.as_str(),
			link,
		);

		poll_tasks.push(tasks::poll::create_task(
			device,
			device_config.clone(),
			shutdown_rx.clone(),
		));
	}

	if poll_tasks.is_empty() {
		tracing::warn!("no devices configured, nothing to poll");
	}

	tokio::signal::ctrl_c().await?;
	tracing::debug!("received ctrl-c, closing");
	shutdown_tx.send(true)?;

	for task in poll_tasks {
		task.await??;
	}

	Ok(())
}

fn load_config<T: AsRef<Path>>(path: T) -> anyhow::Result<Arc<Config>> {
	let path = path.as_ref();
	let config_file = File::open(path)?;
	let config = match path.extension().and_then(|s| s.to_str()) {
		Some("yaml") | Some("yml") => serde_yaml::from_reader(config_file)?,
		Some("json") => serde_json::from_reader(config_file)?,
		None | Some(_) => anyhow::bail!("unknown config file extension"),
	};
	let config = Arc::new(config);
	Ok(config)
}
