use crate::{error::SnmpError, mib};
use raritan::{TelemetryLink, TelemetryRequest, TelemetryValue};
use snmp2::{Oid, SyncSession, Value};
use std::{
	fmt,
	sync::{Arc, Mutex, PoisonError},
	time::Duration,
};

/// Time allowed for a single request round trip before the link reports the
/// batch as failed.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// SNMP v2c telemetry link.
///
/// The wire session is synchronous, so fetches run on the blocking thread
/// pool. The session is established lazily on first use and reused across
/// refresh cycles; any request failure drops it, and the next fetch starts
/// with a fresh one.
#[derive(Clone)]
pub struct Client {
	target: String,
	community: String,
	timeout: Duration,
	session: Arc<Mutex<Option<SyncSession>>>,
}

impl Client {
	/// Creates a new client for the given agent. No I/O happens until the
	/// first fetch.
	pub fn new(host: impl AsRef<str>, port: u16, community: impl Into<String>) -> Self {
		Self {
			target: format!("{}:{}", host.as_ref(), port),
			community: community.into(),
			timeout: DEFAULT_TIMEOUT,
			session: Arc::new(Mutex::new(None)),
		}
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	fn fetch_blocking(&self, requests: &[TelemetryRequest]) -> Result<Vec<TelemetryValue>, SnmpError> {
		let mut guard = self
			.session
			.lock()
			.unwrap_or_else(PoisonError::into_inner);

		if guard.is_none() {
			tracing::debug!("establishing SNMP session with {}", self.target);
			let session = SyncSession::new_v2c(
				self.target.as_str(),
				self.community.as_bytes(),
				Some(self.timeout),
				0,
			)
			.map_err(|error| SnmpError::Request {
				target: self.target.clone(),
				detail: format!("{error:?}"),
			})?;
			*guard = Some(session);
		}

		let mut values = Vec::with_capacity(requests.len());
		let mut failure = None;
		match guard.as_mut() {
			Some(session) => {
				for request in requests {
					match Self::get_one(session, request, &self.target) {
						Ok(value) => values.push(value),
						Err(error) => {
							failure = Some(error);
							break;
						}
					}
				}
			}
			None => {
				failure = Some(SnmpError::Request {
					target: self.target.clone(),
					detail: "session unavailable".to_owned(),
				});
			}
		}

		if let Some(error) = failure {
			// The batch is all-or-nothing. Drop the session as well, so the
			// next cycle reconnects instead of reusing a possibly-wedged
			// socket.
			*guard = None;
			return Err(error);
		}

		Ok(values)
	}

	fn get_one(
		session: &mut SyncSession,
		request: &TelemetryRequest,
		target: &str,
	) -> Result<TelemetryValue, SnmpError> {
		let arcs = mib::resolve(request.module, request.object, request.instance)?;
		let oid = Oid::from(arcs.as_slice()).map_err(|_| SnmpError::InvalidOid {
			module: request.module.to_owned(),
			object: request.object.to_owned(),
		})?;

		let mut response = session.get(&oid).map_err(|error| SnmpError::Request {
			target: target.to_owned(),
			detail: format!("{error:?}"),
		})?;

		let Some((_oid, value)) = response.varbinds.next() else {
			return Err(SnmpError::EmptyResponse {
				target: target.to_owned(),
			});
		};

		convert(value).ok_or_else(|| SnmpError::UnsupportedType {
			target: target.to_owned(),
		})
	}
}

impl TelemetryLink for Client {
	async fn fetch(&self, requests: &[TelemetryRequest]) -> anyhow::Result<Vec<TelemetryValue>> {
		let client = self.clone();
		let requests = requests.to_vec();
		let values =
			tokio::task::spawn_blocking(move || client.fetch_blocking(&requests)).await??;
		Ok(values)
	}
}

impl fmt::Debug for Client {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Client")
			.field("target", &self.target)
			.field("timeout", &self.timeout)
			.finish()
	}
}

/// Maps a wire value onto the shared telemetry scalar types. Integer-family
/// values stay integers; octet strings go through the shared token-typing
/// rule. Anything else fails the batch.
fn convert(value: Value<'_>) -> Option<TelemetryValue> {
	match value {
		Value::Integer(value) => Some(TelemetryValue::Integer(value)),
		Value::Counter32(value) | Value::Unsigned32(value) | Value::Timeticks(value) => {
			Some(TelemetryValue::Integer(value.into()))
		}
		Value::Counter64(value) => Some(TelemetryValue::Integer(value as i64)),
		Value::Boolean(value) => Some(TelemetryValue::Integer(value.into())),
		Value::OctetString(bytes) => {
			Some(TelemetryValue::parse(&String::from_utf8_lossy(bytes)))
		}
		Value::IpAddress(octets) => Some(TelemetryValue::Text(format!(
			"{}.{}.{}.{}",
			octets[0], octets[1], octets[2], octets[3]
		))),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::convert;
	use raritan::TelemetryValue;
	use snmp2::Value;

	#[test]
	fn test_integer_family_stays_integer() {
		assert_eq!(
			convert(Value::Integer(-12)),
			Some(TelemetryValue::Integer(-12))
		);
		assert_eq!(
			convert(Value::Counter32(8)),
			Some(TelemetryValue::Integer(8))
		);
		assert_eq!(
			convert(Value::Counter64(1_000_000)),
			Some(TelemetryValue::Integer(1_000_000))
		);
	}

	#[test]
	fn test_octet_strings_are_typed_by_token() {
		assert_eq!(
			convert(Value::OctetString(b"Yes")),
			Some(TelemetryValue::Text("Yes".to_owned()))
		);
		assert_eq!(
			convert(Value::OctetString(b"230")),
			Some(TelemetryValue::Integer(230))
		);
	}

	#[test]
	fn test_exotic_types_fail_the_batch() {
		assert_eq!(convert(Value::Null), None);
	}
}
