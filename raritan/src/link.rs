use std::fmt;

/// MIB module holding the unit-level system objects.
pub const SYSTEM_MIB: &str = "SNMPv2-MIB";

/// MIB module holding the PDU-specific objects.
pub const PDU_MIB: &str = "PDU-MIB";

/// One named data point to read from a device: a MIB module, an object name
/// within it, and an instance (`0` for scalars, the outlet number for table
/// columns).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TelemetryRequest {
	pub module: &'static str,
	pub object: &'static str,
	pub instance: u32,
}

impl TelemetryRequest {
	pub fn new(module: &'static str, object: &'static str, instance: u32) -> Self {
		Self {
			module,
			object,
			instance,
		}
	}
}

/// A scalar returned by the link for a single request.
#[derive(Clone, Debug, PartialEq)]
pub enum TelemetryValue {
	Integer(i64),
	Float(f64),
	Text(String),
}

impl TelemetryValue {
	/// Types a raw textual token: an integer-looking token becomes
	/// [`TelemetryValue::Integer`], a decimal-looking token becomes
	/// [`TelemetryValue::Float`], anything else stays text. Every link
	/// implementation routes stringly-typed wire values through here so
	/// they all agree on the rule.
	pub fn parse(token: &str) -> Self {
		if let Ok(value) = token.parse::<i64>() {
			return Self::Integer(value);
		}
		if let Ok(value) = token.parse::<f64>() {
			return Self::Float(value);
		}
		Self::Text(token.to_owned())
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Integer(value) => Some(*value),
			Self::Float(value) => Some(*value as i64),
			Self::Text(_) => None,
		}
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Integer(value) => Some(*value as f64),
			Self::Float(value) => Some(*value),
			Self::Text(_) => None,
		}
	}
}

impl fmt::Display for TelemetryValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Integer(value) => write!(f, "{value}"),
			Self::Float(value) => write!(f, "{value}"),
			Self::Text(value) => write!(f, "{value}"),
		}
	}
}

/// Executes one batched read of named telemetry points against a device.
///
/// The returned values are aligned to the request order, one per request.
/// Failure is whole-batch: a link never returns partial results. Timeout and
/// retry policy belong to the implementation; callers treat any error as
/// "this round trip produced nothing new".
#[trait_variant::make(Send)]
pub trait TelemetryLink {
	async fn fetch(&self, requests: &[TelemetryRequest]) -> anyhow::Result<Vec<TelemetryValue>>;
}

#[cfg(test)]
mod tests {
	use super::TelemetryValue;

	#[test]
	fn test_integer_tokens() {
		assert_eq!(TelemetryValue::parse("42"), TelemetryValue::Integer(42));
		assert_eq!(TelemetryValue::parse("-7"), TelemetryValue::Integer(-7));
		assert_eq!(TelemetryValue::parse("0"), TelemetryValue::Integer(0));
	}

	#[test]
	fn test_decimal_tokens() {
		assert_eq!(TelemetryValue::parse("30.5"), TelemetryValue::Float(30.5));
		assert_eq!(TelemetryValue::parse("-0.25"), TelemetryValue::Float(-0.25));
	}

	#[test]
	fn test_other_tokens_stay_text() {
		assert_eq!(
			TelemetryValue::parse("Yes"),
			TelemetryValue::Text("Yes".to_owned())
		);
		assert_eq!(
			TelemetryValue::parse("PX2-1486"),
			TelemetryValue::Text("PX2-1486".to_owned())
		);
		assert_eq!(TelemetryValue::parse(""), TelemetryValue::Text(String::new()));
	}

	#[test]
	fn test_numeric_conversions() {
		assert_eq!(TelemetryValue::Integer(230_000).as_f64(), Some(230_000.0));
		assert_eq!(TelemetryValue::Float(99.5).as_i64(), Some(99));
		assert_eq!(TelemetryValue::Text("Yes".to_owned()).as_f64(), None);
	}

	#[test]
	fn test_display() {
		assert_eq!(TelemetryValue::Integer(12).to_string(), "12");
		assert_eq!(TelemetryValue::Text("rack-pdu".to_owned()).to_string(), "rack-pdu");
	}
}
