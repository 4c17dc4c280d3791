use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnmpError {
	#[error("no object named {module}::{object} in the MIB table")]
	UnknownObject { module: String, object: String },

	#[error("malformed object identifier for {module}::{object}")]
	InvalidOid { module: String, object: String },

	#[error("request to {target} failed: {detail}")]
	Request { target: String, detail: String },

	#[error("empty response from {target}")]
	EmptyResponse { target: String },

	#[error("unsupported value type in response from {target}")]
	UnsupportedType { target: String },
}
