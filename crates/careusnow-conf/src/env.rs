//! Environment variable parsing
//!
//! Variables are read with a prefix (`CAREUSNOW_` by default). A double
//! underscore separates nested keys, so `CAREUSNOW_APPWRITE__API_KEY` sets
//! `appwrite.api_key`.

use serde_json::Value;

/// Prefix applied to every settings variable
pub const DEFAULT_PREFIX: &str = "CAREUSNOW_";

/// Separator between nested key segments
pub const NESTED_SEPARATOR: &str = "__";

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
	#[error("Failed to parse environment variable '{key}' (value length: {value_len}): {error}")]
	ParseError {
		key: String,
		/// Length of the original value; the raw value may be a secret
		value_len: usize,
		error: String,
	},

	#[error("Invalid environment variable name '{name}': {reason}")]
	InvalidVariableName { name: String, reason: String },
}

pub fn validate_env_var_name(name: &str) -> Result<(), EnvError> {
	if name.is_empty() {
		return Err(EnvError::InvalidVariableName {
			name: name.to_string(),
			reason: "environment variable name must not be empty".to_string(),
		});
	}

	if let Some(pos) = name.find(|c: char| c.is_control()) {
		return Err(EnvError::InvalidVariableName {
			name: name.to_string(),
			reason: format!(
				"environment variable name contains control character at position {}",
				pos
			),
		});
	}

	if name.contains('=') {
		return Err(EnvError::InvalidVariableName {
			name: name.to_string(),
			reason: "environment variable name must not contain '='".to_string(),
		});
	}

	Ok(())
}

/// Parse a boolean in the spellings operators tend to use
pub fn parse_bool(value: &str) -> Result<bool, String> {
	match value.trim().to_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Ok(true),
		"false" | "0" | "no" | "off" => Ok(false),
		other => Err(format!("'{}' is not a boolean", other)),
	}
}

/// Split a prefixed variable name into lower-case key segments
///
/// Returns `None` when the name does not carry the prefix.
///
/// # Examples
///
/// ```
/// use careusnow_conf::env::split_key;
///
/// assert_eq!(
/// 	split_key("CAREUSNOW_APPWRITE__API_KEY", "CAREUSNOW_"),
/// 	Some(vec!["appwrite".to_string(), "api_key".to_string()])
/// );
/// assert_eq!(split_key("HOME", "CAREUSNOW_"), None);
/// ```
pub fn split_key(name: &str, prefix: &str) -> Option<Vec<String>> {
	let rest = name.strip_prefix(prefix)?;
	if rest.is_empty() {
		return None;
	}
	Some(
		rest.split(NESTED_SEPARATOR)
			.map(|segment| segment.to_lowercase())
			.collect(),
	)
}

/// Convert a raw variable value to the most specific JSON scalar
///
/// Integers and booleans are recognised; everything else stays a string.
pub fn parse_env_value(value: &str) -> Value {
	let trimmed = value.trim();
	if let Ok(num) = trimmed.parse::<i64>() {
		return Value::Number(num.into());
	}
	if let Ok(b) = parse_bool(trimmed) {
		return Value::Bool(b);
	}
	Value::String(value.to_string())
}

/// Convert a raw variable value to the JSON type of the value it replaces
///
/// Settings loaded from the environment are plain strings. When the key
/// already holds a boolean or a number, the string is parsed into that type so
/// that a numeric API key stays a string and a port stays a number.
pub fn coerce_env_value(key: &str, raw: &str, like: Option<&Value>) -> Result<Value, EnvError> {
	let parse_error = |error: String| EnvError::ParseError {
		key: key.to_string(),
		value_len: raw.len(),
		error,
	};
	match like {
		Some(Value::String(_)) | Some(Value::Null) => Ok(Value::String(raw.to_string())),
		Some(Value::Bool(_)) => parse_bool(raw).map(Value::Bool).map_err(parse_error),
		Some(Value::Number(_)) => {
			let trimmed = raw.trim();
			if let Ok(n) = trimmed.parse::<u64>() {
				Ok(Value::Number(n.into()))
			} else if let Ok(n) = trimmed.parse::<i64>() {
				Ok(Value::Number(n.into()))
			} else {
				trimmed
					.parse::<f64>()
					.ok()
					.and_then(serde_json::Number::from_f64)
					.map(Value::Number)
					.ok_or_else(|| parse_error(format!("'{}' is not a number", trimmed)))
			}
		}
		_ => Ok(parse_env_value(raw)),
	}
}
