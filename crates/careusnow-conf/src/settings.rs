//! Application settings
//!
//! [`Settings`] is assembled by [`SettingsBuilder`] from layered
//! [`ConfigSource`]s and validated before the server starts.

use crate::env::coerce_env_value;
use crate::sources::{ConfigSource, DefaultSource, EnvSource, SourceError, TomlFileSource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("Source error ({source_name}): {error}")]
	Source {
		source_name: String,
		#[source]
		error: SourceError,
	},

	#[error("Failed to deserialize settings: {0}")]
	Deserialize(#[from] serde_json::Error),

	#[error("Invalid value for '{key}': {message}")]
	InvalidValue { key: String, message: String },

	#[error("Multiple validation errors: {0:?}")]
	Multiple(Vec<SettingsError>),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// String whose value never appears in `Debug` or `Display` output
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	pub fn expose(&self) -> &str {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("SecretString(***)")
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("***")
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Pretty,
	Compact,
	Json,
}

/// Connection to the Appwrite-compatible document service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppwriteSettings {
	/// Base URL including the API version, e.g. `https://cloud.appwrite.io/v1`
	pub endpoint: String,
	pub project_id: String,
	pub api_key: SecretString,
	pub database_id: String,
	pub patient_collection_id: String,
	pub appointment_collection_id: String,
	pub bucket_id: String,
	pub request_timeout_secs: u64,
}

impl Default for AppwriteSettings {
	fn default() -> Self {
		Self {
			endpoint: "https://cloud.appwrite.io/v1".to_string(),
			project_id: String::new(),
			api_key: SecretString::default(),
			database_id: String::new(),
			patient_collection_id: String::new(),
			appointment_collection_id: String::new(),
			bucket_id: String::new(),
			request_timeout_secs: 30,
		}
	}
}

impl AppwriteSettings {
	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.request_timeout_secs)
	}

	fn check(&self, errors: &mut Vec<SettingsError>) {
		let required = [
			("appwrite.endpoint", self.endpoint.as_str()),
			("appwrite.project_id", self.project_id.as_str()),
			("appwrite.api_key", self.api_key.expose()),
			("appwrite.database_id", self.database_id.as_str()),
			("appwrite.patient_collection_id", self.patient_collection_id.as_str()),
			(
				"appwrite.appointment_collection_id",
				self.appointment_collection_id.as_str(),
			),
			("appwrite.bucket_id", self.bucket_id.as_str()),
		];
		for (key, value) in required {
			if value.trim().is_empty() {
				errors.push(SettingsError::InvalidValue {
					key: key.to_string(),
					message: "must not be empty".to_string(),
				});
			}
		}
		if !self.endpoint.is_empty()
			&& !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://"))
		{
			errors.push(SettingsError::InvalidValue {
				key: "appwrite.endpoint".to_string(),
				message: "must be an http or https URL".to_string(),
			});
		}
		if self.request_timeout_secs == 0 {
			errors.push(SettingsError::InvalidValue {
				key: "appwrite.request_timeout_secs".to_string(),
				message: "must be greater than zero".to_string(),
			});
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub bind_address: String,
	pub debug: bool,
	/// Default tracing filter directive, overridden by `RUST_LOG`
	pub log_level: String,
	pub log_format: LogFormat,
	/// Largest accepted request body in bytes
	pub max_upload_size: usize,
	pub shutdown_grace_period_secs: u64,
	pub appwrite: AppwriteSettings,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			bind_address: "127.0.0.1:8000".to_string(),
			debug: false,
			log_level: "info".to_string(),
			log_format: LogFormat::default(),
			max_upload_size: 10 * 1024 * 1024,
			shutdown_grace_period_secs: 30,
			appwrite: AppwriteSettings::default(),
		}
	}
}

impl Settings {
	/// Load defaults, an optional TOML file, then `CAREUSNOW_*` variables
	pub fn load(config_file: Option<&Path>) -> SettingsResult<Self> {
		let mut builder = SettingsBuilder::new();
		if let Some(path) = config_file {
			builder = builder.add_source(TomlFileSource::new(path).required());
		} else {
			builder = builder.add_source(TomlFileSource::new("careusnow.toml"));
		}
		builder.add_source(EnvSource::new()).build()
	}

	pub fn socket_addr(&self) -> SettingsResult<SocketAddr> {
		self.bind_address
			.parse()
			.map_err(|e: std::net::AddrParseError| SettingsError::InvalidValue {
				key: "bind_address".to_string(),
				message: e.to_string(),
			})
	}

	pub fn shutdown_grace_period(&self) -> Duration {
		Duration::from_secs(self.shutdown_grace_period_secs)
	}

	/// Check every setting and report all problems at once
	pub fn validate(&self) -> SettingsResult<()> {
		let mut errors = Vec::new();
		if let Err(e) = self.socket_addr() {
			errors.push(e);
		}
		if self.max_upload_size == 0 {
			errors.push(SettingsError::InvalidValue {
				key: "max_upload_size".to_string(),
				message: "must be greater than zero".to_string(),
			});
		}
		self.appwrite.check(&mut errors);

		match errors.len() {
			0 => Ok(()),
			1 => Err(errors.remove(0)),
			_ => Err(SettingsError::Multiple(errors)),
		}
	}
}

/// Merges sources in priority order into [`Settings`]
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	/// Builder seeded with the built-in defaults
	pub fn new() -> Self {
		Self {
			sources: Vec::new(),
		}
	}

	pub fn add_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	pub fn build(self) -> SettingsResult<Settings> {
		let defaults = DefaultSource::from_serializable(&Settings::default()).map_err(|error| {
			SettingsError::Source {
				source_name: "defaults".to_string(),
				error,
			}
		})?;

		let mut sources = self.sources;
		sources.push(Box::new(defaults));
		sources.sort_by_key(|source| source.priority());

		let mut merged = serde_json::Map::new();
		for source in &sources {
			let source_error = |error| SettingsError::Source {
				source_name: source.description(),
				error,
			};
			let layer = source.load().map_err(source_error)?;
			tracing::debug!(source = %source.description(), keys = layer.len(), "loaded settings source");
			merge_into(&mut merged, layer, source.raw_strings(), "")
				.map_err(|e| source_error(SourceError::Env(e)))?;
		}

		Ok(serde_json::from_value(Value::Object(merged))?)
	}
}

impl Default for SettingsBuilder {
	fn default() -> Self {
		Self::new()
	}
}

fn merge_into(
	target: &mut serde_json::Map<String, Value>,
	layer: impl IntoIterator<Item = (String, Value)>,
	raw_strings: bool,
	path: &str,
) -> Result<(), crate::env::EnvError> {
	for (key, value) in layer {
		let full_key = if path.is_empty() {
			key.clone()
		} else {
			format!("{}.{}", path, key)
		};
		match (target.get_mut(&key), value) {
			(Some(Value::Object(existing)), Value::Object(incoming)) => {
				merge_into(existing, incoming, raw_strings, &full_key)?;
			}
			(existing, Value::String(raw)) if raw_strings => {
				let coerced = coerce_env_value(&full_key, &raw, existing.as_deref())?;
				target.insert(key, coerced);
			}
			(_, value) => {
				target.insert(key, value);
			}
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::io::Write;

	fn configured_env() -> EnvSource {
		EnvSource::from_pairs([
			("CAREUSNOW_APPWRITE__PROJECT_ID", "careusnow"),
			("CAREUSNOW_APPWRITE__API_KEY", "0123456789"),
			("CAREUSNOW_APPWRITE__DATABASE_ID", "db"),
			("CAREUSNOW_APPWRITE__PATIENT_COLLECTION_ID", "patients"),
			("CAREUSNOW_APPWRITE__APPOINTMENT_COLLECTION_ID", "appointments"),
			("CAREUSNOW_APPWRITE__BUCKET_ID", "documents"),
		])
	}

	#[rstest]
	fn test_defaults_only() {
		// Act
		let settings = SettingsBuilder::new().build().unwrap();

		// Assert
		assert_eq!(settings, Settings::default());
		assert_eq!(settings.appwrite.request_timeout(), Duration::from_secs(30));
	}

	#[rstest]
	fn test_env_overrides_file_and_coerces_types() {
		// Arrange
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			"debug = false\nbind_address = \"0.0.0.0:8080\"\n[appwrite]\nrequest_timeout_secs = 10"
		)
		.unwrap();
		let env = EnvSource::from_pairs([
			("CAREUSNOW_DEBUG", "true"),
			("CAREUSNOW_APPWRITE__REQUEST_TIMEOUT_SECS", "5"),
			("CAREUSNOW_APPWRITE__API_KEY", "0123456789"),
		]);

		// Act
		let settings = SettingsBuilder::new()
			.add_source(env)
			.add_source(TomlFileSource::new(file.path()))
			.build()
			.unwrap();

		// Assert
		assert!(settings.debug);
		assert_eq!(settings.bind_address, "0.0.0.0:8080");
		assert_eq!(settings.appwrite.request_timeout_secs, 5);
		assert_eq!(settings.appwrite.api_key.expose(), "0123456789");
		assert_eq!(settings.appwrite.endpoint, "https://cloud.appwrite.io/v1");
	}

	#[rstest]
	fn test_bad_env_number_names_the_key() {
		// Arrange
		let env = EnvSource::from_pairs([("CAREUSNOW_MAX_UPLOAD_SIZE", "lots")]);

		// Act
		let result = SettingsBuilder::new().add_source(env).build();

		// Assert
		let message = result.unwrap_err().to_string();
		assert!(message.contains("max_upload_size"), "{}", message);
	}

	#[rstest]
	fn test_validate_reports_all_missing_credentials() {
		// Act
		let result = Settings::default().validate();

		// Assert
		match result {
			Err(SettingsError::Multiple(errors)) => assert_eq!(errors.len(), 6),
			other => panic!("expected multiple errors, got {:?}", other),
		}
	}

	#[rstest]
	fn test_validate_accepts_complete_settings() {
		let settings = SettingsBuilder::new().add_source(configured_env()).build().unwrap();

		assert!(settings.validate().is_ok());
	}

	#[rstest]
	fn test_validate_rejects_zero_timeout_and_bad_address() {
		// Arrange
		let mut settings = SettingsBuilder::new().add_source(configured_env()).build().unwrap();
		settings.appwrite.request_timeout_secs = 0;
		settings.bind_address = "not an address".to_string();

		// Act
		let result = settings.validate();

		// Assert
		assert!(matches!(result, Err(SettingsError::Multiple(errors)) if errors.len() == 2));
	}

	#[rstest]
	fn test_secret_is_redacted_in_debug_output() {
		let mut settings = Settings::default();
		settings.appwrite.api_key = SecretString::new("super-secret");

		let rendered = format!("{:?}", settings);

		assert!(!rendered.contains("super-secret"));
		assert!(rendered.contains("***"));
	}

	#[rstest]
	fn test_log_format_parses_lowercase() {
		let env = EnvSource::from_pairs([("CAREUSNOW_LOG_FORMAT", "json")]);

		let settings = SettingsBuilder::new().add_source(env).build().unwrap();

		assert_eq!(settings.log_format, LogFormat::Json);
	}
}
