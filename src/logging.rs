use crate::error::{AppError, AppResult};
use careusnow_conf::{LogFormat, Settings};
use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, else the configured level
pub fn env_filter(settings: &Settings) -> AppResult<EnvFilter> {
	if let Ok(filter) = EnvFilter::try_from_default_env() {
		return Ok(filter);
	}
	EnvFilter::try_new(&settings.log_level)
		.map_err(|e| AppError::Logging(format!("invalid log level {:?}: {}", settings.log_level, e)))
}

/// Install the global subscriber
///
/// Logs go to stderr in the configured format.
pub fn init_tracing(settings: &Settings) -> AppResult<()> {
	let filter = env_filter(settings)?;
	let builder = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr);

	let result = match settings.log_format {
		LogFormat::Pretty => builder.pretty().try_init(),
		LogFormat::Compact => builder.compact().try_init(),
		LogFormat::Json => builder.json().try_init(),
	};
	result.map_err(|e| AppError::Logging(format!("failed to install subscriber: {}", e)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serial_test::serial;

	#[rstest]
	#[serial]
	fn test_invalid_level_is_rejected() {
		// SAFETY: serialized with the other tests touching RUST_LOG
		unsafe { std::env::remove_var("RUST_LOG") };
		let settings = Settings {
			log_level: "info,=[".to_string(),
			..Settings::default()
		};

		let result = env_filter(&settings);

		assert!(matches!(result, Err(AppError::Logging(_))));
	}

	#[rstest]
	#[serial]
	fn test_configured_level_is_used() {
		// SAFETY: serialized with the other tests touching RUST_LOG
		unsafe { std::env::remove_var("RUST_LOG") };
		let settings = Settings {
			log_level: "careusnow=debug".to_string(),
			..Settings::default()
		};

		let filter = env_filter(&settings).unwrap();

		assert_eq!(filter.to_string(), "careusnow=debug");
	}
}
