//! Configuration sources for layered settings
//!
//! Sources are merged in priority order
//! (environment variables > TOML file > defaults).

use crate::env::{DEFAULT_PREFIX, EnvError, split_key, validate_env_var_name};
use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync {
	/// Load configuration from this source
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError>;

	/// Get the priority of this source (higher = more important)
	fn priority(&self) -> u8;

	/// Get a description of this source
	fn description(&self) -> String;

	/// Whether scalar values are untyped strings to be coerced to the type
	/// of the value they override
	fn raw_strings(&self) -> bool {
		false
	}
}

/// Error type for configuration sources
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Parse error: {0}")]
	Parse(String),

	#[error("Environment error: {0}")]
	Env(#[from] EnvError),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

/// Built-in defaults, lowest priority
pub struct DefaultSource {
	values: IndexMap<String, Value>,
}

impl DefaultSource {
	/// Create a source from a serialisable value whose root is an object
	pub fn from_serializable<T: serde::Serialize>(defaults: &T) -> Result<Self, SourceError> {
		match serde_json::to_value(defaults)? {
			Value::Object(map) => Ok(Self {
				values: map.into_iter().collect(),
			}),
			_ => Err(SourceError::Parse("Expected object at root".to_string())),
		}
	}
}

impl ConfigSource for DefaultSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		Ok(self.values.clone())
	}

	fn priority(&self) -> u8 {
		0
	}

	fn description(&self) -> String {
		"Built-in defaults".to_string()
	}
}

/// TOML file configuration source
///
/// A missing file loads as empty unless the source is marked required.
pub struct TomlFileSource {
	path: PathBuf,
	required: bool,
}

impl TomlFileSource {
	/// Create a new TOML file configuration source
	///
	/// # Examples
	///
	/// ```
	/// use careusnow_conf::sources::{ConfigSource, TomlFileSource};
	///
	/// let source = TomlFileSource::new("careusnow.toml");
	/// assert_eq!(source.priority(), 50);
	/// ```
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: false,
		}
	}

	/// Fail instead of loading nothing when the file is absent
	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		if !self.path.exists() && !self.required {
			return Ok(IndexMap::new());
		}

		let content = fs::read_to_string(&self.path)?;
		let toml_value: toml::Value = toml::from_str(&content)?;

		// Convert TOML value to JSON value
		let json_value = serde_json::to_value(&toml_value)?;
		let map = json_value
			.as_object()
			.ok_or_else(|| SourceError::Parse("Expected object at root".to_string()))?;

		Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

/// Environment variable configuration source
pub struct EnvSource {
	prefix: String,
	vars: Option<Vec<(String, String)>>,
}

impl EnvSource {
	/// Read variables from the process environment with the default prefix
	pub fn new() -> Self {
		Self {
			prefix: DEFAULT_PREFIX.to_string(),
			vars: None,
		}
	}

	/// Read from a fixed set of variables instead of the process environment
	pub fn from_pairs<I, K, V>(vars: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			prefix: DEFAULT_PREFIX.to_string(),
			vars: Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
		}
	}

	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = prefix.into();
		self
	}

	fn vars(&self) -> Vec<(String, String)> {
		match &self.vars {
			Some(vars) => vars.clone(),
			None => std::env::vars().collect(),
		}
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		let mut config = IndexMap::new();

		for (name, value) in self.vars() {
			let Some(segments) = split_key(&name, &self.prefix) else {
				continue;
			};
			validate_env_var_name(&name)?;
			insert_nested(&mut config, &segments, Value::String(value))?;
		}

		Ok(config)
	}

	fn priority(&self) -> u8 {
		100
	}

	fn description(&self) -> String {
		format!("Environment variables (prefix: {})", self.prefix)
	}

	fn raw_strings(&self) -> bool {
		true
	}
}

fn insert_nested(
	config: &mut IndexMap<String, Value>,
	segments: &[String],
	value: Value,
) -> Result<(), SourceError> {
	let (first, rest) = segments
		.split_first()
		.ok_or_else(|| SourceError::Parse("empty settings key".to_string()))?;
	if rest.is_empty() {
		config.insert(first.clone(), value);
		return Ok(());
	}

	let entry = config
		.entry(first.clone())
		.or_insert_with(|| Value::Object(serde_json::Map::new()));
	let mut current = entry;
	for (index, segment) in rest.iter().enumerate() {
		let Value::Object(map) = current else {
			return Err(SourceError::Parse(format!(
				"'{}' is both a value and a table",
				segments[..=index].join(".")
			)));
		};
		if index == rest.len() - 1 {
			map.insert(segment.clone(), value);
			return Ok(());
		}
		current = map
			.entry(segment.clone())
			.or_insert_with(|| Value::Object(serde_json::Map::new()));
	}
	Ok(())
}
