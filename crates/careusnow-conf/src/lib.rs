//! Settings for the CareUsNow intake server
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `CAREUSNOW_*` environment variables.
//!
//! ```no_run
//! use careusnow_conf::Settings;
//!
//! let settings = Settings::load(None).expect("settings");
//! settings.validate().expect("valid settings");
//! println!("listening on {}", settings.bind_address);
//! ```

pub mod env;
pub mod settings;
pub mod sources;

pub use env::EnvError;
pub use settings::{
	AppwriteSettings, LogFormat, SecretString, Settings, SettingsBuilder, SettingsError,
	SettingsResult,
};
pub use sources::{ConfigSource, EnvSource, SourceError, TomlFileSource};
