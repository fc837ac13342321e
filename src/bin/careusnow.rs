//! CareUsNow server
//!
//! ## Usage
//!
//! ```bash
//! careusnow serve --config careusnow.toml
//! careusnow serve --bind 0.0.0.0:8000
//! careusnow check-config
//! ```

use std::path::PathBuf;

use anyhow::Context;
use careusnow::logging::init_tracing;
use careusnow_conf::Settings;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "careusnow")]
#[command(about = "CareUsNow patient intake server", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Start the HTTP server
	Serve {
		/// TOML settings file (defaults to ./careusnow.toml when present)
		#[arg(short, long, value_name = "PATH", env = "CAREUSNOW_CONFIG")]
		config: Option<PathBuf>,

		/// Address to listen on, overriding the settings
		#[arg(short, long, value_name = "ADDR")]
		bind: Option<String>,
	},

	/// Load and validate the settings, then exit
	CheckConfig {
		#[arg(short, long, value_name = "PATH", env = "CAREUSNOW_CONFIG")]
		config: Option<PathBuf>,
	},
}

fn load_settings(config: Option<&PathBuf>) -> anyhow::Result<Settings> {
	let settings =
		Settings::load(config.map(PathBuf::as_path)).context("failed to load settings")?;
	Ok(settings)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Serve { config, bind } => {
			let mut settings = load_settings(config.as_ref())?;
			if let Some(bind) = bind {
				settings.bind_address = bind;
			}
			settings.validate().context("invalid settings")?;
			init_tracing(&settings)?;
			careusnow::serve(settings).await?;
		}
		Commands::CheckConfig { config } => {
			let settings = load_settings(config.as_ref())?;
			settings.validate().context("invalid settings")?;
			println!(
				"OK: listening on {}, Appwrite endpoint {}",
				settings.bind_address, settings.appwrite.endpoint
			);
		}
	}
	Ok(())
}
