use std::{env, fs::File, io::BufReader, path::PathBuf, time::Duration};

use anyhow::Context;
use serde::Deserialize;

use crate::time::DisplayZone;

pub const CONFIG_PATH_VAR: &str = "SUNSET_TAB_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeolocationMode {
	Ip,
	#[serde(rename = "none")]
	Disabled,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub store_path: PathBuf,
	/// IANA zone name; the system zone is used when absent.
	pub timezone: Option<String>,
	pub sunset_api_url: String,
	pub geocoder_url: String,
	pub geolocation: GeolocationMode,
	pub geolocation_url: String,
	pub user_agent: String,
	pub request_timeout_secs: u64,
	pub error_revert_ms: u64,
	pub empty_input_revert_ms: u64,
}

impl Default for Settings {
	fn default() -> Self {
		Settings {
			store_path: PathBuf::from("sunset-tab.yaml"),
			timezone: None,
			sunset_api_url: String::from("https://api.sunrise-sunset.org/json"),
			geocoder_url: String::from("https://nominatim.openstreetmap.org"),
			geolocation: GeolocationMode::Ip,
			geolocation_url: String::from("http://ip-api.com/json"),
			user_agent: format!("sunset-tab/{}", env!("CARGO_PKG_VERSION")),
			request_timeout_secs: 10,
			error_revert_ms: 2000,
			empty_input_revert_ms: 1500,
		}
	}
}

impl Settings {
	/// Reads the YAML file named by `SUNSET_TAB_CONFIG`, or falls back to defaults.
	pub fn load() -> anyhow::Result<Self> {
		match env::var(CONFIG_PATH_VAR) {
			Ok(path) => Self::from_file(&path),
			Err(_) => Ok(Settings::default()),
		}
	}

	pub fn from_file(path: &str) -> anyhow::Result<Self> {
		let file = File::open(path)
			.context(format!("Unable to open settings file at {path}"))?;
		let reader = BufReader::new(file);
		let settings: Settings = serde_yaml::from_reader(reader)
			.context("Unable to parse settings yaml file.")?;
		Ok(settings)
	}

	pub fn display_zone(&self) -> anyhow::Result<DisplayZone> {
		DisplayZone::parse(self.timezone.as_deref())
			.context("Invalid timezone in settings")
	}

	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.request_timeout_secs)
	}

	pub fn error_revert(&self) -> Duration {
		Duration::from_millis(self.error_revert_ms)
	}

	pub fn empty_input_revert(&self) -> Duration {
		Duration::from_millis(self.empty_input_revert_ms)
	}
}
