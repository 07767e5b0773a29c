use std::ffi::OsString;

use common::config::{DatabaseConfig, LoggingConfig};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Config;

/// Settings every service shares, with the service specific sections
/// flattened in through `extra`.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default, bound(deserialize = "T: ConfigExtention", serialize = "T: ConfigExtention"))]
pub struct AppConfig<T: ConfigExtention> {
	/// The name of the application
	pub name: String,

	/// The path to the config file
	pub config_file: Option<String>,

	/// The logging configuration
	pub logging: LoggingConfig,

	/// The database configuration
	pub database: DatabaseConfig,

	#[serde(flatten)]
	pub extra: T,
}

pub trait ConfigExtention: Serialize + DeserializeOwned + Default {
	const APP_NAME: &'static str;

	/// Prefix of the environment variables that override this config.
	const ENV_PREFIX: &'static str;

	fn config_default() -> AppConfig<Self> {
		AppConfig {
			name: Self::APP_NAME.to_owned(),
			config_file: Some("config".to_owned()),
			logging: Default::default(),
			database: Default::default(),
			extra: Self::default(),
		}
	}

	fn pre_hook(_config: &mut AppConfig<Self>) -> anyhow::Result<()> {
		Ok(())
	}
}

impl<T: ConfigExtention> AppConfig<T> {
	/// Parses the config with `args` in place of the process arguments.
	pub fn parse_args<I, A>(args: I) -> anyhow::Result<Self>
	where
		I: IntoIterator<Item = A>,
		A: Into<OsString> + Clone,
	{
		let (mut config, config_file) =
			common::config::parse_args::<Self, _, _>(T::ENV_PREFIX, args, Self::default().config_file)?;

		config.config_file = config_file;

		Ok(config)
	}
}

impl<T: ConfigExtention> Default for AppConfig<T> {
	fn default() -> Self {
		T::config_default()
	}
}

impl<T: ConfigExtention> Config for AppConfig<T> {
	fn logging(&self) -> &LoggingConfig {
		&self.logging
	}

	fn parse() -> anyhow::Result<Self>
	where
		Self: Sized,
	{
		let (mut config, config_file) = common::config::parse::<Self>(T::ENV_PREFIX, Self::default().config_file)?;

		config.config_file = config_file;

		Ok(config)
	}

	fn name(&self) -> &str {
		&self.name
	}

	fn pre_hook(&mut self) -> anyhow::Result<()> {
		T::pre_hook(self)
	}
}
