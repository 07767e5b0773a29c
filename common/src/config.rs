use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::{Arg, Command};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::logging;

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct LoggingConfig {
	/// The log level to use, this is a tracing env filter
	pub level: String,

	/// What logging mode we should use
	pub mode: logging::Mode,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			mode: logging::Mode::Default,
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
	/// The database URL to use
	pub uri: String,

	/// Upper bound of pooled connections
	pub max_connections: u32,

	/// How long to wait for a free connection before failing a query
	pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			uri: "postgres://localhost:5432/grooming".to_string(),
			max_connections: 10,
			acquire_timeout_secs: 5,
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read config file {0}: {1}")]
	Io(PathBuf, #[source] std::io::Error),
	#[error("failed to parse toml config: {0}")]
	Toml(#[from] toml::de::Error),
	#[error("failed to parse json config: {0}")]
	Json(#[from] serde_json::Error),
	#[error("unsupported config file format: {0}")]
	UnsupportedFormat(PathBuf),
	#[error("invalid value for {name}: {value}")]
	InvalidEnv { name: String, value: String },
	#[error("invalid value for {name}: {value}")]
	InvalidArg { name: String, value: String },
	#[error(transparent)]
	Cli(#[from] clap::Error),
	#[error("config file not found: {0}")]
	NotFound(String),
}

impl ConfigError {
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound(_))
	}
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

/// Builds a config from, in increasing priority, `C::default()`, a toml or
/// json file, `{PREFIX}_`-prefixed environment variables and the process
/// arguments.
///
/// Exits the process when the arguments cannot be parsed or ask for help.
pub fn parse<C: Serialize + DeserializeOwned + Default>(
	env_prefix: &str,
	config_file: Option<String>,
) -> Result<(C, Option<String>)> {
	match parse_args(env_prefix, std::env::args_os(), config_file) {
		Err(ConfigError::Cli(err)) => err.exit(),
		result => result,
	}
}

/// Like [`parse`] with explicit arguments, the first one being the binary
/// name.
///
/// Every leaf of the default config is a `--section.key` flag, with `_`
/// written as `-`. The file is taken from `--config-file`,
/// `{PREFIX}_CONFIG_FILE` or else `config_file`. A missing file is only an
/// error when it was named on the command line or through the environment.
/// Returns the canonical path of the file that was loaded, if any.
pub fn parse_args<C, I, T>(env_prefix: &str, args: I, config_file: Option<String>) -> Result<(C, Option<String>)>
where
	C: Serialize + DeserializeOwned + Default,
	I: IntoIterator<Item = T>,
	T: Into<OsString> + Clone,
{
	let mut value = serde_json::to_value(C::default())?;

	let mut leaves = Vec::new();
	collect_leaves(&mut Vec::new(), &value, &mut leaves);

	let cli = cli_overrides(env_prefix, &leaves, args)?;

	let cli_file = cli
		.iter()
		.find(|(path, _)| path.len() == 1 && path[0] == "config_file")
		.and_then(|(_, value)| value.as_str().map(str::to_string));
	let env_file = std::env::var(env_key(env_prefix, &["config_file"])).ok();
	let file_provided = cli_file.is_some() || env_file.is_some();

	let mut config_path = None;

	if let Some(path) = cli_file.or(env_file).or(config_file).filter(|p| !p.is_empty()) {
		match read_file(&path) {
			Ok((location, file)) => {
				merge(&mut value, file);
				config_path = Some(location);
			}
			Err(err) => {
				if file_provided || !err.is_not_found() {
					return Err(err);
				}

				tracing::debug!("failed to load config file: {}", err);
			}
		}
	}

	apply_env(env_prefix, &mut Vec::new(), &mut value)?;

	for (path, leaf) in cli {
		set_path(&mut value, &path, leaf);
	}

	let config = serde_json::from_value(value)?;

	Ok((
		config,
		config_path.map(|p: PathBuf| std::fs::canonicalize(&p).unwrap_or(p).display().to_string()),
	))
}

fn read_file(path: &str) -> Result<(PathBuf, Value)> {
	let path = Path::new(path);

	let candidates = if path.extension().is_some() {
		vec![path.to_path_buf()]
	} else {
		vec![path.with_extension("toml"), path.with_extension("json")]
	};

	let Some(location) = candidates.into_iter().find(|p| p.is_file()) else {
		return Err(ConfigError::NotFound(path.display().to_string()));
	};

	let contents = std::fs::read_to_string(&location).map_err(|err| ConfigError::Io(location.clone(), err))?;

	let value = match location.extension().and_then(|e| e.to_str()) {
		Some("toml") => toml::from_str::<Value>(&contents)?,
		Some("json") => serde_json::from_str::<Value>(&contents)?,
		_ => return Err(ConfigError::UnsupportedFormat(location)),
	};

	Ok((location, value))
}

fn merge(base: &mut Value, overlay: Value) {
	match (base, overlay) {
		(Value::Object(base), Value::Object(overlay)) => {
			for (key, value) in overlay {
				match base.get_mut(&key) {
					Some(existing) => merge(existing, value),
					None => {
						base.insert(key, value);
					}
				}
			}
		}
		(base, overlay) => *base = overlay,
	}
}

fn env_key(prefix: &str, path: &[&str]) -> String {
	let mut key = prefix.to_uppercase();
	for segment in path {
		key.push('_');
		key.push_str(&segment.to_uppercase());
	}
	key
}

/// Walks the default value tree and replaces every leaf that has a matching
/// environment variable. The shape of the default decides how the raw string
/// is interpreted.
fn apply_env(prefix: &str, path: &mut Vec<String>, value: &mut Value) -> Result<()> {
	if let Value::Object(map) = value {
		let keys = map.keys().cloned().collect::<Vec<_>>();
		for key in keys {
			path.push(key.clone());
			if let Some(child) = map.get_mut(&key) {
				apply_env(prefix, path, child)?;
			}
			path.pop();
		}

		return Ok(());
	}

	let name = env_key(prefix, &path.iter().map(String::as_str).collect::<Vec<_>>());
	let Ok(raw) = std::env::var(&name) else {
		return Ok(());
	};

	*value = env_value(value, &raw).ok_or(ConfigError::InvalidEnv { name, value: raw })?;

	Ok(())
}

fn env_value(current: &Value, raw: &str) -> Option<Value> {
	Some(match current {
		Value::String(_) => Value::String(raw.to_string()),
		Value::Bool(_) => Value::Bool(raw.parse().ok()?),
		Value::Number(_) => serde_json::from_str::<serde_json::Number>(raw).ok().map(Value::Number)?,
		Value::Array(_) => Value::Array(
			raw.split(',')
				.map(str::trim)
				.filter(|s| !s.is_empty())
				.map(|s| serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.to_string())))
				.collect(),
		),
		// Unset optional leaves are always string valued.
		Value::Null => Value::String(raw.to_string()),
		Value::Object(_) => return None,
	})
}

/// A scalar of the default config tree that can be set from the command line.
struct Leaf {
	path: Vec<String>,
	default: Value,
}

impl Leaf {
	fn id(&self) -> String {
		self.path.join(".")
	}

	fn long(&self) -> String {
		self.path.iter().map(|s| s.replace('_', "-")).collect::<Vec<_>>().join(".")
	}

	fn arg(&self) -> Arg {
		let arg = Arg::new(self.id())
			.long(self.long())
			.required(false)
			.value_parser(clap::value_parser!(String));

		match self.default {
			// `--flag` alone means true.
			Value::Bool(_) => arg.num_args(0..=1).default_missing_value("true"),
			_ => arg.num_args(1),
		}
	}
}

fn collect_leaves(path: &mut Vec<String>, value: &Value, leaves: &mut Vec<Leaf>) {
	match value {
		Value::Object(map) => {
			for (key, child) in map {
				path.push(key.clone());
				collect_leaves(path, child, leaves);
				path.pop();
			}
		}
		_ => leaves.push(Leaf {
			path: path.clone(),
			default: value.clone(),
		}),
	}
}

fn cli_overrides<I, T>(name: &str, leaves: &[Leaf], args: I) -> Result<Vec<(Vec<String>, Value)>>
where
	I: IntoIterator<Item = T>,
	T: Into<OsString> + Clone,
{
	let command = leaves
		.iter()
		.fold(Command::new(name.to_lowercase()), |command, leaf| command.arg(leaf.arg()));

	let matches = command.try_get_matches_from(args)?;

	leaves
		.iter()
		.filter_map(|leaf| {
			let raw = matches.get_one::<String>(&leaf.id())?;
			Some(
				env_value(&leaf.default, raw)
					.map(|value| (leaf.path.clone(), value))
					.ok_or_else(|| ConfigError::InvalidArg {
						name: format!("--{}", leaf.long()),
						value: raw.clone(),
					}),
			)
		})
		.collect()
}

fn set_path(value: &mut Value, path: &[String], leaf: Value) {
	let Some((key, rest)) = path.split_first() else {
		*value = leaf;
		return;
	};

	if !value.is_object() {
		*value = Value::Object(Default::default());
	}

	if let Value::Object(map) = value {
		set_path(map.entry(key.clone()).or_insert(Value::Null), rest, leaf);
	}
}
