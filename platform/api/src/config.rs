use std::net::SocketAddr;

use chrono::NaiveTime;

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ExtConfig {
	/// API Config
	pub api: ApiConfig,

	/// Public holiday lookup
	pub holidays: HolidayConfig,

	/// The bookable day grid
	pub schedule: ScheduleConfig,
}

impl binary_helper::config::ConfigExtention for ExtConfig {
	const APP_NAME: &'static str = "grooming-api";
	const ENV_PREFIX: &'static str = "GROOMING";
}

pub type AppConfig = binary_helper::config::AppConfig<ExtConfig>;

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ApiConfig {
	/// Bind address for the API
	pub bind_address: SocketAddr,

	/// Value of the Access-Control-Allow-Origin header
	pub allowed_origin: String,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			bind_address: SocketAddr::from(([0, 0, 0, 0], 4000)),
			allowed_origin: "*".to_string(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct HolidayConfig {
	/// Base url of a Nager.Date compatible api
	pub url: String,

	/// ISO 3166 country code holidays are fetched for
	pub country_code: String,

	/// Only keep regional holidays of this subdivision, nation wide ones are
	/// always kept
	pub subdivision: Option<String>,

	/// Request timeout in seconds
	pub timeout_secs: u64,
}

impl Default for HolidayConfig {
	fn default() -> Self {
		Self {
			url: "https://date.nager.at/api/v3".to_string(),
			country_code: "AU".to_string(),
			subdivision: Some("AU-VIC".to_string()),
			timeout_secs: 10,
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
	/// First bookable time of a day
	#[serde(with = "crate::database::time_format")]
	pub first_slot: NaiveTime,

	/// Last bookable time of a day
	#[serde(with = "crate::database::time_format")]
	pub last_slot: NaiveTime,

	/// Minutes between two slots
	pub slot_minutes: u32,
}

impl Default for ScheduleConfig {
	fn default() -> Self {
		Self {
			first_slot: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
			last_slot: NaiveTime::from_hms_opt(17, 30, 0).unwrap_or_default(),
			slot_minutes: 30,
		}
	}
}
