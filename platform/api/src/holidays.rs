use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use crate::config::HolidayConfig;
use crate::global::ApiGlobal;

#[derive(Debug, thiserror::Error)]
pub enum HolidayError {
	#[error("reqwest error: {0}")]
	Reqwest(#[from] reqwest::Error),
	#[error("holiday service answered {0}")]
	Status(reqwest::StatusCode),
}

/// One entry of the Nager.Date `PublicHolidays` response.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicHoliday {
	pub date: NaiveDate,
	pub local_name: String,
	pub name: String,
	pub country_code: String,
	/// Subdivisions the holiday is limited to, `None` when nation wide.
	#[serde(default)]
	pub counties: Option<Vec<String>>,
}

impl PublicHoliday {
	pub fn applies_to(&self, subdivision: Option<&str>) -> bool {
		match (&self.counties, subdivision) {
			(None, _) => true,
			(Some(_), None) => true,
			(Some(counties), Some(subdivision)) => counties.iter().any(|c| c == subdivision),
		}
	}
}

pub fn filter_for_subdivision(holidays: Vec<PublicHoliday>, subdivision: Option<&str>) -> Vec<PublicHoliday> {
	holidays.into_iter().filter(|h| h.applies_to(subdivision)).collect()
}

pub fn build_client(config: &HolidayConfig) -> reqwest::Result<reqwest::Client> {
	reqwest::Client::builder()
		.timeout(Duration::from_secs(config.timeout_secs))
		.build()
}

pub async fn fetch_public_holidays<G: ApiGlobal>(global: &Arc<G>, year: i32) -> Result<Vec<PublicHoliday>, HolidayError> {
	let config = global.config::<HolidayConfig>();

	let url = format!(
		"{}/PublicHolidays/{}/{}",
		config.url.trim_end_matches('/'),
		year,
		config.country_code
	);

	tracing::debug!(%url, "fetching public holidays");

	let res = global.holiday_client().get(url).send().await?;
	if !res.status().is_success() {
		return Err(HolidayError::Status(res.status()));
	}

	let holidays = res.json::<Vec<PublicHoliday>>().await?;

	Ok(filter_for_subdivision(holidays, config.subdivision.as_deref()))
}
