use chrono::Datelike;
use common::http::ext::*;
use hyper::{Body, Request, Response, StatusCode};
use serde_json::json;

use crate::api::error::Result;
use crate::api::request::{query_params, today};
use crate::api::response::ok;
use crate::config::HolidayConfig;
use crate::global::ApiGlobal;
use crate::holidays::fetch_public_holidays;

const YEARS: std::ops::RangeInclusive<i32> = 1900..=2200;

pub async fn list<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;

	let year = match query_params(&req).get("year").map(|y| y.trim()).filter(|y| !y.is_empty()) {
		Some(year) => year
			.parse::<i32>()
			.ok()
			.filter(|year| YEARS.contains(year))
			.map_err_route((StatusCode::BAD_REQUEST, "year must be a number between 1900 and 2200"))?,
		None => today().year(),
	};

	let holidays = fetch_public_holidays(&global, year)
		.await
		.map_err_route((StatusCode::BAD_GATEWAY, "failed to fetch public holidays"))?;

	let config = global.config::<HolidayConfig>();

	Ok(ok(json!({
		"year": year,
		"country_code": config.country_code,
		"subdivision": config.subdivision,
		"holidays": holidays,
	})))
}
