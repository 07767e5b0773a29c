use std::collections::HashMap;

use chrono::NaiveDate;
use common::http::RouteError;
use hyper::{Body, Request, StatusCode};
use routerify::ext::RequestExt;
use serde::de::DeserializeOwned;

use super::error::{ApiError, Result};
use crate::phone::PhoneError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn id_param(req: &Request<Body>) -> Result<i64> {
	req.param("id")
		.and_then(|id| id.parse().ok())
		.filter(|id: &i64| *id > 0)
		.ok_or_else(|| (StatusCode::BAD_REQUEST, "invalid id").into())
}

pub fn query_params(req: &Request<Body>) -> HashMap<String, String> {
	req.uri()
		.query()
		.map(|query| url::form_urlencoded::parse(query.as_bytes()).into_owned().collect())
		.unwrap_or_default()
}

pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate> {
	NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
		.map_err(|_| (StatusCode::BAD_REQUEST, format!("{field} must be a date formatted as YYYY-MM-DD")).into())
}

/// A required `YYYY-MM-DD` query parameter.
pub fn required_date(params: &HashMap<String, String>, field: &str) -> Result<NaiveDate> {
	match params.get(field).map(|v| v.trim()).filter(|v| !v.is_empty()) {
		Some(value) => parse_date(value, field),
		None => Err((StatusCode::BAD_REQUEST, format!("{field} is required")).into()),
	}
}

pub fn optional_id(params: &HashMap<String, String>, field: &str) -> Result<Option<i64>> {
	match params.get(field).map(|v| v.trim()).filter(|v| !v.is_empty()) {
		Some(value) => value
			.parse()
			.map(Some)
			.map_err(|_| (StatusCode::BAD_REQUEST, format!("{field} must be a number")).into()),
		None => Ok(None),
	}
}

/// Reads the whole body as json. An empty body is rejected.
pub async fn json_body<T: DeserializeOwned>(req: Request<Body>) -> Result<T> {
	let body = hyper::body::to_bytes(req.into_body())
		.await
		.map_err(|err| RouteError::from((StatusCode::BAD_REQUEST, "failed to read request body", err)))?;

	if body.iter().all(u8::is_ascii_whitespace) {
		return Err((StatusCode::BAD_REQUEST, "request body is required").into());
	}

	serde_json::from_slice(&body)
		.map_err(|err: serde_json::Error| (StatusCode::BAD_REQUEST, format!("invalid request body: {err}"), err).into())
}

/// Trims the value and treats blank text as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
	value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
	pub page: i64,
	pub limit: i64,
}

impl Page {
	pub const DEFAULT_LIMIT: i64 = 20;
	pub const MAX_LIMIT: i64 = 100;

	/// `page` starts at 1, `limit` is clamped to `1..=MAX_LIMIT`.
	pub fn from_params(params: &HashMap<String, String>) -> Result<Self> {
		let number = |field: &str, default: i64| -> Result<i64> {
			match params.get(field).map(|v| v.trim()).filter(|v| !v.is_empty()) {
				Some(value) => value
					.parse::<i64>()
					.map_err(|_| bad_request(format!("{field} must be a number"))),
				None => Ok(default),
			}
		};

		let page = Self {
			page: number("page", 1)?.max(1),
			limit: number("limit", Self::DEFAULT_LIMIT)?.clamp(1, Self::MAX_LIMIT),
		};

		if (page.page - 1).checked_mul(page.limit).is_none() {
			return Err(bad_request("page is out of range"));
		}

		Ok(page)
	}

	pub fn offset(&self) -> i64 {
		(self.page - 1).saturating_mul(self.limit)
	}

	pub fn total_pages(&self, total: i64) -> i64 {
		(total + self.limit - 1) / self.limit
	}
}

pub fn today() -> NaiveDate {
	chrono::Local::now().date_naive()
}

#[track_caller]
pub(crate) fn bad_request(message: impl AsRef<str>) -> RouteError<ApiError> {
	(StatusCode::BAD_REQUEST, message).into()
}

#[track_caller]
pub(crate) fn invalid_phone(err: PhoneError) -> RouteError<ApiError> {
	(StatusCode::BAD_REQUEST, err.to_string(), err).into()
}
