use common::http::RouteError;
use hyper::StatusCode;

use crate::database::is_unique_violation;
use crate::holidays::HolidayError;
use crate::phone::PhoneError;

pub type Result<T, E = RouteError<ApiError>> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("failed to parse http body: {0}")]
	ParseHttpBody(#[from] hyper::Error),
	#[error("failed to parse json: {0}")]
	ParseJson(#[from] serde_json::Error),
	#[error("holiday lookup failed: {0}")]
	Holiday(#[from] HolidayError),
	#[error("invalid phone: {0}")]
	Phone(#[from] PhoneError),
}

/// Maps a failed write to 409 when it hit a unique constraint and 500
/// otherwise.
#[track_caller]
pub fn write_error(err: sqlx::Error, conflict: &str, failure: &str) -> RouteError<ApiError> {
	if is_unique_violation(&err) {
		(StatusCode::CONFLICT, conflict, err).into()
	} else {
		(StatusCode::INTERNAL_SERVER_ERROR, failure, err).into()
	}
}
