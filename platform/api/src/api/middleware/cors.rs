use std::sync::Arc;
use std::time::Duration;

use common::http::RouteError;
use hyper::header::{self, HeaderValue};
use hyper::Body;
use routerify::Middleware;

use crate::api::error::ApiError;
use crate::config::ApiConfig;
use crate::global::ApiGlobal;

pub fn cors_middleware<G: ApiGlobal>(global: &Arc<G>) -> Middleware<Body, RouteError<ApiError>> {
	let origin = HeaderValue::from_str(&global.config::<ApiConfig>().allowed_origin)
		.unwrap_or_else(|_| HeaderValue::from_static("*"));

	Middleware::post(move |mut resp| {
		let origin = origin.clone();
		async move {
			let headers = resp.headers_mut();
			headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
			headers.insert(
				header::ACCESS_CONTROL_ALLOW_METHODS,
				HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
			);
			headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"));
			headers.insert(
				header::ACCESS_CONTROL_MAX_AGE,
				HeaderValue::from(Duration::from_secs(86400).as_secs()),
			);

			Ok(resp)
		}
	})
}
