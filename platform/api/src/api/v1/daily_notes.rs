use common::http::ext::*;
use hyper::{Body, Request, Response, StatusCode};

use crate::api::error::Result;
use crate::api::request::{json_body, non_empty, parse_date, query_params, required_date};
use crate::api::response::ok;
use crate::database::DailyNote;
use crate::global::ApiGlobal;

pub async fn get<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let date = required_date(&query_params(&req), "date")?;

	let note = DailyNote::by_date(global.db().as_ref(), date)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch daily note"))?;

	Ok(ok(note))
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SaveNote {
	date: Option<String>,
	note: Option<String>,
}

pub async fn upsert<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let body: SaveNote = json_body(req).await?;

	let (Some(date), Some(note)) = (non_empty(body.date), non_empty(body.note)) else {
		return Err((StatusCode::BAD_REQUEST, "date and note are required").into());
	};
	let date = parse_date(&date, "date")?;

	let note = DailyNote::upsert(global.db().as_ref(), date, &note)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to save daily note"))?;

	Ok(ok(note))
}
