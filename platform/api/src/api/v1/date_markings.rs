use common::http::ext::*;
use hyper::{Body, Request, Response, StatusCode};
use serde_json::json;

use crate::api::error::Result;
use crate::api::request::{bad_request, id_param, json_body, parse_date};
use crate::api::response::{created, message, ok};
use crate::availability::MarkingInput;
use crate::database::DateMarking;
use crate::global::ApiGlobal;

pub async fn list<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;

	let markings = DateMarking::list(global.db().as_ref())
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch date markings"))?;

	Ok(ok(markings))
}

pub async fn create<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let marking = json_body::<MarkingInput>(req).await?.validate().map_err(bad_request)?;

	let marking = DateMarking::insert(global.db().as_ref(), &marking)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to create date marking"))?;

	Ok(created(marking))
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct DeleteByDate {
	date: Option<String>,
}

pub async fn delete_by_date<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let body: DeleteByDate = json_body(req).await?;

	let date = body.date.map_err_route((StatusCode::BAD_REQUEST, "date is required"))?;
	let date = parse_date(&date, "date")?;

	let deleted = DateMarking::delete_by_date(global.db().as_ref(), date)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to delete date markings"))?;

	if deleted == 0 {
		return Err((StatusCode::NOT_FOUND, "no date markings on that date").into());
	}

	Ok(ok(json!({ "date": date, "deleted": deleted })))
}

pub async fn delete<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let id = id_param(&req)?;

	let deleted = DateMarking::delete(global.db().as_ref(), id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to delete date marking"))?;

	if !deleted {
		return Err((StatusCode::NOT_FOUND, "date marking not found").into());
	}

	Ok(message("date marking deleted"))
}
