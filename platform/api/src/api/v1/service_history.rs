use common::http::ext::*;
use hyper::{Body, Request, Response, StatusCode};

use crate::api::error::{write_error, Result};
use crate::api::request::{json_body, non_empty, optional_id, parse_date, query_params};
use crate::api::response::{created, ok};
use crate::database::{Dog, NewService, ServiceHistory};
use crate::global::ApiGlobal;

pub async fn list<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let dog_id = optional_id(&query_params(&req), "dog_id")?;

	let history = ServiceHistory::list(global.db().as_ref(), dog_id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch service history"))?;

	Ok(ok(history))
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct CreateService {
	dog_id: Option<i64>,
	date: Option<String>,
	services: Option<String>,
	price: Option<String>,
	note: Option<String>,
}

pub async fn create<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let body: CreateService = json_body(req).await?;

	let (Some(dog_id), Some(date), Some(services)) = (body.dog_id, non_empty(body.date), non_empty(body.services)) else {
		return Err((StatusCode::BAD_REQUEST, "dog_id, date and services are required").into());
	};
	let date = parse_date(&date, "date")?;

	let db = global.db().as_ref();

	Dog::by_id(db, dog_id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch dog"))?
		.map_err_route((StatusCode::NOT_FOUND, "dog not found"))?;

	let price = non_empty(body.price);
	let note = non_empty(body.note);

	let entry = ServiceHistory::insert(
		db,
		dog_id,
		date,
		&NewService {
			service: Some(&services),
			price: price.as_deref(),
			note: note.as_deref(),
		},
	)
	.await
	.map_err(|err| {
		write_error(
			err,
			"service history already exists for this dog and date",
			"failed to save service history",
		)
	})?;

	Ok(created(entry))
}
