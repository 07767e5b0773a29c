use common::http::ext::*;
use hyper::{Body, Request, Response, StatusCode};
use serde_json::json;

use crate::api::error::Result;
use crate::api::request::{id_param, json_body, non_empty, optional_id, query_params, today};
use crate::api::response::{created, message, ok};
use crate::database::{Appointment, Customer, Dog, DogFilter, ServiceHistory};
use crate::global::ApiGlobal;

pub async fn list<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let params = query_params(&req);

	let filter = DogFilter {
		customer_id: optional_id(&params, "customer_id")?,
		search: params.get("search").map(|s| s.trim()).filter(|s| !s.is_empty()),
	};

	let dogs = Dog::list(global.db().as_ref(), &filter)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch dogs"))?;

	Ok(ok(dogs))
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct CreateDog {
	customer_id: Option<i64>,
	dog_name: Option<String>,
	dog_breed: Option<String>,
	dog_note: Option<String>,
}

pub async fn create<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let body: CreateDog = json_body(req).await?;

	let (Some(customer_id), Some(name)) = (body.customer_id, non_empty(body.dog_name)) else {
		return Err((StatusCode::BAD_REQUEST, "customer_id and dog_name are required").into());
	};

	let db = global.db().as_ref();

	Customer::active_by_id(db, customer_id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch customer"))?
		.map_err_route((StatusCode::NOT_FOUND, "customer not found"))?;

	let dog = Dog::insert(
		db,
		customer_id,
		&name,
		non_empty(body.dog_breed).as_deref(),
		non_empty(body.dog_note).as_deref(),
	)
	.await
	.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to create dog"))?;

	Ok(created(dog))
}

pub async fn get<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let id = id_param(&req)?;

	let db = global.db().as_ref();

	let dog = Dog::active_by_id(db, id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch dog"))?
		.map_err_route((StatusCode::NOT_FOUND, "dog not found"))?;

	let customer = Customer::by_id(db, dog.customer_id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch customer"))?;

	let service_history = ServiceHistory::by_dogs(db, &[id])
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch service history"))?;

	let upcoming_appointments = Appointment::upcoming_by_dogs(db, &[id], today())
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch appointments"))?;

	Ok(ok(json!({
		"dog": dog,
		"customer_name": customer.and_then(|c| c.customer_name),
		"service_history": service_history,
		"upcoming_appointments": upcoming_appointments,
	})))
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UpdateDog {
	dog_name: Option<String>,
	dog_breed: Option<String>,
	dog_note: Option<String>,
}

pub async fn update<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let id = id_param(&req)?;
	let body: UpdateDog = json_body(req).await?;

	let name = non_empty(body.dog_name).map_err_route((StatusCode::BAD_REQUEST, "dog_name is required"))?;

	let dog = Dog::update(
		global.db().as_ref(),
		id,
		&name,
		non_empty(body.dog_breed).as_deref(),
		non_empty(body.dog_note).as_deref(),
	)
	.await
	.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to update dog"))?
	.map_err_route((StatusCode::NOT_FOUND, "dog not found"))?;

	Ok(ok(dog))
}

pub async fn delete<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let id = id_param(&req)?;

	let deleted = Dog::soft_delete(global.db().as_ref(), id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to delete dog"))?;

	if !deleted {
		return Err((StatusCode::NOT_FOUND, "dog not found").into());
	}

	Ok(message("dog deleted"))
}
