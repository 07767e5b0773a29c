use common::http::ext::*;
use hyper::{Body, Request, Response, StatusCode};

use crate::api::error::{write_error, Result};
use crate::api::request::{id_param, invalid_phone, json_body, non_empty};
use crate::api::response::{created, message, ok};
use crate::database::{Customer, CustomerPhone};
use crate::global::ApiGlobal;
use crate::phone::{self, PhoneInput};

const PRIMARY_CONFLICT: &str = "another phone of this customer is already primary";

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct CreatePhone {
	customer_id: Option<i64>,
	#[serde(flatten)]
	phone: PhoneInput,
}

pub async fn create<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let body: CreatePhone = json_body(req).await?;

	let customer_id = body
		.customer_id
		.map_err_route((StatusCode::BAD_REQUEST, "customer_id and phone are required"))?;
	if body.phone.phone.trim().is_empty() {
		return Err((StatusCode::BAD_REQUEST, "customer_id and phone are required").into());
	}

	let phone = body.phone.validate().map_err(invalid_phone)?;

	let mut tx = global
		.db()
		.begin()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to start transaction"))?;

	if Customer::active_by_id(&mut *tx, customer_id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch customer"))?
		.is_none()
	{
		tx.rollback()
			.await
			.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to rollback transaction"))?;
		return Err((StatusCode::NOT_FOUND, "customer not found").into());
	}

	if phone.is_primary {
		CustomerPhone::clear_primary(&mut *tx, customer_id, None)
			.await
			.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to update primary phone"))?;
	}

	let phone = CustomerPhone::insert(&mut *tx, customer_id, &phone)
		.await
		.map_err(|err| write_error(err, PRIMARY_CONFLICT, "failed to save phone"))?;

	tx.commit()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to commit transaction"))?;

	Ok(created(phone))
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UpdatePhone {
	phone_owner: Option<String>,
	phone: Option<String>,
	phone_type: Option<String>,
	is_primary: Option<bool>,
}

pub async fn update<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let id = id_param(&req)?;
	let body: UpdatePhone = json_body(req).await?;

	let number = phone::validate_optional(body.phone.as_deref()).map_err(invalid_phone)?;
	let owner = non_empty(body.phone_owner);
	let phone_type = non_empty(body.phone_type);

	let mut tx = global
		.db()
		.begin()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to start transaction"))?;

	let Some(existing) = CustomerPhone::by_id(&mut *tx, id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch phone"))?
	else {
		tx.rollback()
			.await
			.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to rollback transaction"))?;
		return Err((StatusCode::NOT_FOUND, "phone not found").into());
	};

	if body.is_primary == Some(true) {
		CustomerPhone::clear_primary(&mut *tx, existing.customer_id, Some(id))
			.await
			.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to update primary phone"))?;
	}

	let phone = CustomerPhone::update(
		&mut *tx,
		id,
		owner.as_deref(),
		number.as_deref(),
		phone_type.as_deref(),
		body.is_primary,
	)
	.await
	.map_err(|err| write_error(err, PRIMARY_CONFLICT, "failed to update phone"))?
	.map_err_route((StatusCode::NOT_FOUND, "phone not found"))?;

	tx.commit()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to commit transaction"))?;

	Ok(ok(phone))
}

pub async fn delete<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let id = id_param(&req)?;

	let deleted = CustomerPhone::delete(global.db().as_ref(), id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to delete phone"))?;

	if !deleted {
		return Err((StatusCode::NOT_FOUND, "phone not found").into());
	}

	Ok(message("phone deleted"))
}
