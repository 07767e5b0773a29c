use common::http::ext::*;
use hyper::{Body, Request, Response, StatusCode};
use serde_json::json;

use crate::api::error::Result;
use crate::api::request::{bad_request, id_param, json_body, query_params, required_date, today};
use crate::api::response::{created, message, ok};
use crate::availability::{date_is_bookable, day_slots, time_slots, weekday_index, RuleInput};
use crate::config::ScheduleConfig;
use crate::database::{Appointment, AvailabilityRule};
use crate::global::ApiGlobal;

pub async fn list_rules<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;

	let rules = AvailabilityRule::list(global.db().as_ref())
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch availability rules"))?;

	Ok(ok(rules))
}

pub async fn create_rule<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let rule = json_body::<RuleInput>(req).await?.validate().map_err(bad_request)?;

	let rule = AvailabilityRule::insert(global.db().as_ref(), &rule)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to create availability rule"))?;

	Ok(created(rule))
}

/// Replaces every rule with the ones in the body.
pub async fn replace_rules<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let body: serde_json::Value = json_body(req).await?;

	if !body.is_array() {
		return Err((StatusCode::BAD_REQUEST, "rules must be an array").into());
	}

	let rules = serde_json::from_value::<Vec<RuleInput>>(body)
		.map_err(|err| {
			common::http::RouteError::from((StatusCode::BAD_REQUEST, format!("invalid request body: {err}"), err))
		})?
		.into_iter()
		.enumerate()
		.map(|(idx, rule)| rule.validate().map_err(|err| bad_request(format!("rule {idx}: {err}"))))
		.collect::<Result<Vec<_>>>()?;

	let mut tx = global
		.db()
		.begin()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to start transaction"))?;

	AvailabilityRule::delete_all(&mut *tx)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to clear availability rules"))?;

	let mut saved = Vec::with_capacity(rules.len());
	for rule in &rules {
		saved.push(
			AvailabilityRule::insert(&mut *tx, rule)
				.await
				.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to save availability rule"))?,
		);
	}

	tx.commit()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to commit transaction"))?;

	tracing::info!(rules = saved.len(), "availability rules replaced");

	Ok(ok(saved))
}

pub async fn delete_rule<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let id = id_param(&req)?;

	let deleted = AvailabilityRule::delete(global.db().as_ref(), id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to delete availability rule"))?;

	if !deleted {
		return Err((StatusCode::NOT_FOUND, "availability rule not found").into());
	}

	Ok(message("availability rule deleted"))
}

pub async fn day<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let date = required_date(&query_params(&req), "date")?;

	let db = global.db().as_ref();

	let rules = AvailabilityRule::enabled(db)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch availability rules"))?;

	let bookings = Appointment::bookings(db, date)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch bookings"))?;

	let grid = time_slots(global.config::<ScheduleConfig>());

	Ok(ok(json!({
		"date": date,
		"day_of_week": weekday_index(date),
		"bookable": date_is_bookable(&rules, date, today()),
		"slots": day_slots(&rules, &bookings, date, &grid),
	})))
}
