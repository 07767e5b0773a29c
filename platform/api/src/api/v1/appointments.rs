use chrono::{NaiveDate, NaiveTime};
use common::http::ext::*;
use hyper::{Body, Request, Response, StatusCode};
use itertools::Itertools;
use serde_json::json;

use crate::api::error::Result;
use crate::api::request::{bad_request, id_param, invalid_phone, json_body, non_empty, parse_date, query_params, required_date};
use crate::api::response::{created, message, ok};
use crate::database::{
	time_format, Appointment, AppointmentChanges, AppointmentListing, AppointmentStatus, Customer, CustomerPhone, Dog,
	NewAppointment, ServiceHistory,
};
use crate::global::ApiGlobal;
use crate::pickup::{complete_pickup, PickupOutcome};
use crate::{phone, quick_entry};

#[derive(serde::Serialize)]
struct AppointmentView {
	#[serde(flatten)]
	listing: AppointmentListing,
	customer_phones: Vec<String>,
	previous_service: Option<String>,
	previous_price: Option<String>,
	service_history: Vec<ServiceHistory>,
}

pub async fn list<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let date = required_date(&query_params(&req), "date")?;

	let db = global.db().as_ref();

	let appointments = Appointment::by_date(db, date)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch appointments"))?;

	let dog_ids = appointments
		.iter()
		.filter_map(|a| a.appointment.dog_id)
		.unique()
		.collect_vec();
	let customer_ids = appointments.iter().filter_map(|a| a.customer_id).unique().collect_vec();

	let history = ServiceHistory::by_dogs(db, &dog_ids)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch service history"))?
		.into_iter()
		.into_group_map_by(|s| s.dog_id);

	let phones = CustomerPhone::by_customers(db, &customer_ids)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch phones"))?
		.into_iter()
		.into_group_map_by(|p| p.customer_id);

	let appointments = appointments
		.into_iter()
		.map(|listing| {
			let service_history = listing
				.appointment
				.dog_id
				.and_then(|id| history.get(&id))
				.cloned()
				.unwrap_or_default();

			// History is newest first, the previous visit is the first one
			// before this appointment.
			let previous = service_history
				.iter()
				.find(|s| s.service_date < listing.appointment.appointment_date);

			AppointmentView {
				customer_phones: listing
					.customer_id
					.and_then(|id| phones.get(&id))
					.map(|phones| phones.iter().map(|p| p.phone.clone()).collect())
					.unwrap_or_default(),
				previous_service: previous.and_then(|s| s.service.clone()),
				previous_price: previous.and_then(|s| s.service_price.clone()),
				service_history,
				listing,
			}
		})
		.collect_vec();

	Ok(ok(appointments))
}

/// Fields shared by the create and update bodies. Dates, times and statuses
/// arrive as text so a bad value gets a precise error.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct AppointmentInput {
	date: Option<String>,
	time: Option<String>,
	dog_id: Option<i64>,
	dog_name: Option<String>,
	customer_name: Option<String>,
	phone: Option<String>,
	breed: Option<String>,
	quick_details: Option<String>,
	customer_note: Option<String>,
	today_note: Option<String>,
	today_services: Option<String>,
	today_price: Option<String>,
	status: Option<String>,
}

fn parse_time(value: Option<String>) -> Result<Option<NaiveTime>> {
	match non_empty(value) {
		Some(value) => time_format::parse(&value)
			.map(Some)
			.ok_or_else(|| bad_request("time must be formatted as HH:MM")),
		None => Ok(None),
	}
}

fn parse_optional_date(value: Option<String>) -> Result<Option<NaiveDate>> {
	non_empty(value).map(|value| parse_date(&value, "date")).transpose()
}

fn parse_status(value: Option<String>) -> Result<Option<AppointmentStatus>> {
	match non_empty(value) {
		Some(value) => value.parse().map(Some).map_err(|_| {
			bad_request(format!(
				"status must be one of {}",
				AppointmentStatus::ALL.iter().map(AppointmentStatus::as_str).join(", ")
			))
		}),
		None => Ok(None),
	}
}

pub async fn create<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let body: AppointmentInput = json_body(req).await?;

	let date = parse_optional_date(body.date)?;
	let time = parse_time(body.time)?;
	let status = parse_status(body.status)?.unwrap_or_default();

	let quick_details = non_empty(body.quick_details);
	let quick = quick_details.as_deref().map(quick_entry::parse);

	let mut dog_name = non_empty(body.dog_name).or_else(|| {
		quick
			.as_ref()
			.map(|q| q.dog_name.clone())
			.filter(|n| !n.is_empty())
	});
	let mut customer_name = non_empty(body.customer_name).or_else(|| quick.as_ref().and_then(|q| q.customer_name.clone()));
	let mut phone = non_empty(body.phone).or_else(|| quick.as_ref().and_then(|q| q.phone.clone()));
	let mut breed = non_empty(body.breed);

	let db = global.db().as_ref();

	// A booking for a known dog fills whatever the form left out.
	if let Some(dog_id) = body.dog_id {
		let dog = Dog::active_by_id(db, dog_id)
			.await
			.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch dog"))?
			.map_err_route((StatusCode::NOT_FOUND, "dog not found"))?;

		if customer_name.is_none() {
			customer_name = Customer::by_id(db, dog.customer_id)
				.await
				.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch customer"))?
				.and_then(|c| c.customer_name);
		}

		if phone.is_none() {
			phone = CustomerPhone::by_customer(db, dog.customer_id)
				.await
				.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch phones"))?
				.into_iter()
				.next()
				.map(|p| p.phone);
		}

		breed = breed.or(dog.dog_breed);
		dog_name = dog_name.or(Some(dog.dog_name));
	}

	let (Some(date), Some(time), Some(dog_name)) = (date, time, dog_name) else {
		return Err((StatusCode::BAD_REQUEST, "date, time and dog name are required").into());
	};

	let phone = phone::validate_optional(phone.as_deref()).map_err(invalid_phone)?;

	let appointment = Appointment::insert(
		db,
		&NewAppointment {
			dog_id: body.dog_id,
			date,
			time,
			dog_name,
			customer_name,
			phone,
			dog_breed: breed,
			quick_details,
			today_services: non_empty(body.today_services),
			today_price: non_empty(body.today_price),
			today_note: non_empty(body.today_note),
			customer_note: non_empty(body.customer_note),
			status,
		},
	)
	.await
	.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to create appointment"))?;

	tracing::info!(appointment_id = appointment.id, date = %date, "appointment booked");

	Ok(created(appointment))
}

pub async fn get<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let id = id_param(&req)?;

	let db = global.db().as_ref();

	let appointment = Appointment::by_id(db, id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch appointment"))?
		.map_err_route((StatusCode::NOT_FOUND, "appointment not found"))?;

	let dog = match appointment.dog_id {
		Some(dog_id) => Dog::by_id(db, dog_id)
			.await
			.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch dog"))?,
		None => None,
	};

	let (customer, phones, service_history) = match &dog {
		Some(dog) => (
			Customer::by_id(db, dog.customer_id)
				.await
				.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch customer"))?,
			CustomerPhone::by_customer(db, dog.customer_id)
				.await
				.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch phones"))?,
			ServiceHistory::by_dogs(db, &[dog.id])
				.await
				.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch service history"))?,
		),
		None => (None, Vec::new(), Vec::new()),
	};

	Ok(ok(json!({
		"appointment": appointment,
		"dog": dog,
		"customer": customer,
		"phones": phones,
		"service_history": service_history,
	})))
}

pub async fn update<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let id = id_param(&req)?;
	let body: AppointmentInput = json_body(req).await?;

	let mut tx = global
		.db()
		.begin()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to start transaction"))?;

	if Appointment::lock(&mut tx, id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to lock appointment"))?
		.is_none()
	{
		tx.rollback()
			.await
			.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to rollback transaction"))?;
		return Err((StatusCode::NOT_FOUND, "appointment not found").into());
	}

	// Returning early drops the transaction, which rolls it back.
	let changes = AppointmentChanges {
		dog_id: body.dog_id,
		date: parse_optional_date(body.date)?,
		time: parse_time(body.time)?,
		dog_name: non_empty(body.dog_name),
		customer_name: non_empty(body.customer_name),
		phone: phone::validate_optional(body.phone.as_deref()).map_err(invalid_phone)?,
		dog_breed: non_empty(body.breed),
		quick_details: non_empty(body.quick_details),
		today_services: non_empty(body.today_services),
		today_price: non_empty(body.today_price),
		today_note: non_empty(body.today_note),
		customer_note: non_empty(body.customer_note),
		status: parse_status(body.status)?,
	};

	if let Some(dog_id) = changes.dog_id {
		Dog::active_by_id(&mut *tx, dog_id)
			.await
			.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch dog"))?
			.map_err_route((StatusCode::NOT_FOUND, "dog not found"))?;
	}

	let appointment = Appointment::update(&mut *tx, id, &changes)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to update appointment"))?
		.map_err_route((StatusCode::NOT_FOUND, "appointment not found"))?;

	// Only a request that sets the status to P completes the visit.
	let outcome = if changes.status == Some(AppointmentStatus::PickedUp) {
		complete_pickup(&mut tx, appointment)
			.await
			.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to complete pick up"))?
	} else {
		PickupOutcome {
			appointment,
			service_history: None,
			customer_note_synced: false,
		}
	};

	tx.commit()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to commit transaction"))?;

	Ok(ok(outcome))
}

pub async fn delete<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let id = id_param(&req)?;

	let deleted = Appointment::delete(global.db().as_ref(), id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to delete appointment"))?;

	if !deleted {
		return Err((StatusCode::NOT_FOUND, "appointment not found").into());
	}

	Ok(message("appointment deleted"))
}
