use std::collections::HashMap;

use common::http::ext::*;
use hyper::{Body, Request, Response, StatusCode};
use itertools::Itertools;
use serde_json::json;

use crate::api::error::{write_error, Result};
use crate::api::request::{bad_request, id_param, invalid_phone, json_body, non_empty, query_params, today, Page};
use crate::api::response::{created, message, ok};
use crate::database::{normalize_primary, Appointment, Customer, CustomerPhone, Dog, ServiceHistory};
use crate::global::ApiGlobal;
use crate::phone::PhoneInput;

const SEARCH_MIN_CHARS: usize = 2;
const SEARCH_LIMIT: i64 = 20;
const RECENT_SERVICES: i64 = 3;

#[derive(serde::Serialize)]
struct CustomerSummary {
	#[serde(flatten)]
	customer: Customer,
	phones: Vec<CustomerPhone>,
	dogs: Vec<Dog>,
	total_dogs: usize,
	active_dogs: usize,
}

#[derive(serde::Serialize)]
struct Pagination {
	page: i64,
	limit: i64,
	total_customers: i64,
	total_dogs_across_customers: i64,
	total_pages: i64,
}

/// Search text shorter than two characters is ignored.
fn search_term(params: &HashMap<String, String>) -> Option<&str> {
	params
		.get("search")
		.map(|s| s.trim())
		.filter(|s| s.chars().count() >= SEARCH_MIN_CHARS)
}

pub async fn list<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let params = query_params(&req);

	let search = search_term(&params);
	let page = Page::from_params(&params)?;

	let db = global.db().as_ref();

	let customers = Customer::page(db, search, page.limit, page.offset())
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch customers"))?;

	let counts = Customer::counts(db, search)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to count customers"))?;

	let ids = customers.iter().map(|c| c.id).collect_vec();

	let mut phones = CustomerPhone::by_customers(db, &ids)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch phones"))?
		.into_iter()
		.into_group_map_by(|p| p.customer_id);

	let mut dogs = Dog::by_customers(db, &ids)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch dogs"))?
		.into_iter()
		.into_group_map_by(|d| d.customer_id);

	let customers = customers
		.into_iter()
		.map(|customer| {
			let dogs = dogs.remove(&customer.id).unwrap_or_default();

			CustomerSummary {
				phones: phones.remove(&customer.id).unwrap_or_default(),
				total_dogs: dogs.len(),
				active_dogs: dogs.iter().filter(|d| d.dog_active).count(),
				dogs,
				customer,
			}
		})
		.collect_vec();

	Ok(ok(json!({
		"customers": customers,
		"pagination": Pagination {
			page: page.page,
			limit: page.limit,
			total_customers: counts.total_customers,
			total_dogs_across_customers: counts.total_dogs,
			total_pages: page.total_pages(counts.total_customers),
		},
	})))
}

#[derive(serde::Serialize)]
struct SearchDog {
	#[serde(flatten)]
	dog: Dog,
	previous_service: Option<String>,
	previous_price: Option<String>,
	service_history: Vec<ServiceHistory>,
}

#[derive(serde::Serialize)]
struct SearchResult {
	#[serde(flatten)]
	customer: Customer,
	phones: Vec<String>,
	dogs: Vec<SearchDog>,
}

/// Quick lookup for the booking form.
pub async fn search<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let params = query_params(&req);

	let term = search_term(&params).map_err_route((
		StatusCode::BAD_REQUEST,
		"search term must be at least 2 characters",
	))?;

	let db = global.db().as_ref();

	let customers = Customer::search(db, term, SEARCH_LIMIT)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to search customers"))?;

	let ids = customers.iter().map(|c| c.id).collect_vec();

	let mut phones = CustomerPhone::by_customers(db, &ids)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch phones"))?
		.into_iter()
		.into_group_map_by(|p| p.customer_id);

	let dogs = Dog::by_customers(db, &ids)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch dogs"))?
		.into_iter()
		.filter(|d| d.dog_active)
		.collect_vec();

	let dog_ids = dogs.iter().map(|d| d.id).collect_vec();

	let mut history = ServiceHistory::by_dogs(db, &dog_ids)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch service history"))?
		.into_iter()
		.into_group_map_by(|s| s.dog_id);

	let mut dogs = dogs
		.into_iter()
		.map(|dog| {
			let service_history = history.remove(&dog.id).unwrap_or_default();
			let latest = service_history.first();

			SearchDog {
				previous_service: latest.and_then(|s| s.service.clone()),
				previous_price: latest.and_then(|s| s.service_price.clone()),
				service_history,
				dog,
			}
		})
		.into_group_map_by(|d| d.dog.customer_id);

	let results = customers
		.into_iter()
		.map(|customer| SearchResult {
			phones: phones
				.remove(&customer.id)
				.unwrap_or_default()
				.into_iter()
				.map(|p| p.phone)
				.collect(),
			dogs: dogs.remove(&customer.id).unwrap_or_default(),
			customer,
		})
		.collect_vec();

	Ok(ok(results))
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct DogInput {
	dog_name: Option<String>,
	dog_breed: Option<String>,
	dog_note: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct CreateCustomer {
	customer_name: Option<String>,
	customer_note: Option<String>,
	phones: Vec<PhoneInput>,
	dogs: Vec<DogInput>,
}

#[derive(serde::Serialize)]
struct CustomerRecord {
	#[serde(flatten)]
	customer: Customer,
	phones: Vec<CustomerPhone>,
	dogs: Vec<Dog>,
}

pub async fn create<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let body: CreateCustomer = json_body(req).await?;

	let name = non_empty(body.customer_name).map_err_route((StatusCode::BAD_REQUEST, "customer_name is required"))?;
	let note = non_empty(body.customer_note);

	let mut phones = body
		.phones
		.into_iter()
		.map(PhoneInput::validate)
		.collect::<Result<Vec<_>, _>>()
		.map_err(invalid_phone)?;
	normalize_primary(&mut phones);

	let dogs = body
		.dogs
		.into_iter()
		.map(|dog| {
			Some((
				non_empty(dog.dog_name)?,
				non_empty(dog.dog_breed),
				non_empty(dog.dog_note),
			))
		})
		.collect::<Option<Vec<_>>>()
		.ok_or_else(|| bad_request("dog_name is required for every dog"))?;

	let mut tx = global
		.db()
		.begin()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to start transaction"))?;

	let customer = Customer::insert(&mut *tx, Some(name.as_str()), note.as_deref())
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to create customer"))?;

	let mut saved_phones = Vec::with_capacity(phones.len());
	for phone in &phones {
		saved_phones.push(
			CustomerPhone::insert(&mut *tx, customer.id, phone)
				.await
				.map_err(|err| write_error(err, "only one phone can be primary", "failed to save phone"))?,
		);
	}

	let mut saved_dogs = Vec::with_capacity(dogs.len());
	for (dog_name, breed, note) in &dogs {
		saved_dogs.push(
			Dog::insert(&mut *tx, customer.id, dog_name, breed.as_deref(), note.as_deref())
				.await
				.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to save dog"))?,
		);
	}

	tx.commit()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to commit transaction"))?;

	tracing::info!(customer_id = customer.id, phones = saved_phones.len(), dogs = saved_dogs.len(), "customer created");

	Ok(created(CustomerRecord {
		customer,
		phones: saved_phones,
		dogs: saved_dogs,
	}))
}

#[derive(serde::Serialize)]
struct CustomerDog {
	#[serde(flatten)]
	dog: Dog,
	recent_services: Vec<ServiceHistory>,
	upcoming_appointments: Vec<Appointment>,
}

pub async fn get<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let id = id_param(&req)?;

	let db = global.db().as_ref();

	let customer = Customer::active_by_id(db, id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch customer"))?
		.map_err_route((StatusCode::NOT_FOUND, "customer not found"))?;

	let phones = CustomerPhone::by_customer(db, id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch phones"))?;

	let dogs = Dog::active_by_customer(db, id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch dogs"))?;

	let dog_ids = dogs.iter().map(|d| d.id).collect_vec();

	let mut recent = ServiceHistory::recent_by_dogs(db, &dog_ids, RECENT_SERVICES)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch service history"))?
		.into_iter()
		.into_group_map_by(|s| s.dog_id);

	let mut upcoming = Appointment::upcoming_by_dogs(db, &dog_ids, today())
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch appointments"))?
		.into_iter()
		.filter_map(|a| Some((a.dog_id?, a)))
		.into_group_map();

	let dogs = dogs
		.into_iter()
		.map(|dog| CustomerDog {
			recent_services: recent.remove(&dog.id).unwrap_or_default(),
			upcoming_appointments: upcoming.remove(&dog.id).unwrap_or_default(),
			dog,
		})
		.collect_vec();

	Ok(ok(json!({
		"customer": customer,
		"phones": phones,
		"dogs": dogs,
	})))
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UpdateCustomer {
	customer_name: Option<String>,
	customer_note: Option<String>,
	/// Replaces every phone of the customer when present.
	phones: Option<Vec<PhoneInput>>,
}

pub async fn update<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let id = id_param(&req)?;
	let body: UpdateCustomer = json_body(req).await?;

	let name = non_empty(body.customer_name);
	let note = non_empty(body.customer_note);

	let phones = match body.phones {
		Some(phones) => {
			let mut phones = phones
				.into_iter()
				.map(PhoneInput::validate)
				.collect::<Result<Vec<_>, _>>()
				.map_err(invalid_phone)?;
			normalize_primary(&mut phones);
			Some(phones)
		}
		None => None,
	};

	let mut tx = global
		.db()
		.begin()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to start transaction"))?;

	let Some(customer) = Customer::update(&mut *tx, id, name.as_deref(), note.as_deref())
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to update customer"))?
	else {
		tx.rollback()
			.await
			.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to rollback transaction"))?;
		return Err((StatusCode::NOT_FOUND, "customer not found").into());
	};

	if let Some(phones) = &phones {
		CustomerPhone::delete_by_customer(&mut *tx, id)
			.await
			.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to replace phones"))?;

		for phone in phones {
			CustomerPhone::insert(&mut *tx, id, phone)
				.await
				.map_err(|err| write_error(err, "only one phone can be primary", "failed to save phone"))?;
		}
	}

	let phones = CustomerPhone::by_customer(&mut *tx, id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch phones"))?;

	tx.commit()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to commit transaction"))?;

	Ok(ok(json!({
		"customer": customer,
		"phones": phones,
	})))
}

pub async fn delete<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let id = id_param(&req)?;

	let deleted = Customer::soft_delete(global.db().as_ref(), id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to delete customer"))?;

	if !deleted {
		return Err((StatusCode::NOT_FOUND, "customer not found").into());
	}

	tracing::info!(customer_id = id, "customer deactivated");

	Ok(message("customer deleted"))
}
