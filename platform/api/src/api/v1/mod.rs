use std::sync::Arc;

use common::http::RouteError;
use hyper::Body;
use routerify::Router;

use super::error::ApiError;
use crate::global::ApiGlobal;

mod appointments;
mod availability;
mod customers;
mod daily_notes;
mod date_markings;
mod days;
mod dogs;
mod health;
mod holidays;
mod phones;
mod service_history;

pub fn routes<G: ApiGlobal>(_: &Arc<G>) -> Router<Body, RouteError<ApiError>> {
	Router::builder()
		.get("/health", health::get::<G>)
		// `search` has to be registered before the `:id` routes
		.get("/customers/search", customers::search::<G>)
		.get("/customers", customers::list::<G>)
		.post("/customers", customers::create::<G>)
		.get("/customers/:id", customers::get::<G>)
		.put("/customers/:id", customers::update::<G>)
		.delete("/customers/:id", customers::delete::<G>)
		.get("/dogs", dogs::list::<G>)
		.post("/dogs", dogs::create::<G>)
		.get("/dogs/:id", dogs::get::<G>)
		.put("/dogs/:id", dogs::update::<G>)
		.delete("/dogs/:id", dogs::delete::<G>)
		.post("/phones", phones::create::<G>)
		.put("/phones/:id", phones::update::<G>)
		.delete("/phones/:id", phones::delete::<G>)
		.get("/appointments", appointments::list::<G>)
		.post("/appointments", appointments::create::<G>)
		.get("/appointments/:id", appointments::get::<G>)
		.put("/appointments/:id", appointments::update::<G>)
		.delete("/appointments/:id", appointments::delete::<G>)
		.get("/availability", availability::day::<G>)
		.get("/availability-rules", availability::list_rules::<G>)
		.post("/availability-rules", availability::create_rule::<G>)
		.put("/availability-rules", availability::replace_rules::<G>)
		.delete("/availability-rules/:id", availability::delete_rule::<G>)
		.get("/date-markings", date_markings::list::<G>)
		.post("/date-markings", date_markings::create::<G>)
		.delete("/date-markings", date_markings::delete_by_date::<G>)
		.delete("/date-markings/:id", date_markings::delete::<G>)
		.get("/daily-notes", daily_notes::get::<G>)
		.post("/daily-notes", daily_notes::upsert::<G>)
		.get("/service-history", service_history::list::<G>)
		.post("/service-history", service_history::create::<G>)
		.get("/holidays", holidays::list::<G>)
		.get("/days/:date", days::get::<G>)
		.build()
		.expect("failed to build router")
}
