use common::http::ext::*;
use hyper::{Body, Request, Response, StatusCode};
use routerify::ext::RequestExt;
use serde_json::json;

use crate::api::error::Result;
use crate::api::request::{parse_date, today};
use crate::api::response::ok;
use crate::availability::{date_is_bookable, day_slots, marking_applies, time_slots, weekday_index};
use crate::config::ScheduleConfig;
use crate::database::{Appointment, AvailabilityRule, DailyNote, DateMarking};
use crate::global::ApiGlobal;

/// Everything the calendar shows for one day.
pub async fn get<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let date = parse_date(req.param("date").map(String::as_str).unwrap_or_default(), "date")?;

	let db = global.db().as_ref();

	let rules = AvailabilityRule::enabled(db)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch availability rules"))?;

	let bookings = Appointment::bookings(db, date)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch bookings"))?;

	let markings = DateMarking::list(db)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch date markings"))?
		.into_iter()
		.filter(|m| marking_applies(m, date))
		.collect::<Vec<_>>();

	let daily_note = DailyNote::by_date(db, date)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch daily note"))?;

	let grid = time_slots(global.config::<ScheduleConfig>());

	Ok(ok(json!({
		"date": date,
		"day_of_week": weekday_index(date),
		"bookable": date_is_bookable(&rules, date, today()),
		"markings": markings,
		"daily_note": daily_note,
		"slots": day_slots(&rules, &bookings, date, &grid),
		"appointment_count": bookings.iter().map(|b| b.booked).sum::<i64>(),
	})))
}
