use binary_helper::global::GlobalDb;
use chrono::{Datelike, Duration, NaiveDate};
use hyper::{Method, StatusCode};
use serde_json::json;
use serial_test::serial;

use crate::api::request::today;
use crate::database::{AvailabilityRule, DailyNote, DateMarking};
use crate::tests::api::{request, send};
use crate::tests::global::database_global;

#[serial]
#[tokio::test]
async fn test_replace_rules() {
	let Some((global, _handler)) = database_global().await else {
		return;
	};
	let db = global.db().as_ref();

	let (status, _, _) = send(
		&global,
		request(
			Method::POST,
			"/v1/availability-rules",
			Some(json!({ "type": "weekly", "day_of_week": 1, "time": "09:00" })),
		),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);

	let (status, _, body) = send(
		&global,
		request(
			Method::PUT,
			"/v1/availability-rules",
			Some(json!([
				{ "type": "weekly", "day_of_week": 2, "time": "10:00", "appointment_limit": 2 },
				{ "type": "specific", "specific_date": "2030-01-02", "day_of_week": 4, "time": "11:30" },
			])),
		),
	)
	.await;
	assert_eq!(status, StatusCode::OK, "{body}");

	let rules = AvailabilityRule::list(db).await.unwrap();
	assert_eq!(rules.len(), 2);
	assert!(rules.iter().all(|r| r.day_of_week != Some(1)));
	assert!(rules.iter().any(|r| r.specific_date.is_some() && r.day_of_week.is_none()));

	// A bad rule leaves the stored ones untouched.
	let (status, _, body) = send(
		&global,
		request(Method::PUT, "/v1/availability-rules", Some(json!([{ "type": "weekly", "time": "10:00" }]))),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "rule 0: day_of_week is required for weekly rules");
	assert_eq!(AvailabilityRule::list(db).await.unwrap().len(), 2);
}

#[serial]
#[tokio::test]
async fn test_day_view() {
	let Some((global, _handler)) = database_global().await else {
		return;
	};

	let day = today() + Duration::days(7);
	let weekday = day.weekday().num_days_from_sunday();

	for body in [
		json!({ "type": "weekly", "day_of_week": weekday, "time": "09:00", "appointment_limit": 1 }),
		json!({ "type": "weekly", "day_of_week": (weekday + 1) % 7, "time": "10:00" }),
	] {
		let (status, _, _) = send(&global, request(Method::POST, "/v1/availability-rules", Some(body))).await;
		assert_eq!(status, StatusCode::CREATED);
	}

	let (status, _, _) = send(
		&global,
		request(
			Method::POST,
			"/v1/appointments",
			Some(json!({ "date": day.to_string(), "time": "09:00", "dog_name": "Rex" })),
		),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);

	let (status, _, _) = send(
		&global,
		request(
			Method::POST,
			"/v1/date-markings",
			Some(json!({ "type": "specific", "marking_date": day.to_string(), "color": "red" })),
		),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);

	let (status, _, body) = send(&global, request(Method::GET, &format!("/v1/days/{day}"), None)).await;
	assert_eq!(status, StatusCode::OK, "{body}");

	let data = &body["data"];
	assert_eq!(data["bookable"], true);
	assert_eq!(data["appointment_count"], 1);
	assert_eq!(data["markings"][0]["color"], "red");
	assert_eq!(data["daily_note"], serde_json::Value::Null);

	let slots = data["slots"].as_array().unwrap();
	let nine = slots.iter().find(|s| s["time"] == "09:00").unwrap();
	assert_eq!(nine["full"], true);
	assert_eq!(nine["available"], false);
	assert!(slots.iter().filter(|s| s["time"] != "09:00").all(|s| s["available"] == false));

	let (status, _, body) = send(&global, request(Method::GET, &format!("/v1/availability?date={day}"), None)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["bookable"], true);
}

#[serial]
#[tokio::test]
async fn test_date_markings() {
	let Some((global, _handler)) = database_global().await else {
		return;
	};
	let db = global.db().as_ref();

	for body in [
		json!({ "type": "holiday", "marking_date": "2024-12-25" }),
		json!({ "type": "specific", "marking_date": "2024-12-25", "color": "blue" }),
		json!({ "type": "weekly", "marking_day_of_week": 0 }),
	] {
		let (status, _, _) = send(&global, request(Method::POST, "/v1/date-markings", Some(body))).await;
		assert_eq!(status, StatusCode::CREATED);
	}

	let (status, _, body) = send(
		&global,
		request(Method::DELETE, "/v1/date-markings", Some(json!({ "date": "2024-12-25" }))),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["deleted"], 2);

	let (status, _, _) = send(
		&global,
		request(Method::DELETE, "/v1/date-markings", Some(json!({ "date": "2024-12-25" }))),
	)
	.await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	let remaining = DateMarking::list(db).await.unwrap();
	assert_eq!(remaining.len(), 1);
	assert_eq!(remaining[0].color, "yellow");

	let (status, _, _) = send(
		&global,
		request(Method::DELETE, &format!("/v1/date-markings/{}", remaining[0].id), None),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert!(DateMarking::list(db).await.unwrap().is_empty());
}

#[serial]
#[tokio::test]
async fn test_daily_note_upsert() {
	let Some((global, _handler)) = database_global().await else {
		return;
	};
	let db = global.db().as_ref();
	let day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();

	let (status, _, body) = send(&global, request(Method::GET, "/v1/daily-notes?date=2024-06-03", None)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, json!({ "success": true, "data": null }));

	for note in ["short staffed", "short staffed, close at 3"] {
		let (status, _, _) = send(
			&global,
			request(
				Method::POST,
				"/v1/daily-notes",
				Some(json!({ "date": "2024-06-03", "note": note })),
			),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
	}

	let note = DailyNote::by_date(db, day).await.unwrap().unwrap();
	assert_eq!(note.daily_note, "short staffed, close at 3");

	let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM grooming.daily_notes")
		.fetch_one(db)
		.await
		.unwrap();
	assert_eq!(count, 1);
}

#[serial]
#[tokio::test]
async fn test_service_history_conflict() {
	let Some((global, _handler)) = database_global().await else {
		return;
	};
	let db = global.db().as_ref();

	let customer = crate::database::Customer::insert(db, Some("Jane"), None).await.unwrap();
	let dog = crate::database::Dog::insert(db, customer.id, "Rex", None, None).await.unwrap();

	let body = json!({ "dog_id": dog.id, "date": "2024-06-03", "services": "wash", "price": "40" });

	let (status, _, _) = send(&global, request(Method::POST, "/v1/service-history", Some(body.clone()))).await;
	assert_eq!(status, StatusCode::CREATED);

	let (status, _, response) = send(&global, request(Method::POST, "/v1/service-history", Some(body))).await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(response["error"], "service history already exists for this dog and date");

	let (status, _, response) = send(
		&global,
		request(
			Method::POST,
			"/v1/service-history",
			Some(json!({ "dog_id": 999999, "date": "2024-06-03", "services": "wash" })),
		),
	)
	.await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(response["error"], "dog not found");

	let (status, _, response) = send(
		&global,
		request(Method::GET, &format!("/v1/service-history?dog_id={}", dog.id), None),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(response["data"][0]["dog_name"], "Rex");
	assert_eq!(response["data"][0]["service_price"], "40");
}
