use binary_helper::global::GlobalDb;
use chrono::{NaiveDate, NaiveTime};
use hyper::{Method, StatusCode};
use serde_json::json;
use serial_test::serial;

use crate::database::{
	Appointment, AppointmentStatus, Customer, CustomerPhone, Dog, NewAppointment, NewPhone, NewService, ServiceHistory,
};
use crate::tests::api::{request, send};
use crate::tests::global::database_global;

fn date() -> NaiveDate {
	NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

fn booking(dog_id: Option<i64>) -> NewAppointment {
	NewAppointment {
		dog_id,
		date: date(),
		time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
		dog_name: "Rex".to_string(),
		today_services: Some("full groom".to_string()),
		today_price: Some("85".to_string()),
		..Default::default()
	}
}

#[serial]
#[tokio::test]
async fn test_pickup_cascade() {
	let Some((global, _handler)) = database_global().await else {
		return;
	};
	let db = global.db().as_ref();

	let customer = Customer::insert(db, Some("Jane"), Some("old note")).await.unwrap();
	let dog = Dog::insert(db, customer.id, "Rex", None, None).await.unwrap();
	let appointment = Appointment::insert(db, &booking(Some(dog.id))).await.unwrap();

	let (status, _, body) = send(
		&global,
		request(
			Method::PUT,
			&format!("/v1/appointments/{}", appointment.id),
			Some(json!({ "status": "P", "customer_note": "bites when nervous", "today_note": "nails done" })),
		),
	)
	.await;

	assert_eq!(status, StatusCode::OK, "{body}");
	assert_eq!(body["data"]["appointment_status"], "P");
	assert_eq!(body["data"]["appointment_active"], false);
	assert_eq!(body["data"]["customer_note_synced"], true);
	assert_eq!(body["data"]["service_history"]["service"], "full groom");

	let customer = Customer::by_id(db, customer.id).await.unwrap().unwrap();
	assert_eq!(customer.customer_note.as_deref(), Some("bites when nervous"));

	let history = ServiceHistory::by_dog_and_date(db, dog.id, date()).await.unwrap();
	assert_eq!(history.len(), 1);
	assert_eq!(history[0].service_price.as_deref(), Some("85"));
	assert_eq!(history[0].service_note.as_deref(), Some("nails done"));

	// Picking up again rewrites the same entry.
	let (status, _, body) = send(
		&global,
		request(
			Method::PUT,
			&format!("/v1/appointments/{}", appointment.id),
			Some(json!({ "status": "P", "today_price": "90" })),
		),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["customer_note_synced"], false);

	let history = ServiceHistory::by_dog_and_date(db, dog.id, date()).await.unwrap();
	assert_eq!(history.len(), 1);
	assert_eq!(history[0].service_price.as_deref(), Some("90"));
}

#[serial]
#[tokio::test]
async fn test_edit_after_pickup_keeps_history() {
	let Some((global, _handler)) = database_global().await else {
		return;
	};
	let db = global.db().as_ref();

	let customer = Customer::insert(db, Some("Jane"), None).await.unwrap();
	let dog = Dog::insert(db, customer.id, "Rex", None, None).await.unwrap();
	let appointment = Appointment::insert(db, &booking(Some(dog.id))).await.unwrap();
	let uri = format!("/v1/appointments/{}", appointment.id);

	let (status, _, _) = send(
		&global,
		request(Method::PUT, &uri, Some(json!({ "status": "P", "customer_note": "old note" }))),
	)
	.await;
	assert_eq!(status, StatusCode::OK);

	let (status, _, _) = send(
		&global,
		request(
			Method::PUT,
			&format!("/v1/customers/{}", customer.id),
			Some(json!({ "customer_note": "new note" })),
		),
	)
	.await;
	assert_eq!(status, StatusCode::OK);

	// Moving a finished visit must not touch the owner or the history.
	let moved = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();
	let (status, _, body) = send(&global, request(Method::PUT, &uri, Some(json!({ "date": "2024-06-04" })))).await;
	assert_eq!(status, StatusCode::OK, "{body}");
	assert_eq!(body["data"]["appointment_status"], "P");
	assert_eq!(body["data"]["service_history"], serde_json::Value::Null);
	assert_eq!(body["data"]["customer_note_synced"], false);

	let customer = Customer::by_id(db, customer.id).await.unwrap().unwrap();
	assert_eq!(customer.customer_note.as_deref(), Some("new note"));

	assert_eq!(ServiceHistory::by_dog_and_date(db, dog.id, date()).await.unwrap().len(), 1);
	assert!(ServiceHistory::by_dog_and_date(db, dog.id, moved).await.unwrap().is_empty());
}

#[serial]
#[tokio::test]
async fn test_pickup_replaces_existing_history() {
	let Some((global, _handler)) = database_global().await else {
		return;
	};
	let db = global.db().as_ref();

	let customer = Customer::insert(db, Some("Jane"), None).await.unwrap();
	let dog = Dog::insert(db, customer.id, "Rex", None, None).await.unwrap();
	ServiceHistory::insert(
		db,
		dog.id,
		date(),
		&NewService {
			service: Some("wash"),
			..Default::default()
		},
	)
	.await
	.unwrap();

	let appointment = Appointment::insert(
		db,
		&NewAppointment {
			status: AppointmentStatus::Finished,
			..booking(Some(dog.id))
		},
	)
	.await
	.unwrap();

	let (status, _, _) = send(
		&global,
		request(
			Method::PUT,
			&format!("/v1/appointments/{}", appointment.id),
			Some(json!({ "status": "P" })),
		),
	)
	.await;
	assert_eq!(status, StatusCode::OK);

	let history = ServiceHistory::by_dog_and_date(db, dog.id, date()).await.unwrap();
	assert_eq!(history.len(), 1);
	assert_eq!(history[0].service.as_deref(), Some("full groom"));

	// The owner's note is left alone when the appointment has none.
	assert_eq!(Customer::by_id(db, customer.id).await.unwrap().unwrap().customer_note, None);
}

#[serial]
#[tokio::test]
async fn test_pickup_without_dog() {
	let Some((global, _handler)) = database_global().await else {
		return;
	};
	let db = global.db().as_ref();

	let appointment = Appointment::insert(db, &booking(None)).await.unwrap();

	let (status, _, body) = send(
		&global,
		request(
			Method::PUT,
			&format!("/v1/appointments/{}", appointment.id),
			Some(json!({ "status": "P" })),
		),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["appointment_active"], false);
	assert_eq!(body["data"]["service_history"], serde_json::Value::Null);
}

#[serial]
#[tokio::test]
async fn test_update_validation() {
	let Some((global, _handler)) = database_global().await else {
		return;
	};
	let db = global.db().as_ref();

	let appointment = Appointment::insert(db, &booking(None)).await.unwrap();
	let uri = format!("/v1/appointments/{}", appointment.id);

	let (status, _, body) = send(&global, request(Method::PUT, &uri, Some(json!({ "status": "done" })))).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "status must be one of no-status, C, F, FN, P, x");

	let (status, _, _) = send(&global, request(Method::PUT, &uri, Some(json!({ "phone": "123" })))).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let (status, _, body) = send(&global, request(Method::PUT, "/v1/appointments/999999", Some(json!({})))).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"], "appointment not found");

	// Empty values keep what is stored.
	let (status, _, body) = send(
		&global,
		request(Method::PUT, &uri, Some(json!({ "dog_name": "", "time": "10:30", "status": "C" }))),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["appointment_dog_name"], "Rex");
	assert_eq!(body["data"]["appointment_time"], "10:30");
	assert_eq!(body["data"]["appointment_active"], true);
}

#[serial]
#[tokio::test]
async fn test_create_from_quick_entry() {
	let Some((global, _handler)) = database_global().await else {
		return;
	};

	let (status, _, body) = send(
		&global,
		request(
			Method::POST,
			"/v1/appointments",
			Some(json!({
				"date": "2024-06-03",
				"time": "09:00",
				"quick_details": "Rex - Jane Smith 0412345678",
			})),
		),
	)
	.await;

	assert_eq!(status, StatusCode::CREATED, "{body}");
	assert_eq!(body["data"]["appointment_dog_name"], "Rex");
	assert_eq!(body["data"]["appointment_customer_name"], "Jane Smith");
	assert_eq!(body["data"]["appointment_status"], "no-status");

	let (status, _, body) = send(
		&global,
		request(
			Method::POST,
			"/v1/appointments",
			Some(json!({ "date": "2024-06-03", "time": "09:00", "quick_details": "Rex 0412" })),
		),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "phone number must have 8 or 10 digits, got 4");

	let (status, _, body) = send(&global, request(Method::GET, "/v1/appointments?date=2024-06-03", None)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[serial]
#[tokio::test]
async fn test_create_for_known_dog() {
	let Some((global, _handler)) = database_global().await else {
		return;
	};
	let db = global.db().as_ref();

	let customer = Customer::insert(db, Some("Jane Smith"), None).await.unwrap();
	let dog = Dog::insert(db, customer.id, "Rex", Some("Poodle"), None).await.unwrap();
	for (phone, is_primary) in [("98765432", false), ("0412345678", true)] {
		CustomerPhone::insert(
			db,
			customer.id,
			&NewPhone {
				phone: phone.to_string(),
				is_primary,
				..Default::default()
			},
		)
		.await
		.unwrap();
	}

	let (status, _, body) = send(
		&global,
		request(
			Method::POST,
			"/v1/appointments",
			Some(json!({ "date": "2024-06-03", "time": "09:00", "dog_id": dog.id })),
		),
	)
	.await;

	assert_eq!(status, StatusCode::CREATED, "{body}");
	assert_eq!(body["data"]["dog_id"], dog.id);
	assert_eq!(body["data"]["appointment_dog_name"], "Rex");
	assert_eq!(body["data"]["appointment_customer_name"], "Jane Smith");
	assert_eq!(body["data"]["appointment_phone"], "0412345678");
	assert_eq!(body["data"]["appointment_dog_breed"], "Poodle");

	// Values from the form win over the stored ones.
	let (status, _, body) = send(
		&global,
		request(
			Method::POST,
			"/v1/appointments",
			Some(json!({ "date": "2024-06-03", "time": "10:00", "dog_id": dog.id, "phone": "1111 2222" })),
		),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED, "{body}");
	assert_eq!(body["data"]["appointment_phone"], "11112222");

	Dog::soft_delete(db, dog.id).await.unwrap();

	let (status, _, body) = send(
		&global,
		request(
			Method::POST,
			"/v1/appointments",
			Some(json!({ "date": "2024-06-03", "time": "11:00", "dog_id": dog.id })),
		),
	)
	.await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"], "dog not found");
}
