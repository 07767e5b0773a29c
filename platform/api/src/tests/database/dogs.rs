use binary_helper::global::GlobalDb;
use chrono::Duration;
use hyper::{Method, StatusCode};
use serde_json::json;
use serial_test::serial;

use crate::api::request::today;
use crate::database::{Appointment, Customer, Dog, NewAppointment, NewService, ServiceHistory};
use crate::tests::api::{request, send};
use crate::tests::global::database_global;

#[serial]
#[tokio::test]
async fn test_create_dog() {
	let Some((global, _handler)) = database_global().await else {
		return;
	};
	let db = global.db().as_ref();

	let customer = Customer::insert(db, Some("Jane"), None).await.unwrap();

	let (status, _, body) = send(
		&global,
		request(Method::POST, "/v1/dogs", Some(json!({ "customer_id": customer.id, "dog_name": "  " }))),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "customer_id and dog_name are required");

	let (status, _, body) = send(
		&global,
		request(
			Method::POST,
			"/v1/dogs",
			Some(json!({ "customer_id": customer.id, "dog_name": "Rex", "dog_breed": "Poodle" })),
		),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED, "{body}");
	assert_eq!(body["data"]["dog_name"], "Rex");
	assert_eq!(body["data"]["dog_breed"], "Poodle");
	assert_eq!(body["data"]["dog_active"], true);

	Customer::soft_delete(db, customer.id).await.unwrap();

	let (status, _, body) = send(
		&global,
		request(Method::POST, "/v1/dogs", Some(json!({ "customer_id": customer.id, "dog_name": "Bella" }))),
	)
	.await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"], "customer not found");
}

#[serial]
#[tokio::test]
async fn test_get_dog() {
	let Some((global, _handler)) = database_global().await else {
		return;
	};
	let db = global.db().as_ref();

	let customer = Customer::insert(db, Some("Jane"), None).await.unwrap();
	let dog = Dog::insert(db, customer.id, "Rex", Some("Poodle"), None).await.unwrap();

	ServiceHistory::insert(
		db,
		dog.id,
		today() - Duration::days(30),
		&NewService {
			service: Some("wash"),
			price: Some("40"),
			..Default::default()
		},
	)
	.await
	.unwrap();

	let booking = |date| NewAppointment {
		dog_id: Some(dog.id),
		date,
		dog_name: "Rex".to_string(),
		..Default::default()
	};
	Appointment::insert(db, &booking(today() - Duration::days(30))).await.unwrap();
	let upcoming = Appointment::insert(db, &booking(today() + Duration::days(7))).await.unwrap();

	let (status, _, body) = send(&global, request(Method::GET, &format!("/v1/dogs/{}", dog.id), None)).await;
	assert_eq!(status, StatusCode::OK, "{body}");
	assert_eq!(body["data"]["dog"]["dog_name"], "Rex");
	assert_eq!(body["data"]["customer_name"], "Jane");
	assert_eq!(body["data"]["service_history"].as_array().unwrap().len(), 1);
	assert_eq!(body["data"]["service_history"][0]["service"], "wash");

	let appointments = body["data"]["upcoming_appointments"].as_array().unwrap();
	assert_eq!(appointments.len(), 1);
	assert_eq!(appointments[0]["id"], upcoming.id);

	Dog::soft_delete(db, dog.id).await.unwrap();

	let (status, _, body) = send(&global, request(Method::GET, &format!("/v1/dogs/{}", dog.id), None)).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"], "dog not found");
}

#[serial]
#[tokio::test]
async fn test_update_dog() {
	let Some((global, _handler)) = database_global().await else {
		return;
	};
	let db = global.db().as_ref();

	let customer = Customer::insert(db, Some("Jane"), None).await.unwrap();
	let dog = Dog::insert(db, customer.id, "Rex", Some("Poodle"), Some("shy")).await.unwrap();
	let uri = format!("/v1/dogs/{}", dog.id);

	let (status, _, body) = send(&global, request(Method::PUT, &uri, Some(json!({ "dog_breed": "Spoodle" })))).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "dog_name is required");

	// Blank fields keep the stored values.
	let (status, _, body) = send(
		&global,
		request(Method::PUT, &uri, Some(json!({ "dog_name": "Rexy", "dog_breed": "", "dog_note": "calm now" }))),
	)
	.await;
	assert_eq!(status, StatusCode::OK, "{body}");
	assert_eq!(body["data"]["dog_name"], "Rexy");
	assert_eq!(body["data"]["dog_breed"], "Poodle");
	assert_eq!(body["data"]["dog_note"], "calm now");

	let stored = Dog::by_id(db, dog.id).await.unwrap().unwrap();
	assert_eq!(stored.dog_name, "Rexy");
	assert_eq!(stored.dog_breed.as_deref(), Some("Poodle"));

	let (status, _, _) = send(
		&global,
		request(Method::PUT, "/v1/dogs/999999", Some(json!({ "dog_name": "Ghost" }))),
	)
	.await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}
