use binary_helper::global::GlobalDb;
use hyper::{Method, StatusCode};
use serde_json::json;
use serial_test::serial;

use crate::database::{Customer, CustomerPhone, Dog, DogFilter, NewPhone};
use crate::tests::api::{request, send};
use crate::tests::global::database_global;

#[serial]
#[tokio::test]
async fn test_create_customer_with_phones_and_dogs() {
	let Some((global, _handler)) = database_global().await else {
		return;
	};

	let (status, _, body) = send(
		&global,
		request(
			Method::POST,
			"/v1/customers",
			Some(json!({
				"customer_name": "Jane Smith",
				"customer_note": "prefers mornings",
				"phones": [
					{ "phone": "9876 5432", "phone_type": "home" },
					{ "phone": "0412 345 678", "is_primary": true },
					{ "phone": "0498 765 432", "is_primary": true },
				],
				"dogs": [{ "dog_name": "Rex", "dog_breed": "Poodle" }, { "dog_name": "Bella" }],
			})),
		),
	)
	.await;

	assert_eq!(status, StatusCode::CREATED, "{body}");
	let id = body["data"]["id"].as_i64().unwrap();

	let phones = CustomerPhone::by_customer(global.db().as_ref(), id).await.unwrap();
	assert_eq!(phones.len(), 3);
	assert_eq!(phones.iter().filter(|p| p.is_primary).count(), 1);
	assert_eq!(phones[0].phone, "0412345678");

	let (status, _, body) = send(&global, request(Method::GET, &format!("/v1/customers/{id}"), None)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["customer"]["customer_name"], "Jane Smith");
	assert_eq!(body["data"]["dogs"].as_array().unwrap().len(), 2);
}

#[serial]
#[tokio::test]
async fn test_single_primary_phone() {
	let Some((global, _handler)) = database_global().await else {
		return;
	};
	let db = global.db().as_ref();

	let customer = Customer::insert(db, Some("Jane"), None).await.unwrap();
	let phone = |phone: &str, is_primary| NewPhone {
		phone: phone.to_string(),
		is_primary,
		..Default::default()
	};

	let first = CustomerPhone::insert(db, customer.id, &phone("98765432", true)).await.unwrap();

	// The partial unique index rejects a second primary.
	let err = CustomerPhone::insert(db, customer.id, &phone("12345678", true))
		.await
		.unwrap_err();
	assert!(crate::database::is_unique_violation(&err));

	let (status, _, body) = send(
		&global,
		request(
			Method::POST,
			"/v1/phones",
			Some(json!({ "customer_id": customer.id, "phone": "0412345678", "is_primary": true })),
		),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED, "{body}");
	let second = body["data"]["id"].as_i64().unwrap();

	let first = CustomerPhone::by_id(db, first.id).await.unwrap().unwrap();
	assert!(!first.is_primary);

	let (status, _, _) = send(
		&global,
		request(Method::PUT, &format!("/v1/phones/{}", first.id), Some(json!({ "is_primary": true }))),
	)
	.await;
	assert_eq!(status, StatusCode::OK);

	let phones = CustomerPhone::by_customer(db, customer.id).await.unwrap();
	assert_eq!(phones.iter().filter(|p| p.is_primary).map(|p| p.id).collect::<Vec<_>>(), vec![first.id]);
	assert!(phones.iter().any(|p| p.id == second && !p.is_primary));
}

#[serial]
#[tokio::test]
async fn test_soft_delete() {
	let Some((global, _handler)) = database_global().await else {
		return;
	};
	let db = global.db().as_ref();

	let customer = Customer::insert(db, Some("Jane"), None).await.unwrap();
	let dog = Dog::insert(db, customer.id, "Rex", None, None).await.unwrap();

	let (status, _, body) = send(&global, request(Method::DELETE, &format!("/v1/dogs/{}", dog.id), None)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, json!({ "success": true, "message": "dog deleted" }));

	// Soft deleted rows stay in the table.
	let dog = Dog::by_id(db, dog.id).await.unwrap().unwrap();
	assert!(!dog.dog_active);
	assert!(Dog::list(db, &DogFilter::default()).await.unwrap().is_empty());

	let (status, _, _) = send(&global, request(Method::DELETE, &format!("/v1/dogs/{}", dog.id), None)).await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	let (status, _, _) = send(
		&global,
		request(Method::DELETE, &format!("/v1/customers/{}", customer.id), None),
	)
	.await;
	assert_eq!(status, StatusCode::OK);

	assert!(!Customer::by_id(db, customer.id).await.unwrap().unwrap().customer_active);

	let (status, _, _) = send(&global, request(Method::GET, &format!("/v1/customers/{}", customer.id), None)).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[serial]
#[tokio::test]
async fn test_search_and_pagination() {
	let Some((global, _handler)) = database_global().await else {
		return;
	};
	let db = global.db().as_ref();

	for (name, dog, phone) in [
		("Jane Smith", "Rex", "98765432"),
		("John Brown", "Bella", "0412345678"),
		("Ann 100%", "Max", "11112222"),
	] {
		let customer = Customer::insert(db, Some(name), None).await.unwrap();
		Dog::insert(db, customer.id, dog, None, None).await.unwrap();
		CustomerPhone::insert(
			db,
			customer.id,
			&NewPhone {
				phone: phone.to_string(),
				..Default::default()
			},
		)
		.await
		.unwrap();
	}

	assert_eq!(Customer::search(db, "bell", 20).await.unwrap()[0].customer_name.as_deref(), Some("John Brown"));
	assert_eq!(Customer::search(db, "8765", 20).await.unwrap()[0].customer_name.as_deref(), Some("Jane Smith"));
	// `%` is matched literally.
	assert_eq!(Customer::search(db, "0%", 20).await.unwrap().len(), 1);

	let (status, _, body) = send(&global, request(Method::GET, "/v1/customers?limit=2&page=2", None)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["customers"].as_array().unwrap().len(), 1);
	assert_eq!(
		body["data"]["pagination"],
		json!({
			"page": 2,
			"limit": 2,
			"total_customers": 3,
			"total_dogs_across_customers": 3,
			"total_pages": 2,
		})
	);

	let (status, _, body) = send(&global, request(Method::GET, "/v1/customers/search?search=rex", None)).await;
	assert_eq!(status, StatusCode::OK);
	let results = body["data"].as_array().unwrap();
	assert_eq!(results.len(), 1);
	assert_eq!(results[0]["phones"], json!(["98765432"]));
	assert_eq!(results[0]["dogs"][0]["dog_name"], "Rex");
}

#[serial]
#[tokio::test]
async fn test_update_replaces_phones() {
	let Some((global, _handler)) = database_global().await else {
		return;
	};
	let db = global.db().as_ref();

	let customer = Customer::insert(db, Some("Jane"), Some("prefers mornings")).await.unwrap();
	let old = CustomerPhone::insert(
		db,
		customer.id,
		&NewPhone {
			phone: "98765432".to_string(),
			is_primary: true,
			..Default::default()
		},
	)
	.await
	.unwrap();
	let uri = format!("/v1/customers/{}", customer.id);

	let (status, _, body) = send(
		&global,
		request(
			Method::PUT,
			&uri,
			Some(json!({
				"customer_name": "Jane Smith",
				"phones": [
					{ "phone": "1111 2222" },
					{ "phone": "0412 345 678", "is_primary": true },
					{ "phone": "0498 765 432", "is_primary": true },
				],
			})),
		),
	)
	.await;

	assert_eq!(status, StatusCode::OK, "{body}");
	assert_eq!(body["data"]["customer"]["customer_name"], "Jane Smith");
	assert_eq!(body["data"]["customer"]["customer_note"], "prefers mornings");

	let phones = CustomerPhone::by_customer(db, customer.id).await.unwrap();
	assert_eq!(phones.len(), 3);
	assert!(phones.iter().all(|p| p.id != old.id));
	assert_eq!(phones.iter().filter(|p| p.is_primary).count(), 1);
	assert_eq!(phones[0].phone, "0412345678");
	assert!(phones[0].is_primary);

	// Without `phones` the stored ones stay.
	let (status, _, _) = send(&global, request(Method::PUT, &uri, Some(json!({ "customer_note": "afternoons" })))).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(CustomerPhone::by_customer(db, customer.id).await.unwrap().len(), 3);

	let (status, _, body) = send(
		&global,
		request(Method::PUT, &uri, Some(json!({ "phones": [{ "phone": "123" }] }))),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "phone number must have 8 or 10 digits, got 3");
	assert_eq!(CustomerPhone::by_customer(db, customer.id).await.unwrap().len(), 3);

	Customer::soft_delete(db, customer.id).await.unwrap();

	let (status, _, body) = send(&global, request(Method::PUT, &uri, Some(json!({ "customer_name": "Ghost" })))).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"], "customer not found");
}
