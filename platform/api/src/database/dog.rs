use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgExecutor;

use super::like_pattern;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, serde::Serialize)]
pub struct Dog {
	pub id: i64,
	pub customer_id: i64,
	pub dog_name: String,
	pub dog_breed: Option<String>,
	pub dog_note: Option<String>,
	/// Cleared instead of deleting the row.
	pub dog_active: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// A dog together with its owner's name and most recent service.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, serde::Serialize)]
pub struct DogListing {
	#[sqlx(flatten)]
	#[serde(flatten)]
	pub dog: Dog,
	pub customer_name: Option<String>,
	pub previous_service: Option<String>,
	pub previous_price: Option<String>,
	pub previous_service_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct DogFilter<'a> {
	pub customer_id: Option<i64>,
	pub search: Option<&'a str>,
}

impl Dog {
	pub async fn insert(
		db: impl PgExecutor<'_>,
		customer_id: i64,
		name: &str,
		breed: Option<&str>,
		note: Option<&str>,
	) -> sqlx::Result<Self> {
		sqlx::query_as(
			"INSERT INTO grooming.dogs (customer_id, dog_name, dog_breed, dog_note) VALUES ($1, $2, $3, $4) RETURNING *",
		)
		.bind(customer_id)
		.bind(name)
		.bind(breed)
		.bind(note)
		.fetch_one(db)
		.await
	}

	pub async fn by_id(db: impl PgExecutor<'_>, id: i64) -> sqlx::Result<Option<Self>> {
		sqlx::query_as("SELECT * FROM grooming.dogs WHERE id = $1")
			.bind(id)
			.fetch_optional(db)
			.await
	}

	pub async fn active_by_id(db: impl PgExecutor<'_>, id: i64) -> sqlx::Result<Option<Self>> {
		sqlx::query_as("SELECT * FROM grooming.dogs WHERE id = $1 AND dog_active")
			.bind(id)
			.fetch_optional(db)
			.await
	}

	/// Every dog of the given customers, inactive ones included.
	pub async fn by_customers(db: impl PgExecutor<'_>, customer_ids: &[i64]) -> sqlx::Result<Vec<Self>> {
		sqlx::query_as("SELECT * FROM grooming.dogs WHERE customer_id = ANY($1) ORDER BY customer_id, dog_name, id")
			.bind(customer_ids)
			.fetch_all(db)
			.await
	}

	pub async fn active_by_customer(db: impl PgExecutor<'_>, customer_id: i64) -> sqlx::Result<Vec<Self>> {
		sqlx::query_as("SELECT * FROM grooming.dogs WHERE customer_id = $1 AND dog_active ORDER BY dog_name, id")
			.bind(customer_id)
			.fetch_all(db)
			.await
	}

	/// Active dogs of active customers.
	pub async fn list(db: impl PgExecutor<'_>, filter: &DogFilter<'_>) -> sqlx::Result<Vec<DogListing>> {
		sqlx::query_as(
			"SELECT d.*, c.customer_name,
				latest.service AS previous_service,
				latest.service_price AS previous_price,
				latest.service_date AS previous_service_date
			FROM grooming.dogs d
			JOIN grooming.customers c ON c.id = d.customer_id
			LEFT JOIN LATERAL (
				SELECT s.service, s.service_price, s.service_date
				FROM grooming.service_history s
				WHERE s.dog_id = d.id
				ORDER BY s.service_date DESC, s.id DESC
				LIMIT 1
			) latest ON TRUE
			WHERE d.dog_active AND c.customer_active
				AND ($1::BIGINT IS NULL OR d.customer_id = $1)
				AND ($2::TEXT IS NULL OR d.dog_name ILIKE $2 OR c.customer_name ILIKE $2)
			ORDER BY d.dog_name, d.id",
		)
		.bind(filter.customer_id)
		.bind(filter.search.map(like_pattern))
		.fetch_all(db)
		.await
	}

	/// `name` always replaces the stored name, the other fields only when set.
	pub async fn update(
		db: impl PgExecutor<'_>,
		id: i64,
		name: &str,
		breed: Option<&str>,
		note: Option<&str>,
	) -> sqlx::Result<Option<Self>> {
		sqlx::query_as(
			"UPDATE grooming.dogs
			SET dog_name = $2,
				dog_breed = COALESCE($3, dog_breed),
				dog_note = COALESCE($4, dog_note),
				updated_at = NOW()
			WHERE id = $1 AND dog_active
			RETURNING *",
		)
		.bind(id)
		.bind(name)
		.bind(breed)
		.bind(note)
		.fetch_optional(db)
		.await
	}

	pub async fn soft_delete(db: impl PgExecutor<'_>, id: i64) -> sqlx::Result<bool> {
		let result =
			sqlx::query("UPDATE grooming.dogs SET dog_active = FALSE, updated_at = NOW() WHERE id = $1 AND dog_active")
				.bind(id)
				.execute(db)
				.await?;

		Ok(result.rows_affected() > 0)
	}
}
