use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use super::like_pattern;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, serde::Serialize)]
pub struct Customer {
	/// The unique identifier for the customer.
	pub id: i64,
	/// The name the customer is booked under.
	pub customer_name: Option<String>,
	/// A free text note that follows the customer across appointments.
	pub customer_note: Option<String>,
	/// Cleared instead of deleting the row.
	pub customer_active: bool,
	/// The time the customer was created.
	pub created_at: DateTime<Utc>,
	/// The time the customer was last updated.
	pub updated_at: DateTime<Utc>,
}

/// Totals across every customer matching a listing filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, sqlx::FromRow)]
pub struct CustomerCounts {
	pub total_customers: i64,
	pub total_dogs: i64,
}

const SEARCH_FILTER: &str = "(
	c.customer_name ILIKE $1
	OR EXISTS (SELECT 1 FROM grooming.customer_phones p WHERE p.customer_id = c.id AND p.phone ILIKE $1)
	OR EXISTS (SELECT 1 FROM grooming.dogs d WHERE d.customer_id = c.id AND d.dog_active AND d.dog_name ILIKE $1)
)";

impl Customer {
	pub async fn insert(db: impl PgExecutor<'_>, name: Option<&str>, note: Option<&str>) -> sqlx::Result<Self> {
		sqlx::query_as(
			"INSERT INTO grooming.customers (customer_name, customer_note) VALUES ($1, $2) RETURNING *",
		)
		.bind(name)
		.bind(note)
		.fetch_one(db)
		.await
	}

	pub async fn by_id(db: impl PgExecutor<'_>, id: i64) -> sqlx::Result<Option<Self>> {
		sqlx::query_as("SELECT * FROM grooming.customers WHERE id = $1")
			.bind(id)
			.fetch_optional(db)
			.await
	}

	pub async fn active_by_id(db: impl PgExecutor<'_>, id: i64) -> sqlx::Result<Option<Self>> {
		sqlx::query_as("SELECT * FROM grooming.customers WHERE id = $1 AND customer_active")
			.bind(id)
			.fetch_optional(db)
			.await
	}

	/// Absent fields keep their stored value.
	pub async fn update(
		db: impl PgExecutor<'_>,
		id: i64,
		name: Option<&str>,
		note: Option<&str>,
	) -> sqlx::Result<Option<Self>> {
		sqlx::query_as(
			"UPDATE grooming.customers
			SET customer_name = COALESCE($2, customer_name),
				customer_note = COALESCE($3, customer_note),
				updated_at = NOW()
			WHERE id = $1 AND customer_active
			RETURNING *",
		)
		.bind(id)
		.bind(name)
		.bind(note)
		.fetch_optional(db)
		.await
	}

	pub async fn set_note(db: impl PgExecutor<'_>, id: i64, note: &str) -> sqlx::Result<()> {
		sqlx::query("UPDATE grooming.customers SET customer_note = $2, updated_at = NOW() WHERE id = $1")
			.bind(id)
			.bind(note)
			.execute(db)
			.await?;

		Ok(())
	}

	/// Returns false when there was no active customer to deactivate.
	pub async fn soft_delete(db: impl PgExecutor<'_>, id: i64) -> sqlx::Result<bool> {
		let result = sqlx::query(
			"UPDATE grooming.customers SET customer_active = FALSE, updated_at = NOW() WHERE id = $1 AND customer_active",
		)
		.bind(id)
		.execute(db)
		.await?;

		Ok(result.rows_affected() > 0)
	}

	/// Active customers whose name, any phone or any active dog name contains
	/// `term`, most recently touched first.
	pub async fn search(db: impl PgExecutor<'_>, term: &str, limit: i64) -> sqlx::Result<Vec<Self>> {
		let query = format!(
			"SELECT c.* FROM grooming.customers c
			WHERE c.customer_active AND {SEARCH_FILTER}
			ORDER BY c.updated_at DESC, c.id DESC
			LIMIT $2"
		);

		sqlx::query_as(&query)
			.bind(like_pattern(term))
			.bind(limit)
			.fetch_all(db)
			.await
	}

	/// One page of active customers ordered by name, optionally filtered like
	/// [`Customer::search`].
	pub async fn page(
		db: impl PgExecutor<'_>,
		search: Option<&str>,
		limit: i64,
		offset: i64,
	) -> sqlx::Result<Vec<Self>> {
		let query = format!(
			"SELECT c.* FROM grooming.customers c
			WHERE c.customer_active AND ($1::TEXT IS NULL OR {SEARCH_FILTER})
			ORDER BY c.customer_name ASC NULLS LAST, c.id ASC
			LIMIT $2 OFFSET $3"
		);

		sqlx::query_as(&query)
			.bind(search.map(like_pattern))
			.bind(limit)
			.bind(offset)
			.fetch_all(db)
			.await
	}

	pub async fn counts(db: impl PgExecutor<'_>, search: Option<&str>) -> sqlx::Result<CustomerCounts> {
		let query = format!(
			"SELECT
				(SELECT COUNT(*) FROM grooming.customers c
					WHERE c.customer_active AND ($1::TEXT IS NULL OR {SEARCH_FILTER})) AS total_customers,
				(SELECT COUNT(*) FROM grooming.dogs dd JOIN grooming.customers c ON c.id = dd.customer_id
					WHERE dd.dog_active AND c.customer_active AND ($1::TEXT IS NULL OR {SEARCH_FILTER})) AS total_dogs"
		);

		sqlx::query_as(&query).bind(search.map(like_pattern)).fetch_one(db).await
	}
}
