use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, serde::Serialize)]
pub struct CustomerPhone {
	pub id: i64,
	pub customer_id: i64,
	/// Who answers on this number, when it is not the customer themselves.
	pub phone_owner: Option<String>,
	/// Digits only.
	pub phone: String,
	/// Free form label such as mobile or work.
	pub phone_type: Option<String>,
	/// At most one per customer.
	pub is_primary: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// A validated phone ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewPhone {
	pub phone_owner: Option<String>,
	pub phone: String,
	pub phone_type: Option<String>,
	pub is_primary: bool,
}

/// Keeps the primary flag on the first phone that asks for it.
pub fn normalize_primary(phones: &mut [NewPhone]) {
	let mut seen = false;
	for phone in phones {
		if phone.is_primary {
			phone.is_primary = !seen;
			seen = true;
		}
	}
}

impl CustomerPhone {
	pub async fn insert(db: impl PgExecutor<'_>, customer_id: i64, phone: &NewPhone) -> sqlx::Result<Self> {
		sqlx::query_as(
			"INSERT INTO grooming.customer_phones (customer_id, phone_owner, phone, phone_type, is_primary)
			VALUES ($1, $2, $3, $4, $5)
			RETURNING *",
		)
		.bind(customer_id)
		.bind(&phone.phone_owner)
		.bind(&phone.phone)
		.bind(&phone.phone_type)
		.bind(phone.is_primary)
		.fetch_one(db)
		.await
	}

	pub async fn by_id(db: impl PgExecutor<'_>, id: i64) -> sqlx::Result<Option<Self>> {
		sqlx::query_as("SELECT * FROM grooming.customer_phones WHERE id = $1")
			.bind(id)
			.fetch_optional(db)
			.await
	}

	/// Primary phone first, then in the order they were added.
	pub async fn by_customer(db: impl PgExecutor<'_>, customer_id: i64) -> sqlx::Result<Vec<Self>> {
		sqlx::query_as(
			"SELECT * FROM grooming.customer_phones WHERE customer_id = $1 ORDER BY is_primary DESC, created_at ASC, id ASC",
		)
		.bind(customer_id)
		.fetch_all(db)
		.await
	}

	pub async fn by_customers(db: impl PgExecutor<'_>, customer_ids: &[i64]) -> sqlx::Result<Vec<Self>> {
		sqlx::query_as(
			"SELECT * FROM grooming.customer_phones
			WHERE customer_id = ANY($1)
			ORDER BY customer_id, is_primary DESC, created_at ASC, id ASC",
		)
		.bind(customer_ids)
		.fetch_all(db)
		.await
	}

	/// Drops the primary flag from every phone of the customer except `keep`.
	pub async fn clear_primary(db: impl PgExecutor<'_>, customer_id: i64, keep: Option<i64>) -> sqlx::Result<()> {
		sqlx::query(
			"UPDATE grooming.customer_phones
			SET is_primary = FALSE, updated_at = NOW()
			WHERE customer_id = $1 AND is_primary AND ($2::BIGINT IS NULL OR id <> $2)",
		)
		.bind(customer_id)
		.bind(keep)
		.execute(db)
		.await?;

		Ok(())
	}

	/// Absent fields keep their stored value.
	pub async fn update(
		db: impl PgExecutor<'_>,
		id: i64,
		phone_owner: Option<&str>,
		phone: Option<&str>,
		phone_type: Option<&str>,
		is_primary: Option<bool>,
	) -> sqlx::Result<Option<Self>> {
		sqlx::query_as(
			"UPDATE grooming.customer_phones
			SET phone_owner = COALESCE($2, phone_owner),
				phone = COALESCE($3, phone),
				phone_type = COALESCE($4, phone_type),
				is_primary = COALESCE($5, is_primary),
				updated_at = NOW()
			WHERE id = $1
			RETURNING *",
		)
		.bind(id)
		.bind(phone_owner)
		.bind(phone)
		.bind(phone_type)
		.bind(is_primary)
		.fetch_optional(db)
		.await
	}

	pub async fn delete(db: impl PgExecutor<'_>, id: i64) -> sqlx::Result<bool> {
		let result = sqlx::query("DELETE FROM grooming.customer_phones WHERE id = $1")
			.bind(id)
			.execute(db)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	pub async fn delete_by_customer(db: impl PgExecutor<'_>, customer_id: i64) -> sqlx::Result<u64> {
		let result = sqlx::query("DELETE FROM grooming.customer_phones WHERE customer_id = $1")
			.bind(customer_id)
			.execute(db)
			.await?;

		Ok(result.rows_affected())
	}
}
