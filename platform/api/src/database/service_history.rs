use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgExecutor;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, serde::Serialize)]
pub struct ServiceHistory {
	pub id: i64,
	pub dog_id: i64,
	/// One entry per dog and day.
	pub service_date: NaiveDate,
	pub service: Option<String>,
	/// Kept as entered, prices are free text in the shop.
	pub service_price: Option<String>,
	pub service_note: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, serde::Serialize)]
pub struct ServiceHistoryEntry {
	#[sqlx(flatten)]
	#[serde(flatten)]
	pub history: ServiceHistory,
	pub dog_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewService<'a> {
	pub service: Option<&'a str>,
	pub price: Option<&'a str>,
	pub note: Option<&'a str>,
}

impl ServiceHistory {
	/// Fails with a unique violation when the dog already has an entry that day.
	pub async fn insert(
		db: impl PgExecutor<'_>,
		dog_id: i64,
		date: NaiveDate,
		service: &NewService<'_>,
	) -> sqlx::Result<Self> {
		sqlx::query_as(
			"INSERT INTO grooming.service_history (dog_id, service_date, service, service_price, service_note)
			VALUES ($1, $2, $3, $4, $5)
			RETURNING *",
		)
		.bind(dog_id)
		.bind(date)
		.bind(service.service)
		.bind(service.price)
		.bind(service.note)
		.fetch_one(db)
		.await
	}

	/// Writes the entry for `(dog_id, date)`, replacing the one already there.
	pub async fn upsert(
		db: impl PgExecutor<'_>,
		dog_id: i64,
		date: NaiveDate,
		service: &NewService<'_>,
	) -> sqlx::Result<Self> {
		sqlx::query_as(
			"INSERT INTO grooming.service_history (dog_id, service_date, service, service_price, service_note)
			VALUES ($1, $2, $3, $4, $5)
			ON CONFLICT (dog_id, service_date) DO UPDATE
			SET service = EXCLUDED.service,
				service_price = EXCLUDED.service_price,
				service_note = EXCLUDED.service_note,
				updated_at = NOW()
			RETURNING *",
		)
		.bind(dog_id)
		.bind(date)
		.bind(service.service)
		.bind(service.price)
		.bind(service.note)
		.fetch_one(db)
		.await
	}

	/// Newest first, optionally restricted to one dog.
	pub async fn list(db: impl PgExecutor<'_>, dog_id: Option<i64>) -> sqlx::Result<Vec<ServiceHistoryEntry>> {
		sqlx::query_as(
			"SELECT s.*, d.dog_name
			FROM grooming.service_history s
			JOIN grooming.dogs d ON d.id = s.dog_id
			WHERE $1::BIGINT IS NULL OR s.dog_id = $1
			ORDER BY s.service_date DESC, s.created_at DESC, s.id DESC",
		)
		.bind(dog_id)
		.fetch_all(db)
		.await
	}

	/// Newest first per dog.
	pub async fn by_dogs(db: impl PgExecutor<'_>, dog_ids: &[i64]) -> sqlx::Result<Vec<Self>> {
		sqlx::query_as(
			"SELECT * FROM grooming.service_history
			WHERE dog_id = ANY($1)
			ORDER BY dog_id, service_date DESC, id DESC",
		)
		.bind(dog_ids)
		.fetch_all(db)
		.await
	}

	/// The `limit` newest entries of each of the given dogs.
	pub async fn recent_by_dogs(db: impl PgExecutor<'_>, dog_ids: &[i64], limit: i64) -> sqlx::Result<Vec<Self>> {
		sqlx::query_as(
			"SELECT id, dog_id, service_date, service, service_price, service_note, created_at, updated_at
			FROM (
				SELECT s.*, ROW_NUMBER() OVER (PARTITION BY s.dog_id ORDER BY s.service_date DESC, s.id DESC) AS entry_rank
				FROM grooming.service_history s
				WHERE s.dog_id = ANY($1)
			) ranked
			WHERE entry_rank <= $2
			ORDER BY dog_id, service_date DESC, id DESC",
		)
		.bind(dog_ids)
		.bind(limit)
		.fetch_all(db)
		.await
	}

	pub async fn by_dog_and_date(db: impl PgExecutor<'_>, dog_id: i64, date: NaiveDate) -> sqlx::Result<Vec<Self>> {
		sqlx::query_as("SELECT * FROM grooming.service_history WHERE dog_id = $1 AND service_date = $2")
			.bind(dog_id)
			.bind(date)
			.fetch_all(db)
			.await
	}
}
