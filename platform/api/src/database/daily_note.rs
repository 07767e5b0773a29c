use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgExecutor;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, serde::Serialize)]
pub struct DailyNote {
	pub id: i64,
	pub daily_note_date: NaiveDate,
	pub daily_note: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl DailyNote {
	pub async fn by_date(db: impl PgExecutor<'_>, date: NaiveDate) -> sqlx::Result<Option<Self>> {
		sqlx::query_as("SELECT * FROM grooming.daily_notes WHERE daily_note_date = $1")
			.bind(date)
			.fetch_optional(db)
			.await
	}

	/// Replaces the note of the day if there already is one.
	pub async fn upsert(db: impl PgExecutor<'_>, date: NaiveDate, note: &str) -> sqlx::Result<Self> {
		sqlx::query_as(
			"INSERT INTO grooming.daily_notes (daily_note_date, daily_note)
			VALUES ($1, $2)
			ON CONFLICT (daily_note_date) DO UPDATE
			SET daily_note = EXCLUDED.daily_note, updated_at = NOW()
			RETURNING *",
		)
		.bind(date)
		.bind(note)
		.fetch_one(db)
		.await
	}
}
