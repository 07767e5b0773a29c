use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgExecutor;

use super::{text_enum, InvalidValue};

pub const DEFAULT_MARKING_COLOR: &str = "yellow";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkingType {
	Weekly,
	Specific,
	Holiday,
}

impl MarkingType {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Weekly => "weekly",
			Self::Specific => "specific",
			Self::Holiday => "holiday",
		}
	}
}

impl FromStr for MarkingType {
	type Err = InvalidValue;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"weekly" => Ok(Self::Weekly),
			"specific" => Ok(Self::Specific),
			"holiday" => Ok(Self::Holiday),
			_ => Err(InvalidValue {
				kind: "marking type",
				value: s.to_string(),
			}),
		}
	}
}

text_enum!(MarkingType);

/// A coloured calendar annotation, unrelated to whether a day can be booked.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, serde::Serialize)]
pub struct DateMarking {
	pub id: i64,
	#[sqlx(rename = "type")]
	#[serde(rename = "type")]
	pub marking_type: MarkingType,
	pub marking_day_of_week: Option<i16>,
	pub marking_date: Option<NaiveDate>,
	pub color: String,
	pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMarking {
	pub marking_type: MarkingType,
	pub marking_day_of_week: Option<i16>,
	pub marking_date: Option<NaiveDate>,
	pub color: String,
}

impl DateMarking {
	pub async fn list(db: impl PgExecutor<'_>) -> sqlx::Result<Vec<Self>> {
		sqlx::query_as("SELECT * FROM grooming.date_marking ORDER BY created_at DESC, id DESC")
			.fetch_all(db)
			.await
	}

	pub async fn insert(db: impl PgExecutor<'_>, marking: &NewMarking) -> sqlx::Result<Self> {
		sqlx::query_as(
			"INSERT INTO grooming.date_marking (type, marking_day_of_week, marking_date, color)
			VALUES ($1, $2, $3, $4)
			RETURNING *",
		)
		.bind(marking.marking_type)
		.bind(marking.marking_day_of_week)
		.bind(marking.marking_date)
		.bind(&marking.color)
		.fetch_one(db)
		.await
	}

	pub async fn delete(db: impl PgExecutor<'_>, id: i64) -> sqlx::Result<bool> {
		let result = sqlx::query("DELETE FROM grooming.date_marking WHERE id = $1")
			.bind(id)
			.execute(db)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	/// Removes every date bound marking on `date`, weekly ones are untouched.
	pub async fn delete_by_date(db: impl PgExecutor<'_>, date: NaiveDate) -> sqlx::Result<u64> {
		let result = sqlx::query("DELETE FROM grooming.date_marking WHERE marking_date = $1")
			.bind(date)
			.execute(db)
			.await?;

		Ok(result.rows_affected())
	}
}
