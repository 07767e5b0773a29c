use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgExecutor;

use super::{text_enum, time_format, InvalidValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleType {
	/// Repeats on one weekday.
	Weekly,
	/// Applies to a single date.
	Specific,
}

impl RuleType {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Weekly => "weekly",
			Self::Specific => "specific",
		}
	}
}

impl FromStr for RuleType {
	type Err = InvalidValue;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"weekly" => Ok(Self::Weekly),
			"specific" => Ok(Self::Specific),
			_ => Err(InvalidValue {
				kind: "rule type",
				value: s.to_string(),
			}),
		}
	}
}

text_enum!(RuleType);

/// A time of day at which appointments can be booked.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, serde::Serialize)]
pub struct AvailabilityRule {
	pub id: i64,
	#[sqlx(rename = "type")]
	#[serde(rename = "type")]
	pub rule_type: RuleType,
	/// 0 is Sunday. Only set for weekly rules.
	pub day_of_week: Option<i16>,
	/// Only set for specific rules.
	pub specific_date: Option<NaiveDate>,
	#[serde(with = "time_format")]
	pub time: NaiveTime,
	pub is_enabled: bool,
	/// Maximum bookings at this time, unlimited when unset.
	pub appointment_limit: Option<i32>,
	pub created_at: DateTime<Utc>,
}

/// A rule that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRule {
	pub rule_type: RuleType,
	pub day_of_week: Option<i16>,
	pub specific_date: Option<NaiveDate>,
	pub time: NaiveTime,
	pub is_enabled: bool,
	pub appointment_limit: Option<i32>,
}

impl AvailabilityRule {
	pub async fn list(db: impl PgExecutor<'_>) -> sqlx::Result<Vec<Self>> {
		sqlx::query_as("SELECT * FROM grooming.availability_rules ORDER BY created_at DESC, id DESC")
			.fetch_all(db)
			.await
	}

	pub async fn enabled(db: impl PgExecutor<'_>) -> sqlx::Result<Vec<Self>> {
		sqlx::query_as("SELECT * FROM grooming.availability_rules WHERE is_enabled ORDER BY time, id")
			.fetch_all(db)
			.await
	}

	pub async fn insert(db: impl PgExecutor<'_>, rule: &NewRule) -> sqlx::Result<Self> {
		sqlx::query_as(
			"INSERT INTO grooming.availability_rules (type, day_of_week, specific_date, time, is_enabled, appointment_limit)
			VALUES ($1, $2, $3, $4, $5, $6)
			RETURNING *",
		)
		.bind(rule.rule_type)
		.bind(rule.day_of_week)
		.bind(rule.specific_date)
		.bind(rule.time)
		.bind(rule.is_enabled)
		.bind(rule.appointment_limit)
		.fetch_one(db)
		.await
	}

	pub async fn delete(db: impl PgExecutor<'_>, id: i64) -> sqlx::Result<bool> {
		let result = sqlx::query("DELETE FROM grooming.availability_rules WHERE id = $1")
			.bind(id)
			.execute(db)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	pub async fn delete_all(db: impl PgExecutor<'_>) -> sqlx::Result<u64> {
		let result = sqlx::query("DELETE FROM grooming.availability_rules").execute(db).await?;

		Ok(result.rows_affected())
	}
}
