use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{PgConnection, PgExecutor};

use super::{text_enum, time_format, InvalidValue};

/// Where an appointment is in the day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
	#[default]
	NoStatus,
	/// Confirmed with the customer.
	Confirmed,
	/// Finished, owner not told yet.
	Finished,
	/// Finished and owner notified.
	FinishedNotified,
	/// Picked up by the owner.
	PickedUp,
	/// Did not show up.
	NoShow,
}

impl AppointmentStatus {
	pub const ALL: [Self; 6] = [
		Self::NoStatus,
		Self::Confirmed,
		Self::Finished,
		Self::FinishedNotified,
		Self::PickedUp,
		Self::NoShow,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::NoStatus => "no-status",
			Self::Confirmed => "C",
			Self::Finished => "F",
			Self::FinishedNotified => "FN",
			Self::PickedUp => "P",
			Self::NoShow => "x",
		}
	}
}

impl FromStr for AppointmentStatus {
	type Err = InvalidValue;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL.into_iter().find(|status| status.as_str() == s).ok_or_else(|| InvalidValue {
			kind: "appointment status",
			value: s.to_string(),
		})
	}
}

text_enum!(AppointmentStatus);

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, serde::Serialize)]
pub struct Appointment {
	pub id: i64,
	/// Walk-ins are booked without a registered dog.
	pub dog_id: Option<i64>,
	pub appointment_date: NaiveDate,
	#[serde(with = "time_format")]
	pub appointment_time: NaiveTime,
	pub appointment_dog_name: Option<String>,
	pub appointment_customer_name: Option<String>,
	pub appointment_phone: Option<String>,
	pub appointment_dog_breed: Option<String>,
	/// The raw quick entry text the booking was made from.
	pub quick_details: Option<String>,
	pub today_services: Option<String>,
	pub today_price: Option<String>,
	pub today_note: Option<String>,
	/// Note for the owner, copied onto the customer on pick up.
	pub customer_note: Option<String>,
	pub appointment_status: AppointmentStatus,
	/// Cleared once the dog has been picked up.
	pub appointment_active: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// An appointment joined with the registered dog and owner, when there is one.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, serde::Serialize)]
pub struct AppointmentListing {
	#[sqlx(flatten)]
	#[serde(flatten)]
	pub appointment: Appointment,
	pub dog_name: Option<String>,
	pub dog_breed: Option<String>,
	pub dog_note: Option<String>,
	pub customer_id: Option<i64>,
	pub customer_name: Option<String>,
	pub owner_note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewAppointment {
	pub dog_id: Option<i64>,
	pub date: NaiveDate,
	pub time: NaiveTime,
	pub dog_name: String,
	pub customer_name: Option<String>,
	pub phone: Option<String>,
	pub dog_breed: Option<String>,
	pub quick_details: Option<String>,
	pub today_services: Option<String>,
	pub today_price: Option<String>,
	pub today_note: Option<String>,
	pub customer_note: Option<String>,
	pub status: AppointmentStatus,
}

/// Fields to merge into an appointment, `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentChanges {
	pub dog_id: Option<i64>,
	pub date: Option<NaiveDate>,
	pub time: Option<NaiveTime>,
	pub dog_name: Option<String>,
	pub customer_name: Option<String>,
	pub phone: Option<String>,
	pub dog_breed: Option<String>,
	pub quick_details: Option<String>,
	pub today_services: Option<String>,
	pub today_price: Option<String>,
	pub today_note: Option<String>,
	pub customer_note: Option<String>,
	pub status: Option<AppointmentStatus>,
}

/// Number of appointments booked at one time of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct Booking {
	pub appointment_time: NaiveTime,
	pub booked: i64,
}

impl Appointment {
	pub async fn insert(db: impl PgExecutor<'_>, new: &NewAppointment) -> sqlx::Result<Self> {
		sqlx::query_as(
			"INSERT INTO grooming.appointments (
				dog_id, appointment_date, appointment_time, appointment_dog_name, appointment_customer_name,
				appointment_phone, appointment_dog_breed, quick_details, today_services, today_price, today_note,
				customer_note, appointment_status
			)
			VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
			RETURNING *",
		)
		.bind(new.dog_id)
		.bind(new.date)
		.bind(new.time)
		.bind(&new.dog_name)
		.bind(&new.customer_name)
		.bind(&new.phone)
		.bind(&new.dog_breed)
		.bind(&new.quick_details)
		.bind(&new.today_services)
		.bind(&new.today_price)
		.bind(&new.today_note)
		.bind(&new.customer_note)
		.bind(new.status)
		.fetch_one(db)
		.await
	}

	pub async fn by_id(db: impl PgExecutor<'_>, id: i64) -> sqlx::Result<Option<Self>> {
		sqlx::query_as("SELECT * FROM grooming.appointments WHERE id = $1")
			.bind(id)
			.fetch_optional(db)
			.await
	}

	/// Reads the row and holds its lock until the transaction ends.
	pub async fn lock(tx: &mut PgConnection, id: i64) -> sqlx::Result<Option<Self>> {
		sqlx::query_as("SELECT * FROM grooming.appointments WHERE id = $1 FOR UPDATE")
			.bind(id)
			.fetch_optional(tx)
			.await
	}

	pub async fn update(db: impl PgExecutor<'_>, id: i64, changes: &AppointmentChanges) -> sqlx::Result<Option<Self>> {
		sqlx::query_as(
			"UPDATE grooming.appointments
			SET dog_id = COALESCE($2, dog_id),
				appointment_date = COALESCE($3, appointment_date),
				appointment_time = COALESCE($4, appointment_time),
				appointment_dog_name = COALESCE($5, appointment_dog_name),
				appointment_customer_name = COALESCE($6, appointment_customer_name),
				appointment_phone = COALESCE($7, appointment_phone),
				appointment_dog_breed = COALESCE($8, appointment_dog_breed),
				quick_details = COALESCE($9, quick_details),
				today_services = COALESCE($10, today_services),
				today_price = COALESCE($11, today_price),
				today_note = COALESCE($12, today_note),
				customer_note = COALESCE($13, customer_note),
				appointment_status = COALESCE($14, appointment_status),
				updated_at = NOW()
			WHERE id = $1
			RETURNING *",
		)
		.bind(id)
		.bind(changes.dog_id)
		.bind(changes.date)
		.bind(changes.time)
		.bind(&changes.dog_name)
		.bind(&changes.customer_name)
		.bind(&changes.phone)
		.bind(&changes.dog_breed)
		.bind(&changes.quick_details)
		.bind(&changes.today_services)
		.bind(&changes.today_price)
		.bind(&changes.today_note)
		.bind(&changes.customer_note)
		.bind(changes.status)
		.fetch_optional(db)
		.await
	}

	pub async fn deactivate(db: impl PgExecutor<'_>, id: i64) -> sqlx::Result<Option<Self>> {
		sqlx::query_as(
			"UPDATE grooming.appointments SET appointment_active = FALSE, updated_at = NOW() WHERE id = $1 RETURNING *",
		)
		.bind(id)
		.fetch_optional(db)
		.await
	}

	pub async fn delete(db: impl PgExecutor<'_>, id: i64) -> sqlx::Result<bool> {
		let result = sqlx::query("DELETE FROM grooming.appointments WHERE id = $1")
			.bind(id)
			.execute(db)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	/// Every appointment of the day in time order.
	pub async fn by_date(db: impl PgExecutor<'_>, date: NaiveDate) -> sqlx::Result<Vec<AppointmentListing>> {
		sqlx::query_as(
			"SELECT a.*,
				d.dog_name, d.dog_breed, d.dog_note,
				c.id AS customer_id, c.customer_name, c.customer_note AS owner_note
			FROM grooming.appointments a
			LEFT JOIN grooming.dogs d ON d.id = a.dog_id
			LEFT JOIN grooming.customers c ON c.id = d.customer_id
			WHERE a.appointment_date = $1
			ORDER BY a.appointment_time, a.id",
		)
		.bind(date)
		.fetch_all(db)
		.await
	}

	/// Active appointments on or after `from` for the given dogs.
	pub async fn upcoming_by_dogs(db: impl PgExecutor<'_>, dog_ids: &[i64], from: NaiveDate) -> sqlx::Result<Vec<Self>> {
		sqlx::query_as(
			"SELECT * FROM grooming.appointments
			WHERE dog_id = ANY($1) AND appointment_active AND appointment_date >= $2
			ORDER BY appointment_date, appointment_time, id",
		)
		.bind(dog_ids)
		.bind(from)
		.fetch_all(db)
		.await
	}

	/// Appointments per time of day, no-shows excluded.
	pub async fn bookings(db: impl PgExecutor<'_>, date: NaiveDate) -> sqlx::Result<Vec<Booking>> {
		sqlx::query_as(
			"SELECT appointment_time, COUNT(*) AS booked
			FROM grooming.appointments
			WHERE appointment_date = $1 AND appointment_status <> $2
			GROUP BY appointment_time
			ORDER BY appointment_time",
		)
		.bind(date)
		.bind(AppointmentStatus::NoShow)
		.fetch_all(db)
		.await
	}
}
