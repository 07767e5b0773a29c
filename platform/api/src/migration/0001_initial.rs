use sqlx::PgConnection;

use super::Migration;

pub struct InitialMigration;

const UP: &[&str] = &[
	"CREATE SCHEMA IF NOT EXISTS grooming",
	"CREATE TABLE grooming.customers (
		id BIGSERIAL PRIMARY KEY,
		customer_name TEXT,
		customer_note TEXT,
		customer_active BOOLEAN NOT NULL DEFAULT TRUE,
		created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
		updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
	)",
	"CREATE TABLE grooming.customer_phones (
		id BIGSERIAL PRIMARY KEY,
		customer_id BIGINT NOT NULL REFERENCES grooming.customers (id) ON DELETE CASCADE,
		phone_owner TEXT,
		phone TEXT NOT NULL,
		phone_type TEXT,
		is_primary BOOLEAN NOT NULL DEFAULT FALSE,
		created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
		updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
	)",
	"CREATE INDEX customer_phones_customer_id_index ON grooming.customer_phones (customer_id)",
	"CREATE UNIQUE INDEX customer_phones_primary_index ON grooming.customer_phones (customer_id) WHERE is_primary",
	"CREATE TABLE grooming.dogs (
		id BIGSERIAL PRIMARY KEY,
		customer_id BIGINT NOT NULL REFERENCES grooming.customers (id) ON DELETE CASCADE,
		dog_name TEXT NOT NULL,
		dog_breed TEXT,
		dog_note TEXT,
		dog_active BOOLEAN NOT NULL DEFAULT TRUE,
		created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
		updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
	)",
	"CREATE INDEX dogs_customer_id_index ON grooming.dogs (customer_id)",
	"CREATE TABLE grooming.appointments (
		id BIGSERIAL PRIMARY KEY,
		dog_id BIGINT REFERENCES grooming.dogs (id) ON DELETE SET NULL,
		appointment_date DATE NOT NULL,
		appointment_time TIME NOT NULL,
		appointment_dog_name TEXT,
		appointment_customer_name TEXT,
		appointment_phone TEXT,
		appointment_dog_breed TEXT,
		quick_details TEXT,
		today_services TEXT,
		today_price TEXT,
		today_note TEXT,
		customer_note TEXT,
		appointment_status TEXT NOT NULL DEFAULT 'no-status'
			CHECK (appointment_status IN ('no-status', 'C', 'F', 'FN', 'P', 'x')),
		appointment_active BOOLEAN NOT NULL DEFAULT TRUE,
		created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
		updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
	)",
	"CREATE INDEX appointments_date_index ON grooming.appointments (appointment_date, appointment_time)",
	"CREATE INDEX appointments_dog_id_index ON grooming.appointments (dog_id)",
	"CREATE TABLE grooming.service_history (
		id BIGSERIAL PRIMARY KEY,
		dog_id BIGINT NOT NULL REFERENCES grooming.dogs (id) ON DELETE CASCADE,
		service_date DATE NOT NULL,
		service TEXT,
		service_price TEXT,
		service_note TEXT,
		created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
		updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
		UNIQUE (dog_id, service_date)
	)",
	"CREATE TABLE grooming.availability_rules (
		id BIGSERIAL PRIMARY KEY,
		type TEXT NOT NULL CHECK (type IN ('weekly', 'specific')),
		day_of_week SMALLINT CHECK (day_of_week BETWEEN 0 AND 6),
		specific_date DATE,
		time TIME NOT NULL,
		is_enabled BOOLEAN NOT NULL DEFAULT TRUE,
		appointment_limit INTEGER CHECK (appointment_limit >= 0),
		created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
	)",
	"CREATE TABLE grooming.date_marking (
		id BIGSERIAL PRIMARY KEY,
		type TEXT NOT NULL CHECK (type IN ('weekly', 'specific', 'holiday')),
		marking_day_of_week SMALLINT CHECK (marking_day_of_week BETWEEN 0 AND 6),
		marking_date DATE,
		color TEXT NOT NULL DEFAULT 'yellow',
		created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
	)",
	"CREATE TABLE grooming.daily_notes (
		id BIGSERIAL PRIMARY KEY,
		daily_note_date DATE NOT NULL UNIQUE,
		daily_note TEXT NOT NULL,
		created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
		updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
	)",
];

#[async_trait::async_trait]
impl Migration for InitialMigration {
	fn name(&self) -> &'static str {
		"InitialMigration"
	}

	fn version(&self) -> i32 {
		1
	}

	async fn up(&self, tx: &mut PgConnection) -> anyhow::Result<()> {
		for statement in UP {
			sqlx::query(statement).execute(&mut *tx).await?;
		}

		Ok(())
	}

	async fn down(&self, tx: &mut PgConnection) -> anyhow::Result<()> {
		sqlx::query("DROP SCHEMA grooming CASCADE").execute(&mut *tx).await?;

		Ok(())
	}
}
