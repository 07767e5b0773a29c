use std::sync::Arc;

use binary_helper::global::{setup_database, setup_database_lazy, GlobalConfigProvider};
use binary_helper::impl_global_traits;
use common::context::{Context, Handler};
use common::logging;

use crate::config::{ApiConfig, AppConfig, HolidayConfig, ScheduleConfig};
use crate::global::ApiState;
use crate::{holidays, migration};

pub struct TestGlobal {
	ctx: Context,
	pub config: AppConfig,
	db: Arc<sqlx::PgPool>,
	holiday_client: reqwest::Client,
}

impl_global_traits!(TestGlobal);

impl ApiState for TestGlobal {
	fn holiday_client(&self) -> &reqwest::Client {
		&self.holiday_client
	}
}

impl GlobalConfigProvider<ApiConfig> for TestGlobal {
	fn provide_config(&self) -> &ApiConfig {
		&self.config.extra.api
	}
}

impl GlobalConfigProvider<HolidayConfig> for TestGlobal {
	fn provide_config(&self) -> &HolidayConfig {
		&self.config.extra.holidays
	}
}

impl GlobalConfigProvider<ScheduleConfig> for TestGlobal {
	fn provide_config(&self) -> &ScheduleConfig {
		&self.config.extra.schedule
	}
}

/// A global whose pool only connects when a query runs.
pub fn mock_global_state(config: AppConfig) -> (Arc<TestGlobal>, Handler) {
	let (ctx, handler) = Context::new();

	logging::init(&config.logging.level, config.logging.mode).expect("failed to initialize logging");

	let db = setup_database_lazy(&config.database).expect("failed to create pool");
	let holiday_client = holidays::build_client(&config.extra.holidays).expect("failed to build holiday client");

	(
		Arc::new(TestGlobal {
			ctx,
			config,
			db,
			holiday_client,
		}),
		handler,
	)
}

/// A global connected to `DATABASE_URL` with a migrated, empty schema.
/// Returns `None` when no database is configured.
pub async fn database_global() -> Option<(Arc<TestGlobal>, Handler)> {
	dotenvy::dotenv().ok();

	let Ok(uri) = std::env::var("DATABASE_URL") else {
		eprintln!("DATABASE_URL not set, skipping");
		return None;
	};

	let mut config = AppConfig::default();
	config.database.uri = uri;

	let (ctx, handler) = Context::new();

	logging::init(&config.logging.level, config.logging.mode).expect("failed to initialize logging");

	let db = setup_database(&config.database).await.expect("failed to connect to database");

	migration::run_migrations(&db).await.expect("failed to run migrations");

	sqlx::query(
		"TRUNCATE grooming.customers, grooming.customer_phones, grooming.dogs, grooming.appointments,
			grooming.service_history, grooming.availability_rules, grooming.date_marking, grooming.daily_notes
		RESTART IDENTITY CASCADE",
	)
	.execute(db.as_ref())
	.await
	.expect("failed to clear tables");

	let holiday_client = holidays::build_client(&config.extra.holidays).expect("failed to build holiday client");

	Some((
		Arc::new(TestGlobal {
			ctx,
			config,
			db,
			holiday_client,
		}),
		handler,
	))
}

/// Config whose database can never be reached.
pub fn unreachable_database_config() -> AppConfig {
	let mut config = AppConfig::default();
	config.database.uri = "postgres://grooming@127.0.0.1:1/grooming".to_string();
	config.database.acquire_timeout_secs = 1;
	config
}
