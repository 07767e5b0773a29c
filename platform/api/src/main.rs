use std::sync::Arc;

use anyhow::Context as _;
use binary_helper::global::{setup_database, GlobalConfigProvider};
use binary_helper::{bootstrap, impl_global_traits};
use common::context::Context;
use grooming_api::config::{ApiConfig, AppConfig, HolidayConfig, ScheduleConfig};
use grooming_api::global::ApiState;
use grooming_api::{holidays, migration};

struct GlobalState {
	ctx: Context,
	config: AppConfig,
	db: Arc<sqlx::PgPool>,
	holiday_client: reqwest::Client,
}

impl_global_traits!(GlobalState);

impl ApiState for GlobalState {
	#[inline(always)]
	fn holiday_client(&self) -> &reqwest::Client {
		&self.holiday_client
	}
}

impl GlobalConfigProvider<ApiConfig> for GlobalState {
	#[inline(always)]
	fn provide_config(&self) -> &ApiConfig {
		&self.config.extra.api
	}
}

impl GlobalConfigProvider<HolidayConfig> for GlobalState {
	#[inline(always)]
	fn provide_config(&self) -> &HolidayConfig {
		&self.config.extra.holidays
	}
}

impl GlobalConfigProvider<ScheduleConfig> for GlobalState {
	#[inline(always)]
	fn provide_config(&self) -> &ScheduleConfig {
		&self.config.extra.schedule
	}
}

impl binary_helper::Global<AppConfig> for GlobalState {
	async fn new(ctx: Context, config: AppConfig) -> anyhow::Result<Self> {
		let db = setup_database(&config.database).await?;

		migration::run_migrations(&db).await.context("failed to run migrations")?;

		let holiday_client = holidays::build_client(&config.extra.holidays).context("failed to build holiday client")?;

		Ok(Self {
			ctx,
			config,
			db,
			holiday_client,
		})
	}
}

#[tokio::main]
pub async fn main() {
	if let Err(err) = bootstrap::<AppConfig, GlobalState, _>(|global| async move {
		grooming_api::api::run(global).await.context("api server stopped unexpectedly")
	})
	.await
	{
		tracing::error!("{:#}", err);
		std::process::exit(1);
	}
}
