use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use common::config::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::ConnectOptions;

/// Implements the context, database and config accessors for a global state
/// struct with `ctx` and `db` fields.
#[macro_export]
macro_rules! impl_global_traits {
	($struct:ty) => {
		impl binary_helper::global::GlobalCtx for $struct {
			#[inline(always)]
			fn ctx(&self) -> &common::context::Context {
				&self.ctx
			}
		}

		impl binary_helper::global::GlobalDb for $struct {
			#[inline(always)]
			fn db(&self) -> &std::sync::Arc<sqlx::PgPool> {
				&self.db
			}
		}

		impl binary_helper::global::GlobalConfig for $struct {}
	};
}

pub trait GlobalCtx {
	fn ctx(&self) -> &common::context::Context;
}

pub trait GlobalConfig {
	#[inline(always)]
	fn config<C>(&self) -> &C
	where
		Self: GlobalConfigProvider<C>,
	{
		GlobalConfigProvider::provide_config(self)
	}
}

pub trait GlobalConfigProvider<C> {
	fn provide_config(&self) -> &C;
}

pub trait GlobalDb {
	fn db(&self) -> &Arc<sqlx::PgPool>;
}

fn pool_options(config: &DatabaseConfig) -> anyhow::Result<(PgPoolOptions, PgConnectOptions)> {
	let connect_options = config
		.uri
		.parse::<PgConnectOptions>()
		.context("invalid database uri")?
		.disable_statement_logging();

	let pool_options = PgPoolOptions::new()
		.max_connections(config.max_connections)
		.acquire_timeout(Duration::from_secs(config.acquire_timeout_secs));

	Ok((pool_options, connect_options))
}

pub async fn setup_database(config: &DatabaseConfig) -> anyhow::Result<Arc<sqlx::PgPool>> {
	let (pool_options, connect_options) = pool_options(config)?;

	let pool = pool_options
		.connect_with(connect_options)
		.await
		.context("failed to connect to database")?;

	tracing::info!(max_connections = config.max_connections, "connected to database");

	Ok(Arc::new(pool))
}

/// Builds a pool that only connects on first use.
pub fn setup_database_lazy(config: &DatabaseConfig) -> anyhow::Result<Arc<sqlx::PgPool>> {
	let (pool_options, connect_options) = pool_options(config)?;

	Ok(Arc::new(pool_options.connect_lazy_with(connect_options)))
}
