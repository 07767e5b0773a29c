use anyhow::Context;
use sqlx::{PgConnection, PgPool};

#[path = "0001_initial.rs"]
mod initial;

#[async_trait::async_trait]
trait Migration: Send + Sync {
	fn name(&self) -> &'static str;
	fn version(&self) -> i32;

	async fn up(&self, tx: &mut PgConnection) -> anyhow::Result<()>;
	async fn down(&self, tx: &mut PgConnection) -> anyhow::Result<()>;
}

const MIGRATIONS: &[&dyn Migration] = &[&initial::InitialMigration];

async fn current_version(db: &PgPool) -> anyhow::Result<usize> {
	let version = sqlx::query_scalar::<_, i32>("SELECT version FROM grooming_migrations")
		.fetch_optional(db)
		.await;

	match version {
		Ok(Some(version)) => Ok(version as usize),
		Ok(None) => {
			sqlx::query("INSERT INTO grooming_migrations (version) VALUES (0)")
				.execute(db)
				.await
				.context("Failed to insert initial migration version")?;

			Ok(0)
		}
		Err(err) => {
			tracing::info!("Initializing database: {}", err);
			sqlx::query("CREATE TABLE IF NOT EXISTS grooming_migrations (version INTEGER NOT NULL)")
				.execute(db)
				.await
				.context("Failed to create migration table")?;

			sqlx::query("INSERT INTO grooming_migrations (version) VALUES (0)")
				.execute(db)
				.await
				.context("Failed to insert initial migration version")?;

			Ok(0)
		}
	}
}

#[tracing::instrument(skip(db, migration), fields(name = migration.name(), version = migration.version()))]
async fn apply(db: &PgPool, migration: &dyn Migration, revert: bool) -> anyhow::Result<()> {
	tracing::info!(revert, "Applying migration");

	let mut tx = db.begin().await.context("Failed to start transaction")?;

	let version = if revert {
		migration.down(&mut *tx).await.context("Failed to revert migration")?;
		migration.version() - 1
	} else {
		migration.up(&mut *tx).await.context("Failed to apply migration")?;
		migration.version()
	};

	sqlx::query("UPDATE grooming_migrations SET version = $1")
		.bind(version)
		.execute(&mut *tx)
		.await
		.context("Failed to update migration version")?;

	tx.commit().await.context("Failed to commit transaction")?;

	tracing::info!("Migration applied");

	Ok(())
}

/// Brings the schema up to the newest known version.
#[tracing::instrument(skip(db))]
pub async fn run_migrations(db: &PgPool) -> anyhow::Result<()> {
	let version = current_version(db).await?;

	if version > MIGRATIONS.len() {
		anyhow::bail!(
			"Database is at version {}, but only {} migrations are available",
			version,
			MIGRATIONS.len()
		);
	}

	for migration in MIGRATIONS.iter().skip(version) {
		apply(db, *migration, false).await?;
	}

	Ok(())
}

/// Reverts migrations until the schema is at `target`.
#[tracing::instrument(skip(db))]
pub async fn revert_migrations(db: &PgPool, target: usize) -> anyhow::Result<()> {
	let version = current_version(db).await?;

	for migration in MIGRATIONS.iter().take(version.min(MIGRATIONS.len())).skip(target).rev() {
		apply(db, *migration, true).await?;
	}

	Ok(())
}

pub async fn schema_version(db: &PgPool) -> anyhow::Result<usize> {
	current_version(db).await
}
