use binary_helper::global::GlobalDb;
use serial_test::serial;

use crate::migration::{revert_migrations, run_migrations, schema_version};
use crate::tests::global::database_global;

#[serial]
#[tokio::test]
async fn test_migrations_up_and_down() {
	let Some((global, _handler)) = database_global().await else {
		return;
	};
	let db = global.db().as_ref();

	assert_eq!(schema_version(db).await.unwrap(), 1);

	revert_migrations(db, 0).await.unwrap();
	assert_eq!(schema_version(db).await.unwrap(), 0);

	let schema: Option<String> =
		sqlx::query_scalar("SELECT schema_name::TEXT FROM information_schema.schemata WHERE schema_name = 'grooming'")
			.fetch_optional(db)
			.await
			.unwrap();
	assert_eq!(schema, None);

	run_migrations(db).await.unwrap();
	assert_eq!(schema_version(db).await.unwrap(), 1);

	// Running again is a no-op.
	run_migrations(db).await.unwrap();
	assert_eq!(schema_version(db).await.unwrap(), 1);
}
