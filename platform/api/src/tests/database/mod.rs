//! Runs against the database in `DATABASE_URL`. Every test starts from empty
//! tables, so they all run serially.

mod appointments;
mod customers;
mod dogs;
mod migrations;
mod schedule;

#[test]
fn test_like_pattern() {
	assert_eq!(crate::database::like_pattern("rex"), "%rex%");
	assert_eq!(crate::database::like_pattern("100%_a\\b"), "%100\\%\\_a\\\\b%");
}
