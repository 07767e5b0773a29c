/// Stores an enum as its text representation.
macro_rules! text_enum {
	($ty:ty) => {
		impl sqlx::Type<sqlx::Postgres> for $ty {
			fn type_info() -> sqlx::postgres::PgTypeInfo {
				<String as sqlx::Type<sqlx::Postgres>>::type_info()
			}

			fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
				<String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
			}
		}

		impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $ty {
			fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
				<&str as sqlx::Encode<'q, sqlx::Postgres>>::encode(self.as_str(), buf)
			}
		}

		impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $ty {
			fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
				let value = <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
				Ok(value.parse()?)
			}
		}

		impl serde::Serialize for $ty {
			fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
				serializer.serialize_str(self.as_str())
			}
		}

		impl<'de> serde::Deserialize<'de> for $ty {
			fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
				let value = <String as serde::Deserialize>::deserialize(deserializer)?;
				value.parse().map_err(serde::de::Error::custom)
			}
		}

		impl std::fmt::Display for $ty {
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				f.write_str(self.as_str())
			}
		}
	};
}

pub(crate) use text_enum;

mod appointment;
mod availability_rule;
mod customer;
mod customer_phone;
mod daily_note;
mod date_marking;
mod dog;
mod service_history;

pub mod time_format;

pub use appointment::*;
pub use availability_rule::*;
pub use customer::*;
pub use customer_phone::*;
pub use daily_note::*;
pub use date_marking::*;
pub use dog::*;
pub use service_history::*;

/// Error code postgres reports for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
	err.as_database_error()
		.and_then(|err| err.code())
		.is_some_and(|code| code == UNIQUE_VIOLATION)
}

/// Escapes `term` for use inside an `ILIKE` pattern and wraps it in `%`.
pub fn like_pattern(term: &str) -> String {
	let mut pattern = String::with_capacity(term.len() + 2);
	pattern.push('%');
	for c in term.chars() {
		if matches!(c, '%' | '_' | '\\') {
			pattern.push('\\');
		}
		pattern.push(c);
	}
	pattern.push('%');
	pattern
}

/// Parse failure of one of the text backed enums.
#[derive(Debug, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct InvalidValue {
	pub kind: &'static str,
	pub value: String,
}
