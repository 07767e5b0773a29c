//! `HH:MM` wire format for times of day. Seconds are accepted on input and
//! dropped on output.

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serializer};

const FORMAT: &str = "%H:%M";

pub fn parse(value: &str) -> Option<NaiveTime> {
	let value = value.trim();
	NaiveTime::parse_from_str(value, FORMAT)
		.or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
		.ok()
}

pub fn format(time: &NaiveTime) -> String {
	time.format(FORMAT).to_string()
}

pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
	serializer.serialize_str(&format(time))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
	let value = String::deserialize(deserializer)?;
	parse(&value).ok_or_else(|| serde::de::Error::custom(format!("invalid time: {value}")))
}

pub mod option {
	use chrono::NaiveTime;
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
		match time {
			Some(time) => super::serialize(time, serializer),
			None => serializer.serialize_none(),
		}
	}

	/// Empty strings read as `None`.
	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
		match Option::<String>::deserialize(deserializer)? {
			Some(value) if !value.trim().is_empty() => super::parse(&value)
				.map(Some)
				.ok_or_else(|| serde::de::Error::custom(format!("invalid time: {value}"))),
			_ => Ok(None),
		}
	}
}
