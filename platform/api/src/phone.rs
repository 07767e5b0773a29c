//! Phone number validation. Numbers are stored as digits only; local
//! landlines have 8 digits and mobiles or numbers with an area code have 10.

use crate::database::NewPhone;

pub const VALID_LENGTHS: [usize; 2] = [8, 10];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("phone number must have 8 or 10 digits, got {digits}")]
pub struct PhoneError {
	pub digits: usize,
}

pub fn digits(input: &str) -> String {
	input.chars().filter(char::is_ascii_digit).collect()
}

pub fn validate(input: &str) -> Result<String, PhoneError> {
	let digits = digits(input);

	if VALID_LENGTHS.contains(&digits.len()) {
		Ok(digits)
	} else {
		Err(PhoneError { digits: digits.len() })
	}
}

/// Blank input means no phone was given.
pub fn validate_optional(input: Option<&str>) -> Result<Option<String>, PhoneError> {
	match input.map(str::trim).filter(|s| !s.is_empty()) {
		Some(input) => validate(input).map(Some),
		None => Ok(None),
	}
}

/// A phone as it arrives in a request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct PhoneInput {
	pub phone_owner: Option<String>,
	pub phone: String,
	pub phone_type: Option<String>,
	pub is_primary: bool,
}

impl PhoneInput {
	pub fn validate(self) -> Result<NewPhone, PhoneError> {
		Ok(NewPhone {
			phone: validate(&self.phone)?,
			phone_owner: self.phone_owner.filter(|s| !s.trim().is_empty()),
			phone_type: self.phone_type.filter(|s| !s.trim().is_empty()),
			is_primary: self.is_primary,
		})
	}
}
