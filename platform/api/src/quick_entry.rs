//! The single line booking field: `"<dog> - <customer> <phone>"`.
//!
//! The phone may appear anywhere in the line. Without a dash the text is
//! split on the first space instead, and a single word is just the dog.

const MAX_PHONE_DIGITS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuickEntry {
	pub dog_name: String,
	pub customer_name: Option<String>,
	pub phone: Option<String>,
}

pub fn parse(input: &str) -> QuickEntry {
	let input = input.trim();

	let (phone, rest) = match first_digit_run(input) {
		Some((start, end)) => {
			let mut rest = String::with_capacity(input.len());
			rest.push_str(&input[..start]);
			rest.push_str(&input[end..]);
			(Some(input[start..end].to_string()), rest)
		}
		None => (None, input.to_string()),
	};

	let rest = rest.trim();

	let (dog, customer) = if let Some((dog, customer)) = rest.split_once('-') {
		(dog, Some(customer))
	} else if let Some((dog, customer)) = rest.split_once(' ') {
		(dog, Some(customer))
	} else {
		(rest, None)
	};

	QuickEntry {
		dog_name: dog.trim().to_string(),
		customer_name: customer.map(str::trim).filter(|c| !c.is_empty()).map(str::to_string),
		phone,
	}
}

/// Byte range of the first run of ASCII digits, capped at ten digits.
fn first_digit_run(input: &str) -> Option<(usize, usize)> {
	let start = input.find(|c: char| c.is_ascii_digit())?;
	let len = input[start..]
		.bytes()
		.take(MAX_PHONE_DIGITS)
		.take_while(u8::is_ascii_digit)
		.count();

	Some((start, start + len))
}
