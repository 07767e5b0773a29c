//! Which days and times can be booked.
//!
//! A weekly rule opens one time slot on one weekday, a specific rule opens
//! one time slot on one date. Disabled rules are ignored everywhere.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

use crate::config::ScheduleConfig;
use crate::database::{
	time_format, AvailabilityRule, Booking, DateMarking, MarkingType, NewMarking, NewRule, RuleType,
	DEFAULT_MARKING_COLOR,
};

/// 0 is Sunday, 6 is Saturday.
pub fn weekday_index(date: NaiveDate) -> i16 {
	date.weekday().num_days_from_sunday() as i16
}

pub fn rule_matches_date(rule: &AvailabilityRule, date: NaiveDate) -> bool {
	rule.is_enabled
		&& match rule.rule_type {
			RuleType::Weekly => rule.day_of_week == Some(weekday_index(date)),
			RuleType::Specific => rule.specific_date == Some(date),
		}
}

pub fn slot_is_available(rules: &[AvailabilityRule], date: NaiveDate, time: NaiveTime) -> bool {
	rules.iter().any(|rule| rule.time == time && rule_matches_date(rule, date))
}

/// Past days are never bookable.
pub fn date_is_bookable(rules: &[AvailabilityRule], date: NaiveDate, today: NaiveDate) -> bool {
	date >= today && rules.iter().any(|rule| rule_matches_date(rule, date))
}

pub fn marking_applies(marking: &DateMarking, date: NaiveDate) -> bool {
	match marking.marking_type {
		MarkingType::Weekly => marking.marking_day_of_week == Some(weekday_index(date)),
		MarkingType::Specific | MarkingType::Holiday => marking.marking_date == Some(date),
	}
}

/// The times shown for a day, from the first to the last slot inclusive.
pub fn time_slots(schedule: &ScheduleConfig) -> Vec<NaiveTime> {
	let step = Duration::minutes(i64::from(schedule.slot_minutes.max(1)));

	let mut slots = Vec::new();
	let mut current = schedule.first_slot;
	while current <= schedule.last_slot {
		slots.push(current);

		let (next, wrapped) = current.overflowing_add_signed(step);
		if wrapped != 0 || next <= current {
			break;
		}
		current = next;
	}

	slots
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SlotAvailability {
	#[serde(with = "time_format")]
	pub time: NaiveTime,
	/// An enabled rule opens this slot and it is not full.
	pub available: bool,
	pub booked: i64,
	/// The tightest limit among the rules opening this slot.
	pub limit: Option<i32>,
	pub full: bool,
}

/// Availability of every slot of `grid` plus any time a matching rule adds.
pub fn day_slots(
	rules: &[AvailabilityRule],
	bookings: &[Booking],
	date: NaiveDate,
	grid: &[NaiveTime],
) -> Vec<SlotAvailability> {
	let booked = bookings
		.iter()
		.map(|booking| (booking.appointment_time, booking.booked))
		.collect::<HashMap<_, _>>();

	// time -> (opened by a rule, tightest limit)
	let mut slots: BTreeMap<NaiveTime, (bool, Option<i32>)> = grid.iter().map(|time| (*time, (false, None))).collect();

	for rule in rules.iter().filter(|rule| rule_matches_date(rule, date)) {
		let (open, limit) = slots.entry(rule.time).or_insert((false, None));
		*open = true;
		*limit = match (*limit, rule.appointment_limit) {
			(Some(a), Some(b)) => Some(a.min(b)),
			(a, b) => a.or(b),
		};
	}

	slots
		.into_iter()
		.map(|(time, (open, limit))| {
			let booked = booked.get(&time).copied().unwrap_or(0);
			let full = limit.is_some_and(|limit| booked >= i64::from(limit));

			SlotAvailability {
				time,
				available: open && !full,
				booked,
				limit,
				full,
			}
		})
		.collect()
}

/// An availability rule as it arrives in a request body.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct RuleInput {
	#[serde(rename = "type")]
	pub rule_type: Option<String>,
	pub day_of_week: Option<i16>,
	pub specific_date: Option<NaiveDate>,
	#[serde(with = "time_format::option")]
	pub time: Option<NaiveTime>,
	pub is_enabled: Option<bool>,
	pub appointment_limit: Option<i32>,
}

impl RuleInput {
	/// Clears whichever of weekday and date the rule type does not use.
	pub fn validate(self) -> Result<NewRule, &'static str> {
		let (Some(rule_type), Some(time)) = (self.rule_type.as_deref(), self.time) else {
			return Err("type and time are required");
		};

		let rule_type = rule_type.parse::<RuleType>().map_err(|_| "type must be weekly or specific")?;

		let (day_of_week, specific_date) = match rule_type {
			RuleType::Weekly => match self.day_of_week {
				Some(day) if (0..=6).contains(&day) => (Some(day), None),
				Some(_) => return Err("day_of_week must be between 0 and 6"),
				None => return Err("day_of_week is required for weekly rules"),
			},
			RuleType::Specific => match self.specific_date {
				Some(date) => (None, Some(date)),
				None => return Err("specific_date is required for specific rules"),
			},
		};

		if self.appointment_limit.is_some_and(|limit| limit < 0) {
			return Err("appointment_limit must not be negative");
		}

		Ok(NewRule {
			rule_type,
			day_of_week,
			specific_date,
			time,
			is_enabled: self.is_enabled.unwrap_or(true),
			appointment_limit: self.appointment_limit,
		})
	}
}

/// A date marking as it arrives in a request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct MarkingInput {
	#[serde(rename = "type")]
	pub marking_type: Option<String>,
	pub marking_day_of_week: Option<i16>,
	pub marking_date: Option<NaiveDate>,
	pub color: Option<String>,
}

impl MarkingInput {
	pub fn validate(self) -> Result<NewMarking, &'static str> {
		let marking_type = self
			.marking_type
			.as_deref()
			.ok_or("type is required")?
			.parse::<MarkingType>()
			.map_err(|_| "type must be weekly, specific or holiday")?;

		let (marking_day_of_week, marking_date) = match marking_type {
			MarkingType::Weekly => match self.marking_day_of_week {
				Some(day) if (0..=6).contains(&day) => (Some(day), None),
				Some(_) => return Err("marking_day_of_week must be between 0 and 6"),
				None => return Err("marking_day_of_week is required for weekly markings"),
			},
			MarkingType::Specific | MarkingType::Holiday => match self.marking_date {
				Some(date) => (None, Some(date)),
				None => return Err("marking_date is required"),
			},
		};

		Ok(NewMarking {
			marking_type,
			marking_day_of_week,
			marking_date,
			color: self
				.color
				.map(|c| c.trim().to_string())
				.filter(|c| !c.is_empty())
				.unwrap_or_else(|| DEFAULT_MARKING_COLOR.to_string()),
		})
	}
}
