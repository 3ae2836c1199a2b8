use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// The zone every rendered time is shown in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayZone {
	Local,
	Named(Tz),
}

impl DisplayZone {
	pub fn parse(name: Option<&str>) -> anyhow::Result<Self> {
		match name {
			None => Ok(DisplayZone::Local),
			Some(name) => match name.parse::<Tz>() {
				Ok(tz) => Ok(DisplayZone::Named(tz)),
				Err(e) => Err(anyhow::Error::msg(format!("{e}"))),
			},
		}
	}

	pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
		match self {
			DisplayZone::Local => instant.with_timezone(&chrono::Local).fixed_offset(),
			DisplayZone::Named(tz) => instant.with_timezone(tz).fixed_offset(),
		}
	}

	pub fn now(&self) -> DateTime<FixedOffset> {
		self.localize(Utc::now())
	}

	/// Calendar date used for the cache freshness check.
	pub fn today(&self) -> NaiveDate {
		self.now().date_naive()
	}
}

/// `3:07:45 PM`
pub fn clock_string<T: TimeZone>(time: &DateTime<T>) -> String
where
	T::Offset: fmt::Display,
{
	time.format("%-I:%M:%S %p").to_string()
}

/// `7:42 PM`
pub fn sunset_string<T: TimeZone>(time: &DateTime<T>) -> String
where
	T::Offset: fmt::Display,
{
	time.format("%-I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn at(rfc3339: &str) -> DateTime<Utc> {
		DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
	}

	#[test]
	fn clock_uses_twelve_hour_time_with_seconds() {
		let zone = DisplayZone::Named(Tz::UTC);
		assert_eq!(clock_string(&zone.localize(at("2026-10-19T15:07:45Z"))), "3:07:45 PM");
		assert_eq!(clock_string(&zone.localize(at("2026-10-19T00:05:09Z"))), "12:05:09 AM");
	}

	#[test]
	fn sunset_drops_seconds() {
		let zone = DisplayZone::Named(Tz::UTC);
		assert_eq!(sunset_string(&zone.localize(at("2026-06-21T19:30:59Z"))), "7:30 PM");
		assert_eq!(sunset_string(&zone.localize(at("2026-06-21T11:02:00Z"))), "11:02 AM");
	}

	#[test]
	fn named_zone_shifts_instant() {
		let zone = DisplayZone::parse(Some("America/New_York")).unwrap();
		// EDT is UTC-4 in October.
		let local = zone.localize(at("2026-10-19T22:15:00Z"));
		assert_eq!(sunset_string(&local), "6:15 PM");
		assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
	}

	#[test]
	fn unknown_zone_is_rejected() {
		assert!(DisplayZone::parse(Some("Mars/Olympus_Mons")).is_err());
		assert_eq!(DisplayZone::parse(None).unwrap(), DisplayZone::Local);
	}
}
