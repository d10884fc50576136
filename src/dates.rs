//! Permissive date parsing and restricted date formatting
//!
//! Parsing accepts RFC 3339 and a fixed set of common layouts, followed by
//! any extra formats configured in [`Settings`](crate::Settings). Naive
//! datetimes are assumed to be UTC; offset datetimes are converted to UTC.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};

const OFFSET_DATETIME_FORMATS: &[&str] = &[
	"%Y-%m-%dT%H:%M:%S%.f%z",
	"%Y-%m-%d %H:%M:%S%.f%z",
	"%Y-%m-%dT%H:%M%z",
	"%Y-%m-%d %H:%M%z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
	"%Y-%m-%dT%H:%M:%S%.f",
	"%Y-%m-%d %H:%M:%S%.f",
	"%Y-%m-%dT%H:%M",
	"%Y-%m-%d %H:%M",
	"%d/%m/%Y %H:%M:%S",
	"%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
	"%Y-%m-%d",
	"%Y%m%d",
	"%d/%m/%Y",
	"%d %B %Y",
	"%d %b %Y",
	"%B %d, %Y",
	"%b %d, %Y",
];

const MONTH_NAMES: [&str; 12] = [
	"January",
	"February",
	"March",
	"April",
	"May",
	"June",
	"July",
	"August",
	"September",
	"October",
	"November",
	"December",
];

/// Error for a format string using a directive outside the supported set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid format directive '%{directive}'")]
pub struct FormatError {
	pub directive: String,
}

fn is_leap_second(dt: &NaiveDateTime) -> bool {
	dt.nanosecond() >= 1_000_000_000
}

fn parse_offset(input: &str) -> Option<DateTime<chrono::FixedOffset>> {
	DateTime::parse_from_rfc3339(input)
		.ok()
		.or_else(|| {
			OFFSET_DATETIME_FORMATS
				.iter()
				.find_map(|format| DateTime::parse_from_str(input, format).ok())
		})
		.filter(|dt| !is_leap_second(&dt.naive_utc()))
}

fn parse_naive<'a, I>(input: &str, extra: I) -> Option<NaiveDateTime>
where
	I: IntoIterator<Item = &'a str>,
{
	NAIVE_DATETIME_FORMATS
		.iter()
		.copied()
		.chain(extra)
		.find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
		.filter(|dt| !is_leap_second(dt))
}

fn parse_date_only<'a, I>(input: &str, extra: I) -> Option<NaiveDate>
where
	I: IntoIterator<Item = &'a str>,
{
	DATE_FORMATS
		.iter()
		.copied()
		.chain(extra)
		.find_map(|format| NaiveDate::parse_from_str(input, format).ok())
}

/// Parse a datetime, normalising to UTC
///
/// A bare date parses as midnight UTC.
///
/// # Examples
///
/// ```
/// use reinhardt_marshal::dates::parse_datetime;
///
/// let dt = parse_datetime("2001-02-03T12:34:56+01:00", &[]).unwrap();
/// assert_eq!(dt.to_rfc3339(), "2001-02-03T11:34:56+00:00");
/// ```
pub fn parse_datetime(input: &str, extra_formats: &[String]) -> Option<DateTime<Utc>> {
	let input = input.trim();
	if input.is_empty() {
		return None;
	}

	if let Some(dt) = parse_offset(input) {
		return Some(dt.with_timezone(&Utc));
	}
	if let Some(dt) = parse_naive(input, extra_formats.iter().map(String::as_str)) {
		return Some(dt.and_utc());
	}
	parse_date_only(input, std::iter::empty()).map(date_to_datetime)
}

/// Parse a calendar date
///
/// Datetime input is accepted and truncated to its (local) calendar date.
pub fn parse_date(input: &str, extra_formats: &[String]) -> Option<NaiveDate> {
	let input = input.trim();
	if input.is_empty() {
		return None;
	}

	parse_date_only(input, extra_formats.iter().map(String::as_str))
		.or_else(|| parse_naive(input, std::iter::empty()).map(|dt| dt.date()))
		.or_else(|| parse_offset(input).map(|dt| dt.naive_local().date()))
}

/// Midnight UTC on `date`
pub fn date_to_datetime(date: NaiveDate) -> DateTime<Utc> {
	date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// `strftime` restricted to a fixed directive set
///
/// Supports `%% %Y %y %B %b %m %d %H %I %p %M %S %f`. Years are always
/// zero-padded to four digits, so dates before 1000 format predictably.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use reinhardt_marshal::dates::{date_to_datetime, safe_strftime};
///
/// let dt = date_to_datetime(NaiveDate::from_ymd_opt(999, 2, 3).unwrap());
/// assert_eq!(safe_strftime(&dt, "%d %B %Y").unwrap(), "03 February 0999");
/// assert!(safe_strftime(&dt, "%j").is_err());
/// ```
pub fn safe_strftime(value: &DateTime<Utc>, format: &str) -> Result<String, FormatError> {
	let mut out = String::with_capacity(format.len() + 8);
	let mut chars = format.chars();

	while let Some(c) = chars.next() {
		if c != '%' {
			out.push(c);
			continue;
		}

		let directive = chars.next().ok_or_else(|| FormatError {
			directive: String::new(),
		})?;
		match directive {
			'%' => out.push('%'),
			'Y' => out.push_str(&format!("{:04}", value.year())),
			'y' => {
				let year = format!("{:04}", value.year());
				out.push_str(&year[year.len() - 2..]);
			}
			'B' => out.push_str(MONTH_NAMES[value.month0() as usize]),
			'b' => out.push_str(&MONTH_NAMES[value.month0() as usize][..3]),
			'm' => out.push_str(&format!("{:02}", value.month())),
			'd' => out.push_str(&format!("{:02}", value.day())),
			'H' => out.push_str(&format!("{:02}", value.hour())),
			'I' => out.push_str(&format!("{:02}", value.hour() % 12)),
			'p' => out.push_str(if value.hour() >= 12 { "PM" } else { "AM" }),
			'M' => out.push_str(&format!("{:02}", value.minute())),
			'S' => out.push_str(&format!("{:02}", value.second())),
			'f' => out.push_str(&format!("{:06}", value.nanosecond() / 1_000)),
			other => {
				return Err(FormatError {
					directive: other.to_string(),
				});
			}
		}
	}

	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use rstest::rstest;

	fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
		Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
	}

	#[rstest]
	#[case("2001-02-03 12:34:56", utc(2001, 2, 3, 12, 34, 56))]
	#[case("2001-02-03T12:34:56", utc(2001, 2, 3, 12, 34, 56))]
	#[case("2001-02-03T12:34:56-01:00", utc(2001, 2, 3, 13, 34, 56))]
	#[case("2001-02-03T12:34:56+01:00", utc(2001, 2, 3, 11, 34, 56))]
	#[case("2001-02-03T12:34:56Z", utc(2001, 2, 3, 12, 34, 56))]
	#[case("2001-02-03", utc(2001, 2, 3, 0, 0, 0))]
	#[case("  2001-02-03  ", utc(2001, 2, 3, 0, 0, 0))]
	fn test_parse_datetime(#[case] input: &str, #[case] expected: DateTime<Utc>) {
		assert_eq!(parse_datetime(input, &[]), Some(expected));
	}

	#[rstest]
	#[case("2001-13-03T12:34:56")]
	#[case("2001-02-29T12:34:56")]
	#[case("2001-02-03T24:34:56")]
	#[case("2001-02-03T12:60:56")]
	#[case("2001-02-03T12:34:60")]
	#[case("hello")]
	#[case("")]
	fn test_parse_datetime_invalid(#[case] input: &str) {
		assert_eq!(parse_datetime(input, &[]), None);
	}

	#[rstest]
	#[case("2001-02-03", NaiveDate::from_ymd_opt(2001, 2, 3))]
	#[case("0999-2-3", NaiveDate::from_ymd_opt(999, 2, 3))]
	#[case("2001-02-03T12:34:56", NaiveDate::from_ymd_opt(2001, 2, 3))]
	#[case("2001-02-03 12:34:56", NaiveDate::from_ymd_opt(2001, 2, 3))]
	#[case("2001-02-29", None)]
	#[case("2001-13-03", None)]
	fn test_parse_date(#[case] input: &str, #[case] expected: Option<NaiveDate>) {
		assert_eq!(parse_date(input, &[]), expected);
	}

	#[rstest]
	fn test_extra_formats() {
		// Arrange
		let formats = vec!["%Y/%j".to_string()];

		// Act
		let parsed = parse_date("2001/034", &formats);

		// Assert
		assert_eq!(parsed, NaiveDate::from_ymd_opt(2001, 2, 3));
		assert_eq!(parse_date("2001/034", &[]), None);
	}

	#[rstest]
	#[case("%d/%m/%Y", "03/02/2001")]
	#[case("%d %b %y", "03 Feb 01")]
	#[case("%I:%M %p", "01:04 PM")]
	#[case("%H:%M:%S.%f", "13:04:05.000000")]
	#[case("100%%", "100%")]
	fn test_safe_strftime(#[case] format: &str, #[case] expected: &str) {
		let dt = utc(2001, 2, 3, 13, 4, 5);
		assert_eq!(safe_strftime(&dt, format).unwrap(), expected);
	}

	#[rstest]
	fn test_safe_strftime_rejects_unknown_directive() {
		let dt = utc(2001, 2, 3, 0, 0, 0);
		assert_eq!(
			safe_strftime(&dt, "%A"),
			Err(FormatError {
				directive: "A".to_string()
			})
		);
	}
}
