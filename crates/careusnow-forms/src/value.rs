//! Values held by bound form fields

use crate::file::UploadedFile;
use chrono::{NaiveDate, NaiveDateTime};

/// Format used to echo a date back into a `type="date"` input
pub const DATE_VALUE_FORMAT: &str = "%Y-%m-%d";
/// Format used to echo a date-time back into a `type="datetime-local"` input
pub const DATETIME_VALUE_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
	Text(String),
	Date(NaiveDate),
	DateTime(NaiveDateTime),
	File(UploadedFile),
	Bool(bool),
	#[default]
	Empty,
}

impl FieldValue {
	/// Whether the value counts as "not provided"
	///
	/// Whitespace-only text is empty; `Bool(false)` is not.
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Empty => true,
			Self::Text(s) => s.trim().is_empty(),
			_ => false,
		}
	}

	pub fn as_text(&self) -> Option<&str> {
		match self {
			Self::Text(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_date_time(&self) -> Option<NaiveDateTime> {
		match self {
			Self::DateTime(dt) => Some(*dt),
			_ => None,
		}
	}

	pub fn as_file(&self) -> Option<&UploadedFile> {
		match self {
			Self::File(f) => Some(f),
			_ => None,
		}
	}

	/// String placed in an input's `value` attribute when re-rendering
	pub fn display_value(&self) -> Option<String> {
		match self {
			Self::Text(s) => Some(s.clone()),
			Self::Date(d) => Some(d.format(DATE_VALUE_FORMAT).to_string()),
			Self::DateTime(dt) => Some(dt.format(DATETIME_VALUE_FORMAT).to_string()),
			Self::File(f) => Some(f.file_name.clone()),
			Self::Bool(b) => Some(b.to_string()),
			Self::Empty => None,
		}
	}

	/// JSON form of the value; files have no JSON form
	pub fn to_json(&self) -> Option<serde_json::Value> {
		match self {
			Self::Text(s) => Some(serde_json::Value::String(s.clone())),
			Self::Date(d) => Some(serde_json::Value::String(d.format(DATE_VALUE_FORMAT).to_string())),
			Self::DateTime(dt) => Some(serde_json::Value::String(
				dt.and_utc().to_rfc3339(),
			)),
			Self::Bool(b) => Some(serde_json::Value::Bool(*b)),
			Self::Empty => Some(serde_json::Value::Null),
			Self::File(_) => None,
		}
	}
}

impl From<&str> for FieldValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<String> for FieldValue {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl From<bool> for FieldValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(FieldValue::Empty, true)]
	#[case(FieldValue::Text("  ".to_string()), true)]
	#[case(FieldValue::Text("x".to_string()), false)]
	#[case(FieldValue::Bool(false), false)]
	fn test_is_empty(#[case] value: FieldValue, #[case] expected: bool) {
		assert_eq!(value.is_empty(), expected);
	}

	#[rstest]
	fn test_date_time_display_matches_datetime_local_input() {
		let dt = NaiveDate::from_ymd_opt(2024, 7, 1)
			.unwrap()
			.and_hms_opt(9, 5, 0)
			.unwrap();

		assert_eq!(
			FieldValue::DateTime(dt).display_value(),
			Some("2024-07-01T09:05".to_string())
		);
	}

	#[rstest]
	fn test_date_time_json_is_rfc3339_utc() {
		let dt = NaiveDate::from_ymd_opt(2024, 7, 1)
			.unwrap()
			.and_hms_opt(9, 5, 0)
			.unwrap();

		assert_eq!(
			FieldValue::DateTime(dt).to_json(),
			Some(serde_json::json!("2024-07-01T09:05:00+00:00"))
		);
	}
}
