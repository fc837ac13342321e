//! Snapshot of a validated form handed to a submission handler

use crate::file::UploadedFile;
use crate::value::FieldValue;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

/// Cleaned values of one valid form plus at most one file attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
	form: String,
	values: BTreeMap<String, FieldValue>,
	attachment: Option<(String, UploadedFile)>,
}

impl SubmissionPayload {
	pub(crate) fn new(
		form: String,
		values: BTreeMap<String, FieldValue>,
		attachment: Option<(String, UploadedFile)>,
	) -> Self {
		Self {
			form,
			values,
			attachment,
		}
	}

	/// Name of the form that produced the payload
	pub fn form(&self) -> &str {
		&self.form
	}

	pub fn get(&self, name: &str) -> Option<&FieldValue> {
		self.values.get(name)
	}

	/// Text value of a field; `None` when the field was left empty
	pub fn text(&self, name: &str) -> Option<&str> {
		self.values.get(name).and_then(FieldValue::as_text)
	}

	pub fn flag(&self, name: &str) -> bool {
		self.values
			.get(name)
			.and_then(FieldValue::as_bool)
			.unwrap_or(false)
	}

	pub fn date(&self, name: &str) -> Option<NaiveDate> {
		match self.values.get(name) {
			Some(FieldValue::Date(d)) => Some(*d),
			_ => None,
		}
	}

	pub fn date_time(&self, name: &str) -> Option<NaiveDateTime> {
		self.values.get(name).and_then(FieldValue::as_date_time)
	}

	/// Field name and contents of the attached file
	pub fn attachment(&self) -> Option<(&str, &UploadedFile)> {
		self.attachment
			.as_ref()
			.map(|(name, file)| (name.as_str(), file))
	}

	pub fn take_attachment(&mut self) -> Option<(String, UploadedFile)> {
		self.attachment.take()
	}

	/// Non-file values as a JSON object keyed by field name
	pub fn to_json(&self) -> serde_json::Map<String, serde_json::Value> {
		self.values
			.iter()
			.filter_map(|(name, value)| value.to_json().map(|json| (name.clone(), json)))
			.collect()
	}
}
