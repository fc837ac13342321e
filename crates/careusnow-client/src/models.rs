//! Records exchanged with the remote service
//!
//! Field names follow the document service's camelCase attributes; the
//! document identifier travels as `$id`.

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateUserParams {
	pub name: String,
	pub email: String,
	pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
	#[serde(rename = "$id")]
	pub id: String,
	pub name: String,
	pub email: String,
	#[serde(default)]
	pub phone: String,
}

/// Binary document attached to a registration
#[derive(Clone, PartialEq, Eq)]
pub struct Document {
	pub file_name: String,
	pub content_type: String,
	pub bytes: Bytes,
}

impl fmt::Debug for Document {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Document")
			.field("file_name", &self.file_name)
			.field("content_type", &self.content_type)
			.field("len", &self.bytes.len())
			.finish()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
	#[serde(rename = "male")]
	Male,
	#[serde(rename = "female")]
	Female,
	#[serde(rename = "other")]
	Other,
}

impl Gender {
	/// Parse the option label shown on the registration page
	pub fn from_label(label: &str) -> Option<Self> {
		match label.to_ascii_lowercase().as_str() {
			"male" => Some(Self::Male),
			"female" => Some(Self::Female),
			"other" => Some(Self::Other),
			_ => None,
		}
	}
}

/// Everything the registration page collects about a patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPatientParams {
	pub user_id: String,
	pub name: String,
	pub email: String,
	pub phone: String,
	pub birth_date: NaiveDate,
	pub gender: Gender,
	pub address: String,
	pub occupation: String,
	pub emergency_contact_name: String,
	pub emergency_contact_number: String,
	pub primary_physician: String,
	pub insurance_provider: String,
	pub insurance_policy_number: String,
	pub allergies: Option<String>,
	pub current_medication: Option<String>,
	pub family_medical_history: Option<String>,
	pub past_medical_history: Option<String>,
	pub identification_type: String,
	pub identification_number: String,
	#[serde(skip)]
	pub identification_document: Option<Document>,
	pub treatment_consent: bool,
	pub disclosure_consent: bool,
	pub privacy_consent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
	#[serde(rename = "$id")]
	pub id: String,
	pub user_id: String,
	pub name: String,
	pub email: String,
	pub phone: String,
	#[serde(default)]
	pub primary_physician: Option<String>,
	#[serde(default)]
	pub identification_type: Option<String>,
	#[serde(default)]
	pub identification_document_id: Option<String>,
	#[serde(default)]
	pub identification_document_url: Option<String>,
	#[serde(default)]
	pub privacy_consent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
	Pending,
	Scheduled,
	Cancelled,
}

impl AppointmentStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Pending => "pending",
			Self::Scheduled => "scheduled",
			Self::Cancelled => "cancelled",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentParams {
	pub user_id: String,
	/// Patient document id
	pub patient: String,
	pub primary_physician: String,
	pub schedule: DateTime<Utc>,
	pub status: AppointmentStatus,
	pub reason: String,
	pub note: Option<String>,
	pub cancellation_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
	#[serde(rename = "$id")]
	pub id: String,
	pub user_id: String,
	pub patient: String,
	pub primary_physician: String,
	pub schedule: DateTime<Utc>,
	pub status: AppointmentStatus,
	#[serde(default)]
	pub reason: String,
	#[serde(default)]
	pub note: Option<String>,
	#[serde(default)]
	pub cancellation_reason: Option<String>,
}

/// Metadata of a stored file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredFile {
	#[serde(rename = "$id")]
	pub id: String,
	#[serde(default)]
	pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserList {
	pub users: Vec<User>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DocumentList<T> {
	pub documents: Vec<T>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_patient_params_serialize_camel_case_without_document() {
		// Arrange
		let params = RegisterPatientParams {
			user_id: "u1".to_string(),
			name: "Ada".to_string(),
			email: "ada@example.com".to_string(),
			phone: "+8801234567890".to_string(),
			birth_date: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
			gender: Gender::Female,
			address: "14th Street".to_string(),
			occupation: "Engineer".to_string(),
			emergency_contact_name: "Byron".to_string(),
			emergency_contact_number: "+8801987654321".to_string(),
			primary_physician: "Leila Cameron".to_string(),
			insurance_provider: "BlueCross".to_string(),
			insurance_policy_number: "ABC".to_string(),
			allergies: None,
			current_medication: None,
			family_medical_history: None,
			past_medical_history: None,
			identification_type: "Passport".to_string(),
			identification_number: "X1".to_string(),
			identification_document: Some(Document {
				file_name: "id.png".to_string(),
				content_type: "image/png".to_string(),
				bytes: Bytes::from_static(b"png"),
			}),
			treatment_consent: true,
			disclosure_consent: true,
			privacy_consent: true,
		};

		// Act
		let value = serde_json::to_value(&params).unwrap();

		// Assert
		assert_eq!(value["userId"], json!("u1"));
		assert_eq!(value["birthDate"], json!("1990-04-12"));
		assert_eq!(value["gender"], json!("female"));
		assert_eq!(value["emergencyContactNumber"], json!("+8801987654321"));
		assert!(value.get("identificationDocument").is_none());
	}

	#[rstest]
	fn test_appointment_deserializes_service_timestamps() {
		let appointment: Appointment = serde_json::from_value(json!({
			"$id": "a1",
			"$createdAt": "2024-06-01T10:00:00.000+00:00",
			"userId": "u1",
			"patient": "p1",
			"primaryPhysician": "John Green",
			"schedule": "2024-07-01T09:30:00.000+00:00",
			"status": "pending",
			"reason": "Checkup"
		}))
		.unwrap();

		assert_eq!(appointment.id, "a1");
		assert_eq!(appointment.status, AppointmentStatus::Pending);
		assert_eq!(appointment.note, None);
	}

	#[rstest]
	#[case("Male", Some(Gender::Male))]
	#[case("female", Some(Gender::Female))]
	#[case("unknown", None)]
	fn test_gender_from_label(#[case] label: &str, #[case] expected: Option<Gender>) {
		assert_eq!(Gender::from_label(label), expected);
	}
}
