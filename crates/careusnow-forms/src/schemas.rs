//! Intake form schemas
//!
//! Each constructor returns a fresh [`Form`] whose descriptors encode the
//! validation rules of one page: the minimal user form on the landing page,
//! the full patient registration form, and the appointment forms.

use crate::constants::{doctor_choices, gender_choices, identification_choices};
use crate::field::{DateConfig, FieldDescriptor};
use crate::file::FileConfig;
use crate::form::{Form, FormResult};
use std::fmt;
use std::str::FromStr;

pub const USER_FORM: &str = "user";
pub const PATIENT_FORM: &str = "patient";

pub const NAME_MAX_LENGTH: usize = 50;
pub const PHONE_PLACEHOLDER: &str = "+8801XXXXXXXXX";

fn name_field() -> FieldDescriptor {
	FieldDescriptor::text("name")
		.required()
		.with_length(Some(1), Some(NAME_MAX_LENGTH))
		.with_label("Full Name")
		.with_placeholder("A Patient Name")
		.with_icon("/assets/icons/user.svg", "user")
}

fn email_field() -> FieldDescriptor {
	FieldDescriptor::email("email")
		.required()
		.with_label("Email")
		.with_placeholder("name@email.com")
		.with_icon("/assets/icons/email.svg", "email")
}

fn phone_field() -> FieldDescriptor {
	FieldDescriptor::phone("phone")
		.required()
		.with_label("Phone Number")
		.with_placeholder(PHONE_PLACEHOLDER)
}

fn optional_notes(name: &str, label: &str, placeholder: &str) -> FieldDescriptor {
	FieldDescriptor::textarea(name)
		.with_length(None, Some(1000))
		.with_label(label)
		.with_placeholder(placeholder)
}

fn consent(name: &str, label: &str, subject: &str) -> FieldDescriptor {
	FieldDescriptor::checkbox(name)
		.required()
		.with_label(label)
		.with_unchecked_message(format!(
			"You must consent to {} in order to proceed",
			subject
		))
}

/// Landing-page form: name, email and phone
///
/// # Examples
///
/// ```
/// use careusnow_forms::schemas::user_form;
///
/// let mut form = user_form().unwrap();
/// form.bind([("name", ""), ("email", "bad"), ("phone", "123")]);
/// assert!(!form.validate());
/// assert_eq!(form.errors().len(), 3);
/// ```
pub fn user_form() -> FormResult<Form> {
	Form::from_fields(USER_FORM, [name_field(), email_field(), phone_field()])
}

/// Full patient registration form
pub fn patient_form() -> FormResult<Form> {
	Form::from_fields(
		PATIENT_FORM,
		[
			// Personal information
			name_field(),
			email_field(),
			phone_field(),
			FieldDescriptor::date("birthDate", DateConfig::default())
				.required()
				.with_label("Date of Birth"),
			FieldDescriptor::radio("gender", gender_choices())
				.required()
				.with_label("Gender"),
			FieldDescriptor::text("address")
				.required()
				.with_length(Some(5), Some(500))
				.with_label("Address")
				.with_placeholder("14th Street, New York"),
			FieldDescriptor::text("occupation")
				.required()
				.with_length(Some(2), Some(500))
				.with_label("Occupation")
				.with_placeholder("Software Developer"),
			FieldDescriptor::text("emergencyContactName")
				.required()
				.with_length(Some(2), Some(50))
				.with_label("Emergency Contact Name")
				.with_placeholder("Guardian's name"),
			FieldDescriptor::phone("emergencyContactNumber")
				.required()
				.with_label("Emergency Contact Number")
				.with_placeholder(PHONE_PLACEHOLDER),
			// Medical information
			FieldDescriptor::select("primaryPhysician", doctor_choices())
				.required()
				.with_label("Primary Physician")
				.with_placeholder("Select a physician"),
			FieldDescriptor::text("insuranceProvider")
				.required()
				.with_length(Some(2), Some(50))
				.with_label("Insurance Provider")
				.with_placeholder("BlueCross BlueShield"),
			FieldDescriptor::text("insurancePolicyNumber")
				.required()
				.with_length(Some(2), Some(50))
				.with_label("Insurance Policy Number")
				.with_placeholder("ABC123456789"),
			optional_notes("allergies", "Allergies (if any)", "Peanuts, Penicillin, Pollen"),
			optional_notes(
				"currentMedication",
				"Current Medication",
				"Ibuprofen 200mg, Paracetamol 500mg",
			),
			optional_notes("familyMedicalHistory", "Family Medical History", "None"),
			optional_notes("pastMedicalHistory", "Past Medical History", "None"),
			// Identification and verification
			FieldDescriptor::select("identificationType", identification_choices())
				.required()
				.with_label("Identification Type")
				.with_placeholder("Select identification type"),
			FieldDescriptor::text("identificationNumber")
				.required()
				.with_length(Some(1), Some(50))
				.with_label("Identification Number")
				.with_placeholder("123456789"),
			FieldDescriptor::file("identificationDocument", FileConfig::images())
				.with_label("Scanned Copy of Identification Document"),
			// Consent and privacy
			consent("treatmentConsent", "I consent to treatment", "treatment"),
			consent(
				"disclosureConsent",
				"I consent to disclosure of information",
				"disclosure",
			),
			consent("privacyConsent", "I consent to privacy policy", "privacy"),
		],
	)
}

/// What an appointment form does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppointmentAction {
	Create,
	Schedule,
	Cancel,
}

impl AppointmentAction {
	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::Create => "create",
			Self::Schedule => "schedule",
			Self::Cancel => "cancel",
		}
	}

	pub const fn form_name(&self) -> &'static str {
		match self {
			Self::Create => "appointment-create",
			Self::Schedule => "appointment-schedule",
			Self::Cancel => "appointment-cancel",
		}
	}

	pub const fn button_label(&self) -> &'static str {
		match self {
			Self::Create => "Create Appointment",
			Self::Schedule => "Schedule Appointment",
			Self::Cancel => "Cancel Appointment",
		}
	}

	/// Appointment status recorded for this action
	pub const fn status(&self) -> &'static str {
		match self {
			Self::Create => "pending",
			Self::Schedule => "scheduled",
			Self::Cancel => "cancelled",
		}
	}
}

impl fmt::Display for AppointmentAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for AppointmentAction {
	type Err = crate::field::FieldError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"create" => Ok(Self::Create),
			"schedule" => Ok(Self::Schedule),
			"cancel" => Ok(Self::Cancel),
			other => Err(crate::field::FieldError::Invalid(format!(
				"unknown appointment action: {}",
				other
			))),
		}
	}
}

/// Appointment form for the given action
///
/// Create and schedule pick a doctor and a time; create also needs a
/// reason. Cancel only asks why.
pub fn appointment_form(action: AppointmentAction) -> FormResult<Form> {
	let fields = match action {
		AppointmentAction::Cancel => vec![
			FieldDescriptor::textarea("cancellationReason")
				.required()
				.with_length(Some(2), Some(500))
				.with_label("Reason for cancellation")
				.with_placeholder("Enter reason for cancellation"),
		],
		AppointmentAction::Create | AppointmentAction::Schedule => {
			let mut reason = FieldDescriptor::textarea("reason")
				.with_length(None, Some(500))
				.with_label("Reason for appointment")
				.with_placeholder("Enter reason for appointment");
			if action == AppointmentAction::Create {
				reason = reason.required().with_length(Some(2), Some(500));
			}
			vec![
				FieldDescriptor::select("primaryPhysician", doctor_choices())
					.required()
					.with_label("Doctor")
					.with_placeholder("Select a doctor"),
				FieldDescriptor::date("schedule", DateConfig::with_time())
					.required()
					.with_label("Expected appointment date"),
				reason,
				optional_notes("notes", "Notes for appointment", "Enter notes for appointment"),
			]
		}
	};
	Form::from_fields(action.form_name(), fields)
}
