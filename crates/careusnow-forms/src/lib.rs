//! Form handling for the CareUsNow intake pages
//!
//! This crate provides:
//! - Field descriptors over a closed set of field kinds
//! - Validation with one error per field
//! - HTML rendering of bound fields and submit buttons
//! - A single-file picker for document uploads
//! - The user, patient and appointment schemas

pub mod bound_field;
pub mod constants;
pub mod field;
pub mod file;
pub mod form;
pub mod payload;
pub mod rendering;
pub mod schemas;
pub mod validators;
pub mod value;

pub use bound_field::BoundField;
pub use field::{
	CheckboxConfig, Choice, ChoiceConfig, DateConfig, FieldDescriptor, FieldError, FieldKind,
	FieldResult, FieldType, PhoneConfig, TextConfig, TextFormat,
};
pub use file::{FileConfig, FilePicker, FileUploadError, UploadedFile};
pub use form::{ALL_FIELDS_KEY, Form, FormError, FormResult, SubmitError};
pub use payload::SubmissionPayload;
pub use rendering::SubmitButton;
pub use schemas::{AppointmentAction, appointment_form, patient_form, user_form};
pub use value::FieldValue;
