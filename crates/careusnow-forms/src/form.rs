use crate::bound_field::BoundField;
use crate::field::{FieldDescriptor, FieldError};
use crate::file::{FilePicker, UploadedFile};
use crate::payload::SubmissionPayload;
use crate::value::FieldValue;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FormError {
	#[error("Field error in {field}: {error}")]
	Field { field: String, error: FieldError },
	#[error("Duplicate field: {0}")]
	DuplicateField(String),
	#[error("Unknown field: {0}")]
	UnknownField(String),
	#[error("Validation error: {0}")]
	Validation(String),
}

pub type FormResult<T> = Result<T, FormError>;

/// Outcome of a rejected or failed [`Form::submit`]
#[derive(Debug, thiserror::Error)]
pub enum SubmitError<E> {
	#[error("Form has {0} invalid field(s)")]
	Invalid(usize),
	#[error("A submission is already in progress")]
	InProgress,
	#[error("Submission failed: {0}")]
	Failed(#[source] E),
}

/// Special key for form-level (non-field-specific) errors.
pub const ALL_FIELDS_KEY: &str = "_all";

/// Form controller
///
/// Holds descriptors, current values and at most one error per field.
/// Values are kept across a failed submission so the page can be re-rendered
/// with what the user typed.
#[derive(Debug, Clone)]
pub struct Form {
	name: String,
	fields: Vec<FieldDescriptor>,
	values: HashMap<String, FieldValue>,
	errors: HashMap<String, String>,
	non_field_errors: Vec<String>,
	cleaned: HashMap<String, FieldValue>,
	is_bound: bool,
	validated: bool,
	loading: bool,
}

// Clears the loading flag however the submission future ends
struct LoadingGuard<'a>(&'a mut bool);

impl Drop for LoadingGuard<'_> {
	fn drop(&mut self) {
		*self.0 = false;
	}
}

impl Form {
	/// Create an empty form
	///
	/// # Examples
	///
	/// ```
	/// use careusnow_forms::Form;
	///
	/// let form = Form::new("patient");
	/// assert!(!form.is_bound());
	/// assert!(form.fields().is_empty());
	/// ```
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			fields: Vec::new(),
			values: HashMap::new(),
			errors: HashMap::new(),
			non_field_errors: Vec::new(),
			cleaned: HashMap::new(),
			is_bound: false,
			validated: false,
			loading: false,
		}
	}

	/// Create a form from a list of descriptors, rejecting duplicate names
	pub fn from_fields(
		name: impl Into<String>,
		fields: impl IntoIterator<Item = FieldDescriptor>,
	) -> FormResult<Self> {
		let mut form = Self::new(name);
		for field in fields {
			form.add_field(field)?;
		}
		Ok(form)
	}

	/// Add a field
	///
	/// # Examples
	///
	/// ```
	/// use careusnow_forms::{FieldDescriptor, Form, FormError};
	///
	/// let mut form = Form::new("user");
	/// form.add_field(FieldDescriptor::text("name")).unwrap();
	/// let dup = form.add_field(FieldDescriptor::email("name"));
	/// assert!(matches!(dup, Err(FormError::DuplicateField(_))));
	/// ```
	pub fn add_field(&mut self, field: FieldDescriptor) -> FormResult<()> {
		if self.field(&field.name).is_some() {
			return Err(FormError::DuplicateField(field.name));
		}
		self.fields.push(field);
		Ok(())
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn fields(&self) -> &[FieldDescriptor] {
		&self.fields
	}

	pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
		self.fields.iter().find(|f| f.name == name)
	}

	pub fn is_bound(&self) -> bool {
		self.is_bound
	}

	pub fn is_loading(&self) -> bool {
		self.loading
	}

	/// Set the value of a declared field
	///
	/// Any earlier validation result is discarded.
	pub fn set_value(&mut self, name: &str, value: impl Into<FieldValue>) -> FormResult<()> {
		if self.field(name).is_none() {
			return Err(FormError::UnknownField(name.to_string()));
		}
		self.values.insert(name.to_string(), value.into());
		self.is_bound = true;
		self.validated = false;
		self.cleaned.clear();
		self.errors.remove(name);
		Ok(())
	}

	/// Select a file for a file field, replacing any previous file
	pub fn select_file(&mut self, name: &str, file: UploadedFile) -> FormResult<()> {
		let mut picker = FilePicker::new();
		picker.select(file);
		self.set_value(name, picker.into_value())
	}

	/// Bind raw text pairs as submitted by a browser
	///
	/// Keys that are not declared fields are ignored. When a key repeats the
	/// last occurrence wins.
	pub fn bind<I, K, V>(&mut self, data: I)
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: Into<String>,
	{
		for (key, value) in data {
			let key = key.as_ref();
			if self.field(key).is_some() {
				self.values
					.insert(key.to_string(), FieldValue::Text(value.into()));
			}
		}
		self.is_bound = true;
		self.validated = false;
		self.cleaned.clear();
	}

	pub fn value(&self, name: &str) -> Option<&FieldValue> {
		self.values.get(name)
	}

	/// Validate every field and record at most one error per field
	///
	/// Returns whether the form is valid. The error map is complete: every
	/// failing field is reported, not only the first.
	pub fn validate(&mut self) -> bool {
		self.errors.clear();
		self.cleaned.clear();
		for field in &self.fields {
			let value = self.values.get(&field.name).unwrap_or(&FieldValue::Empty);
			match field.clean(value) {
				Ok(cleaned) => {
					self.cleaned.insert(field.name.clone(), cleaned);
				}
				Err(error) => {
					self.errors.insert(field.name.clone(), error.to_string());
				}
			}
		}
		self.validated = true;
		self.errors.is_empty()
	}

	pub fn is_valid(&self) -> bool {
		self.validated && self.errors.is_empty()
	}

	pub fn errors(&self) -> &HashMap<String, String> {
		&self.errors
	}

	pub fn error(&self, name: &str) -> Option<&str> {
		self.errors.get(name).map(String::as_str)
	}

	/// Record an error against a field, or against the whole form when the
	/// name is [`ALL_FIELDS_KEY`]
	pub fn add_error(&mut self, name: &str, message: impl Into<String>) -> FormResult<()> {
		if name == ALL_FIELDS_KEY {
			self.non_field_errors.push(message.into());
			return Ok(());
		}
		if self.field(name).is_none() {
			return Err(FormError::UnknownField(name.to_string()));
		}
		self.errors.insert(name.to_string(), message.into());
		Ok(())
	}

	pub fn non_field_errors(&self) -> &[String] {
		&self.non_field_errors
	}

	pub fn cleaned_data(&self) -> &HashMap<String, FieldValue> {
		&self.cleaned
	}

	/// Snapshot of the cleaned values of a validated, valid form
	pub fn payload(&self) -> FormResult<SubmissionPayload> {
		if !self.validated {
			return Err(FormError::Validation(
				"form must be validated before building a payload".to_string(),
			));
		}
		if let Some((field, message)) = self.errors.iter().next() {
			return Err(FormError::Field {
				field: field.clone(),
				error: FieldError::Validation(message.clone()),
			});
		}
		Ok(self.build_payload())
	}

	fn build_payload(&self) -> SubmissionPayload {
		let mut values = BTreeMap::new();
		let mut attachment = None;
		for field in &self.fields {
			match self.cleaned.get(&field.name) {
				Some(FieldValue::File(file)) if attachment.is_none() => {
					attachment = Some((field.name.clone(), file.clone()));
				}
				Some(FieldValue::File(_)) => {}
				Some(value) => {
					values.insert(field.name.clone(), value.clone());
				}
				None => {}
			}
		}
		SubmissionPayload::new(self.name.clone(), values, attachment)
	}

	/// Validate, then hand the payload to `handler`
	///
	/// The handler is never called when validation fails or when another
	/// submission of this form is still running. The loading flag is set for
	/// the duration of the handler and cleared when it settles.
	pub async fn submit<F, Fut, T, E>(&mut self, handler: F) -> Result<T, SubmitError<E>>
	where
		F: FnOnce(SubmissionPayload) -> Fut,
		Fut: Future<Output = Result<T, E>>,
	{
		if self.loading {
			return Err(SubmitError::InProgress);
		}
		if !self.validate() {
			return Err(SubmitError::Invalid(self.errors.len()));
		}
		let payload = self.build_payload();

		self.loading = true;
		let _guard = LoadingGuard(&mut self.loading);
		handler(payload).await.map_err(SubmitError::Failed)
	}

	pub fn bound_fields(&self) -> impl Iterator<Item = BoundField<'_>> {
		self.fields.iter().map(|field| self.bind_field(field))
	}

	pub fn bound_field(&self, name: &str) -> Option<BoundField<'_>> {
		self.field(name).map(|field| self.bind_field(field))
	}

	fn bind_field<'a>(&'a self, field: &'a FieldDescriptor) -> BoundField<'a> {
		BoundField::new(
			&self.name,
			field,
			self.values.get(&field.name),
			self.error(&field.name),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::field::Choice;
	use rstest::rstest;
	use std::cell::Cell;

	fn contact_form() -> Form {
		Form::from_fields(
			"contact",
			[
				FieldDescriptor::text("name").required().with_length(None, Some(50)),
				FieldDescriptor::email("email").required(),
				FieldDescriptor::radio("gender", vec![Choice::plain("Male"), Choice::plain("Female")]),
			],
		)
		.unwrap()
	}

	#[rstest]
	fn test_set_value_rejects_unknown_field() {
		// Arrange
		let mut form = contact_form();

		// Act
		let result = form.set_value("nickname", "Bob");

		// Assert
		assert!(matches!(result, Err(FormError::UnknownField(name)) if name == "nickname"));
		assert!(!form.is_bound());
	}

	#[rstest]
	fn test_validate_reports_every_failing_field_once() {
		// Arrange
		let mut form = contact_form();
		form.bind([("name", ""), ("email", "")]);

		// Act
		let valid = form.validate();

		// Assert
		assert!(!valid);
		assert_eq!(form.errors().len(), 2);
		assert_eq!(form.error("name"), Some("This field is required."));
		assert_eq!(form.error("email"), Some("This field is required."));
		assert_eq!(form.error("gender"), None);
	}

	#[rstest]
	fn test_bind_ignores_undeclared_keys_and_keeps_last_duplicate() {
		// Arrange
		let mut form = contact_form();

		// Act
		form.bind([("form_id", "abc"), ("name", "first"), ("name", "second")]);

		// Assert
		assert_eq!(form.value("name"), Some(&FieldValue::Text("second".to_string())));
		assert_eq!(form.value("form_id"), None);
	}

	#[rstest]
	fn test_payload_requires_valid_form() {
		// Arrange
		let mut form = contact_form();
		form.bind([("name", "Ada"), ("email", "nope")]);
		form.validate();

		// Act
		let result = form.payload();

		// Assert
		assert!(matches!(result, Err(FormError::Field { field, .. }) if field == "email"));
	}

	#[rstest]
	fn test_payload_collects_cleaned_values() {
		// Arrange
		let mut form = contact_form();
		form.bind([("name", " Ada "), ("email", "ada@example.com"), ("gender", "Female")]);
		assert!(form.validate());

		// Act
		let payload = form.payload().unwrap();

		// Assert
		assert_eq!(payload.form(), "contact");
		assert_eq!(payload.text("name"), Some("Ada"));
		assert_eq!(payload.to_json()["gender"], serde_json::json!("Female"));
	}

	#[rstest]
	fn test_add_error_to_whole_form() {
		let mut form = contact_form();

		form.add_error(ALL_FIELDS_KEY, "Service unavailable").unwrap();

		assert_eq!(form.non_field_errors(), ["Service unavailable".to_string()]);
		assert!(form.add_error("missing", "x").is_err());
	}

	#[rstest]
	#[tokio::test]
	async fn test_submit_with_errors_never_calls_handler() {
		// Arrange
		let mut form = contact_form();
		form.bind([("name", ""), ("email", "bad")]);
		let called = Cell::new(false);

		// Act
		let result: Result<(), SubmitError<std::io::Error>> = form
			.submit(|_| async {
				called.set(true);
				Ok(())
			})
			.await;

		// Assert
		assert!(matches!(result, Err(SubmitError::Invalid(2))));
		assert!(!called.get());
		assert!(!form.is_loading());
	}

	#[rstest]
	#[tokio::test]
	async fn test_failed_submit_keeps_values_and_resets_loading() {
		// Arrange
		let mut form = contact_form();
		form.bind([("name", "Ada"), ("email", "ada@example.com")]);

		// Act
		let result: Result<(), SubmitError<std::io::Error>> = form
			.submit(|_| async { Err(std::io::Error::other("boom")) })
			.await;

		// Assert
		assert!(matches!(result, Err(SubmitError::Failed(_))));
		assert!(!form.is_loading());
		assert_eq!(form.value("name"), Some(&FieldValue::Text("Ada".to_string())));
	}

	#[rstest]
	#[tokio::test]
	async fn test_successful_submit_returns_handler_output() {
		// Arrange
		let mut form = contact_form();
		form.bind([("name", "Ada"), ("email", "ada@example.com")]);

		// Act
		let result: Result<String, SubmitError<std::io::Error>> = form
			.submit(|payload| async move { Ok(payload.text("email").unwrap_or_default().to_string()) })
			.await;

		// Assert
		assert_eq!(result.unwrap(), "ada@example.com");
	}

	#[rstest]
	fn test_select_file_replaces_previous_selection() {
		// Arrange
		let mut form = Form::from_fields(
			"upload",
			[FieldDescriptor::file("doc", crate::file::FileConfig::images())],
		)
		.unwrap();
		form.select_file("doc", UploadedFile::new("a.png", "image/png", vec![1u8]))
			.unwrap();

		// Act
		form.select_file("doc", UploadedFile::new("b.png", "image/png", vec![2u8]))
			.unwrap();
		form.validate();

		// Assert
		let payload = form.payload().unwrap();
		assert_eq!(payload.attachment().map(|(_, f)| f.file_name.as_str()), Some("b.png"));
	}
}
