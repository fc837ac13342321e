use crate::field::{FieldDescriptor, FieldKind};
use crate::rendering;
use crate::value::FieldValue;

/// BoundField represents a field bound to form data
#[derive(Debug, Clone, Copy)]
pub struct BoundField<'a> {
	form_name: &'a str,
	field: &'a FieldDescriptor,
	value: Option<&'a FieldValue>,
	error: Option<&'a str>,
}

impl<'a> BoundField<'a> {
	pub fn new(
		form_name: &'a str,
		field: &'a FieldDescriptor,
		value: Option<&'a FieldValue>,
		error: Option<&'a str>,
	) -> Self {
		Self {
			form_name,
			field,
			value,
			error,
		}
	}

	pub fn form_name(&self) -> &str {
		self.form_name
	}

	pub fn descriptor(&self) -> &'a FieldDescriptor {
		self.field
	}

	pub fn kind(&self) -> &'a FieldKind {
		&self.field.kind
	}

	pub fn name(&self) -> &'a str {
		&self.field.name
	}

	/// Get the HTML id used by the control and its label
	///
	/// # Examples
	///
	/// ```
	/// use careusnow_forms::{BoundField, FieldDescriptor};
	///
	/// let field = FieldDescriptor::text("name");
	/// let bound = BoundField::new("user", &field, None, None);
	/// assert_eq!(bound.id_for_label(), "id_name");
	/// ```
	pub fn id_for_label(&self) -> String {
		format!("id_{}", self.field.name)
	}

	/// Id of the element holding the error message
	pub fn error_id(&self) -> String {
		format!("error_{}", self.field.name)
	}

	pub fn label(&self) -> Option<&'a str> {
		self.field.label.as_deref()
	}

	pub fn placeholder(&self) -> Option<&'a str> {
		self.field.placeholder.as_deref()
	}

	pub fn value(&self) -> Option<&'a FieldValue> {
		self.value
	}

	/// Value echoed back into the control
	pub fn display_value(&self) -> Option<String> {
		self.value.and_then(FieldValue::display_value)
	}

	/// Whether a checkbox should render checked
	pub fn is_checked(&self) -> bool {
		match self.value {
			Some(FieldValue::Bool(b)) => *b,
			Some(FieldValue::Text(s)) => matches!(s.trim(), "on" | "true" | "1" | "yes"),
			_ => false,
		}
	}

	pub fn error(&self) -> Option<&'a str> {
		self.error
	}

	pub fn has_error(&self) -> bool {
		self.error.is_some()
	}

	pub fn is_required(&self) -> bool {
		self.field.required
	}

	pub fn render(&self) -> String {
		rendering::render_field(self)
	}
}
