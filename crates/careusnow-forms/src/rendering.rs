//! HTML rendering of bound fields
//!
//! [`render_field`] maps each [`FieldKind`] to its control. Labels sit above
//! every control except checkboxes, whose label is rendered beside the box.
//! Errors are rendered below the control. All interpolated text is escaped.

use crate::bound_field::BoundField;
use crate::field::{Choice, ChoiceConfig, DateConfig, FieldKind, PhoneConfig, TextConfig, TextFormat};
use crate::file::FileConfig;
use crate::form::Form;
use std::fmt::Write as _;

/// Escape text for use in element content and quoted attribute values
///
/// # Examples
///
/// ```
/// use careusnow_forms::rendering::html_escape;
///
/// assert_eq!(html_escape(r#"<a href="x">"#), "&lt;a href=&quot;x&quot;&gt;");
/// ```
pub fn html_escape(s: &str) -> String {
	s.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
		.replace('\'', "&#x27;")
}

fn push_attr(html: &mut String, key: &str, value: &str) {
	let _ = write!(html, r#" {}="{}""#, key, html_escape(value));
}

// Attributes shared by every focusable control
fn push_common_attrs(html: &mut String, field: &BoundField<'_>) {
	push_attr(html, "id", &field.id_for_label());
	push_attr(html, "name", field.name());
	if field.is_required() {
		html.push_str(" required");
	}
	if field.has_error() {
		push_attr(html, "aria-invalid", "true");
		push_attr(html, "aria-describedby", &field.error_id());
	}
}

/// Render a bound field with its label and error
pub fn render_field(field: &BoundField<'_>) -> String {
	let kind = field.kind();
	let mut html = String::new();
	let _ = write!(
		html,
		r#"<div class="form-field" data-field-type="{}">"#,
		kind.field_type()
	);

	let checkbox = matches!(kind, FieldKind::Checkbox(_));
	if !checkbox && let Some(label) = field.label() {
		let _ = write!(
			html,
			r#"<label class="shad-input-label" for="{}">{}</label>"#,
			html_escape(&field.id_for_label()),
			html_escape(label)
		);
	}

	html.push_str(&render_control(field));

	if let Some(error) = field.error() {
		let _ = write!(
			html,
			r#"<p class="shad-error" id="{}">{}</p>"#,
			html_escape(&field.error_id()),
			html_escape(error)
		);
	}
	html.push_str("</div>");
	html
}

/// Render only the control for a field
pub fn render_control(field: &BoundField<'_>) -> String {
	match field.kind() {
		FieldKind::Text(config) => render_text(field, config),
		FieldKind::TextArea(config) => render_textarea(field, config),
		FieldKind::Phone(config) => render_phone(field, config),
		FieldKind::Date(config) => render_date(field, config),
		FieldKind::Select(config) => render_select(field, config),
		FieldKind::Radio(config) => render_radio(field, config),
		FieldKind::File(config) => render_file(field, config),
		FieldKind::Checkbox(_) => render_checkbox(field),
	}
}

fn render_icon(html: &mut String, field: &BoundField<'_>) {
	if let Some((src, alt)) = &field.descriptor().icon {
		html.push_str(r#"<img class="field-icon" width="24" height="24""#);
		push_attr(html, "src", src);
		push_attr(html, "alt", alt);
		html.push_str(" />");
	}
}

fn render_text(field: &BoundField<'_>, config: &TextConfig) -> String {
	let input_type = match config.format {
		TextFormat::Plain => "text",
		TextFormat::Email => "email",
	};
	let mut html = String::from(r#"<div class="input-wrapper">"#);
	render_icon(&mut html, field);
	let _ = write!(html, r#"<input type="{}" class="shad-input""#, input_type);
	push_common_attrs(&mut html, field);
	if let Some(placeholder) = field.placeholder() {
		push_attr(&mut html, "placeholder", placeholder);
	}
	if let Some(max) = config.max_length {
		push_attr(&mut html, "maxlength", &max.to_string());
	}
	if let Some(value) = field.display_value() {
		push_attr(&mut html, "value", &value);
	}
	html.push_str(" /></div>");
	html
}

fn render_textarea(field: &BoundField<'_>, config: &TextConfig) -> String {
	let mut html = String::from(r#"<textarea class="shad-textArea""#);
	push_common_attrs(&mut html, field);
	if let Some(placeholder) = field.placeholder() {
		push_attr(&mut html, "placeholder", placeholder);
	}
	if let Some(max) = config.max_length {
		push_attr(&mut html, "maxlength", &max.to_string());
	}
	html.push('>');
	if let Some(value) = field.display_value() {
		html.push_str(&html_escape(&value));
	}
	html.push_str("</textarea>");
	html
}

fn render_phone(field: &BoundField<'_>, config: &PhoneConfig) -> String {
	let mut html = String::from(r#"<input type="tel" class="input-phone" autocomplete="tel""#);
	push_common_attrs(&mut html, field);
	push_attr(&mut html, "data-country", &config.country);
	let pattern = format!(
		r"{}\d{{{}}}",
		regex::escape(&config.calling_code),
		config.national_digits
	);
	push_attr(&mut html, "pattern", &pattern);
	let placeholder = field
		.placeholder()
		.map(str::to_string)
		.unwrap_or_else(|| format!("{}XXXXXXXXXX", config.calling_code));
	push_attr(&mut html, "placeholder", &placeholder);
	if let Some(value) = field.display_value() {
		push_attr(&mut html, "value", &value);
	}
	html.push_str(" />");
	html
}

fn render_date(field: &BoundField<'_>, config: &DateConfig) -> String {
	let input_type = if config.show_time { "datetime-local" } else { "date" };
	let mut html = String::from(r#"<div class="input-wrapper">"#);
	html.push_str(r#"<img class="field-icon" src="/assets/icons/calendar.svg" alt="calendar" width="24" height="24" />"#);
	let _ = write!(html, r#"<input type="{}" class="date-picker""#, input_type);
	push_common_attrs(&mut html, field);
	push_attr(&mut html, "data-date-format", &config.display_format);
	if let Some(value) = field.display_value() {
		push_attr(&mut html, "value", &value);
	}
	html.push_str(" /></div>");
	html
}

fn render_option(html: &mut String, choice: &Choice, selected: bool) {
	html.push_str("<option");
	push_attr(html, "value", &choice.value);
	if let Some(image) = &choice.image {
		push_attr(html, "data-image", image);
	}
	if selected {
		html.push_str(" selected");
	}
	let _ = write!(html, ">{}</option>", html_escape(&choice.label));
}

fn render_select(field: &BoundField<'_>, config: &ChoiceConfig) -> String {
	let current = field.display_value();
	let mut html = String::from(r#"<select class="shad-select-trigger""#);
	push_common_attrs(&mut html, field);
	html.push('>');

	let placeholder = field.placeholder().unwrap_or("Select an option");
	let _ = write!(
		html,
		r#"<option value="" disabled{}>{}</option>"#,
		if current.is_none() { " selected" } else { "" },
		html_escape(placeholder)
	);
	for choice in &config.choices {
		render_option(&mut html, choice, current.as_deref() == Some(choice.value.as_str()));
	}
	html.push_str("</select>");
	html
}

fn render_radio(field: &BoundField<'_>, config: &ChoiceConfig) -> String {
	let current = field.display_value();
	let mut html = String::from(r#"<div class="radio-group" role="radiogroup""#);
	push_attr(&mut html, "id", &field.id_for_label());
	html.push('>');
	for (index, choice) in config.choices.iter().enumerate() {
		let id = format!("{}_{}", field.id_for_label(), index);
		html.push_str(r#"<div class="radio-item"><input type="radio""#);
		push_attr(&mut html, "id", &id);
		push_attr(&mut html, "name", field.name());
		push_attr(&mut html, "value", &choice.value);
		if current.as_deref() == Some(choice.value.as_str()) {
			html.push_str(" checked");
		}
		if field.is_required() {
			html.push_str(" required");
		}
		let _ = write!(
			html,
			r#" /><label class="cursor-pointer" for="{}">{}</label></div>"#,
			html_escape(&id),
			html_escape(&choice.label)
		);
	}
	html.push_str("</div>");
	html
}

fn render_file(field: &BoundField<'_>, config: &FileConfig) -> String {
	let mut html = String::from(r#"<label class="file-upload""#);
	push_attr(&mut html, "for", &field.id_for_label());
	html.push_str(r#"><input type="file" class="sr-only""#);
	push_attr(&mut html, "id", &field.id_for_label());
	push_attr(&mut html, "name", field.name());
	if let Some(accept) = config.accept_attr() {
		push_attr(&mut html, "accept", &accept);
	}
	if field.has_error() {
		push_attr(&mut html, "aria-describedby", &field.error_id());
	}
	html.push_str(" />");

	match field.value().and_then(|v| v.as_file()) {
		Some(file) => {
			let _ = write!(
				html,
				r#"<p class="file-upload-selected">{}</p>"#,
				html_escape(&file.file_name)
			);
		}
		None => {
			html.push_str(r#"<img src="/assets/icons/upload.svg" width="40" height="40" alt="upload" />"#);
			html.push_str(r#"<div class="file-upload_label"><p class="text-14-regular"><span class="text-green-500">Click to upload</span> or drag and drop</p>"#);
			if !config.hint.is_empty() {
				let _ = write!(html, "<p>{}</p>", html_escape(&config.hint));
			}
			html.push_str("</div>");
		}
	}
	html.push_str("</label>");
	html
}

fn render_checkbox(field: &BoundField<'_>) -> String {
	let mut html = String::from(r#"<div class="checkbox-wrapper"><input type="checkbox" value="on""#);
	push_common_attrs(&mut html, field);
	if field.is_checked() {
		html.push_str(" checked");
	}
	html.push_str(" />");
	if let Some(label) = field.label() {
		let _ = write!(
			html,
			r#"<label class="checkbox-label" for="{}">{}</label>"#,
			html_escape(&field.id_for_label()),
			html_escape(label)
		);
	}
	html.push_str("</div>");
	html
}

/// Submit button with a loading state
///
/// # Examples
///
/// ```
/// use careusnow_forms::rendering::SubmitButton;
///
/// let idle = SubmitButton::new("Get Started").render();
/// assert!(idle.contains("Get Started"));
///
/// let busy = SubmitButton::new("Get Started").loading(true).render();
/// assert!(busy.contains("Loading..."));
/// assert!(busy.contains("disabled"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitButton {
	label: String,
	class: String,
	loading: bool,
}

impl SubmitButton {
	pub fn new(label: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			class: "shad-primary-btn w-full".to_string(),
			loading: false,
		}
	}

	pub fn with_class(mut self, class: impl Into<String>) -> Self {
		self.class = class.into();
		self
	}

	pub fn loading(mut self, loading: bool) -> Self {
		self.loading = loading;
		self
	}

	pub fn render(&self) -> String {
		let mut html = String::from(r#"<button type="submit""#);
		push_attr(&mut html, "class", &self.class);
		if self.loading {
			html.push_str(r#" disabled aria-busy="true"><span class="flex items-center gap-4">"#);
			html.push_str(r#"<img src="/assets/icons/loader.svg" alt="loader" width="24" height="24" class="animate-spin" />Loading...</span>"#);
		} else {
			let _ = write!(html, ">{}", html_escape(&self.label));
		}
		html.push_str("</button>");
		html
	}
}

/// Render every field of a form in declaration order
pub fn render_fields(form: &Form) -> String {
	form.bound_fields().map(|field| field.render()).collect()
}

/// Render form-level errors as an alert block; empty when there are none
pub fn render_non_field_errors(form: &Form) -> String {
	if form.non_field_errors().is_empty() {
		return String::new();
	}
	let mut html = String::from(r#"<div class="form-alert" role="alert">"#);
	for message in form.non_field_errors() {
		let _ = write!(html, "<p>{}</p>", html_escape(message));
	}
	html.push_str("</div>");
	html
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::field::FieldDescriptor;
	use crate::file::UploadedFile;
	use crate::value::FieldValue;
	use rstest::rstest;

	fn render(field: &FieldDescriptor, value: Option<FieldValue>, error: Option<&str>) -> String {
		BoundField::new("test", field, value.as_ref(), error).render()
	}

	#[rstest]
	fn test_text_input_render() {
		// Arrange
		let field = FieldDescriptor::text("name")
			.with_label("Full Name")
			.with_placeholder("A Patient Name")
			.with_icon("/assets/icons/user.svg", "user");

		// Act
		let html = render(&field, Some(FieldValue::Text("John".to_string())), None);

		// Assert
		assert!(html.contains(r#"type="text""#));
		assert!(html.contains(r#"name="name""#));
		assert!(html.contains(r#"value="John""#));
		assert!(html.contains(r#"placeholder="A Patient Name""#));
		assert!(html.contains(r#"src="/assets/icons/user.svg""#));
		assert!(html.find("Full Name").unwrap() < html.find("<input").unwrap());
	}

	#[rstest]
	fn test_values_are_escaped() {
		let field = FieldDescriptor::textarea("notes");

		let html = render(&field, Some(FieldValue::Text("<script>".to_string())), None);

		assert!(html.contains("&lt;script&gt;"));
		assert!(!html.contains("<script>"));
	}

	#[rstest]
	fn test_phone_input_restricted_to_country() {
		let field = FieldDescriptor::phone("phone").with_placeholder("+8801XXXXXXXXX");

		let html = render(&field, None, None);

		assert!(html.contains(r#"type="tel""#));
		assert!(html.contains(r#"data-country="BD""#));
		assert!(html.contains(r#"pattern="\+880\d{10}""#));
	}

	#[rstest]
	fn test_date_picker_with_time() {
		let field = FieldDescriptor::date("schedule", DateConfig::with_time());

		let html = render(&field, None, None);

		assert!(html.contains(r#"type="datetime-local""#));
		assert!(html.contains(r#"data-date-format="MM/dd/yyyy - h:mm aa""#));
	}

	#[rstest]
	fn test_select_render_marks_current_choice() {
		// Arrange
		let field = FieldDescriptor::select(
			"primaryPhysician",
			vec![
				Choice::plain("John Green").with_image("/assets/images/dr-green.png"),
				Choice::plain("Leila Cameron"),
			],
		)
		.with_placeholder("Select a physician");

		// Act
		let html = render(&field, Some(FieldValue::Text("Leila Cameron".to_string())), None);

		// Assert
		assert!(html.contains(r#"<option value="" disabled>Select a physician</option>"#));
		assert!(html.contains(r#"value="Leila Cameron" selected"#));
		assert!(html.contains(r#"data-image="/assets/images/dr-green.png""#));
	}

	#[rstest]
	fn test_radio_group_render() {
		let field = FieldDescriptor::radio("gender", vec![Choice::plain("Male"), Choice::plain("Female")]);

		let html = render(&field, Some(FieldValue::Text("Female".to_string())), None);

		assert_eq!(html.matches(r#"<input type="radio""#).count(), 2);
		assert!(html.contains(r#"value="Female" checked"#));
	}

	#[rstest]
	fn test_checkbox_label_beside_not_above() {
		// Arrange
		let field = FieldDescriptor::checkbox("treatmentConsent").with_label("I consent to treatment");

		// Act
		let html = render(&field, Some(FieldValue::Bool(true)), None);

		// Assert
		assert!(!html.contains("shad-input-label"));
		assert!(html.contains(r#"class="checkbox-label""#));
		assert!(html.find("<input").unwrap() < html.find("I consent to treatment").unwrap());
		assert!(html.contains(" checked"));
	}

	#[rstest]
	fn test_file_picker_shows_selected_file() {
		// Arrange
		let field = FieldDescriptor::file("identificationDocument", FileConfig::images());
		let file = UploadedFile::new("passport.png", "image/png", vec![1u8]);

		// Act
		let empty = render(&field, None, None);
		let selected = render(&field, Some(FieldValue::File(file)), None);

		// Assert
		assert!(empty.contains("Click to upload"));
		assert!(empty.contains(r#"accept=".svg,.png,.jpg,.jpeg,.gif""#));
		assert!(selected.contains("passport.png"));
		assert!(!selected.contains("Click to upload"));
	}

	#[rstest]
	fn test_error_rendered_below_control() {
		// Arrange
		let field = FieldDescriptor::email("email").with_label("Email");

		// Act
		let html = render(&field, None, Some("Invalid email address"));

		// Assert
		assert!(html.contains(r#"aria-invalid="true""#));
		assert!(html.find("<input").unwrap() < html.find("Invalid email address").unwrap());
	}

	#[rstest]
	fn test_submit_button_idle_is_enabled() {
		let html = SubmitButton::new("Submit and Continue").render();

		assert!(!html.contains("disabled"));
		assert!(html.contains("Submit and Continue"));
	}
}
