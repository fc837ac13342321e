//! Field descriptors
//!
//! A [`FieldDescriptor`] names one input of a form and carries a [`FieldKind`],
//! a closed tagged union of the controls the intake pages know how to render.
//! Each kind holds only the configuration it uses, so a select always has its
//! options and a date picker always has its display format.

use crate::file::FileConfig;
use crate::validators::{EmailValidator, PhoneValidator};
use crate::value::FieldValue;
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use std::str::FromStr;

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
	#[error("This field is required.")]
	Required(String),
	#[error("{0}")]
	Validation(String),
	#[error("Invalid value: {0}")]
	Invalid(String),
	#[error("Unknown field type: {0}")]
	UnknownFieldType(String),
}

pub type FieldResult<T> = Result<T, FieldError>;

/// Bare tag of a [`FieldKind`].
///
/// Tags arrive from form definitions as strings. Parsing an unrecognised tag
/// is a configuration error rather than a field that silently renders nothing.
///
/// # Examples
///
/// ```
/// use careusnow_forms::field::{FieldError, FieldType};
///
/// assert_eq!("phoneInput".parse::<FieldType>(), Ok(FieldType::Phone));
/// assert_eq!("datePicker".parse::<FieldType>(), Ok(FieldType::Date));
/// assert!(matches!(
/// 	"skeleton".parse::<FieldType>(),
/// 	Err(FieldError::UnknownFieldType(_))
/// ));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
	Text,
	TextArea,
	Phone,
	Date,
	Select,
	Radio,
	File,
	Checkbox,
}

impl FieldType {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Text => "input",
			Self::TextArea => "textarea",
			Self::Phone => "phoneInput",
			Self::Date => "datePicker",
			Self::Select => "select",
			Self::Radio => "radio",
			Self::File => "file",
			Self::Checkbox => "checkbox",
		}
	}
}

impl fmt::Display for FieldType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for FieldType {
	type Err = FieldError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"input" | "text" => Ok(Self::Text),
			"textarea" => Ok(Self::TextArea),
			"phoneInput" | "phone" => Ok(Self::Phone),
			"datePicker" | "date" => Ok(Self::Date),
			"select" => Ok(Self::Select),
			"radio" => Ok(Self::Radio),
			"file" => Ok(Self::File),
			"checkbox" => Ok(Self::Checkbox),
			other => Err(FieldError::UnknownFieldType(other.to_string())),
		}
	}
}

/// Semantic format of a single-line text input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextFormat {
	#[default]
	Plain,
	Email,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextConfig {
	pub format: TextFormat,
	pub min_length: Option<usize>,
	pub max_length: Option<usize>,
}

/// Phone input restricted to a single country
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneConfig {
	/// ISO 3166 alpha-2 country code
	pub country: String,
	pub calling_code: String,
	pub national_digits: usize,
}

impl Default for PhoneConfig {
	fn default() -> Self {
		Self {
			country: "BD".to_string(),
			calling_code: "+880".to_string(),
			national_digits: 10,
		}
	}
}

impl PhoneConfig {
	pub fn validator(&self) -> PhoneValidator {
		PhoneValidator::new(&self.calling_code, self.national_digits)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateConfig {
	/// Format shown to the user by the picker (date-fns style tokens)
	pub display_format: String,
	pub show_time: bool,
}

impl Default for DateConfig {
	fn default() -> Self {
		Self {
			display_format: "MM/dd/yyyy".to_string(),
			show_time: false,
		}
	}
}

impl DateConfig {
	/// Date and time picker with the `MM/dd/yyyy - h:mm aa` display format
	pub fn with_time() -> Self {
		Self {
			display_format: "MM/dd/yyyy - h:mm aa".to_string(),
			show_time: true,
		}
	}
}

/// One option of a select or radio group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
	pub value: String,
	pub label: String,
	pub image: Option<String>,
}

impl Choice {
	pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			value: value.into(),
			label: label.into(),
			image: None,
		}
	}

	/// Option whose label doubles as its submitted value
	pub fn plain(value: impl Into<String>) -> Self {
		let value = value.into();
		Self {
			label: value.clone(),
			value,
			image: None,
		}
	}

	pub fn with_image(mut self, image: impl Into<String>) -> Self {
		self.image = Some(image.into());
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChoiceConfig {
	pub choices: Vec<Choice>,
}

impl ChoiceConfig {
	pub fn new(choices: Vec<Choice>) -> Self {
		Self { choices }
	}

	pub fn contains(&self, value: &str) -> bool {
		self.choices.iter().any(|c| c.value == value)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckboxConfig {
	/// Message reported when a required box is left unchecked
	pub unchecked_message: Option<String>,
}

/// Closed set of controls, each with its own configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
	Text(TextConfig),
	TextArea(TextConfig),
	Phone(PhoneConfig),
	Date(DateConfig),
	Select(ChoiceConfig),
	Radio(ChoiceConfig),
	File(FileConfig),
	Checkbox(CheckboxConfig),
}

impl FieldKind {
	/// Kind with default configuration for a tag
	pub fn for_type(field_type: FieldType) -> Self {
		match field_type {
			FieldType::Text => Self::Text(TextConfig::default()),
			FieldType::TextArea => Self::TextArea(TextConfig::default()),
			FieldType::Phone => Self::Phone(PhoneConfig::default()),
			FieldType::Date => Self::Date(DateConfig::default()),
			FieldType::Select => Self::Select(ChoiceConfig::default()),
			FieldType::Radio => Self::Radio(ChoiceConfig::default()),
			FieldType::File => Self::File(FileConfig::default()),
			FieldType::Checkbox => Self::Checkbox(CheckboxConfig::default()),
		}
	}

	pub fn field_type(&self) -> FieldType {
		match self {
			Self::Text(_) => FieldType::Text,
			Self::TextArea(_) => FieldType::TextArea,
			Self::Phone(_) => FieldType::Phone,
			Self::Date(_) => FieldType::Date,
			Self::Select(_) => FieldType::Select,
			Self::Radio(_) => FieldType::Radio,
			Self::File(_) => FieldType::File,
			Self::Checkbox(_) => FieldType::Checkbox,
		}
	}
}

/// Static description of one form input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
	pub name: String,
	pub label: Option<String>,
	pub placeholder: Option<String>,
	/// Icon image shown inside the input (`src`, `alt`)
	pub icon: Option<(String, String)>,
	pub required: bool,
	pub kind: FieldKind,
}

impl FieldDescriptor {
	pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
		Self {
			name: name.into(),
			label: None,
			placeholder: None,
			icon: None,
			required: false,
			kind,
		}
	}

	/// Build a descriptor from a string tag
	///
	/// # Examples
	///
	/// ```
	/// use careusnow_forms::field::{FieldDescriptor, FieldType};
	///
	/// let field = FieldDescriptor::from_tag("notes", "textarea").unwrap();
	/// assert_eq!(field.field_type(), FieldType::TextArea);
	/// assert!(FieldDescriptor::from_tag("notes", "skeleton").is_err());
	/// ```
	pub fn from_tag(name: impl Into<String>, tag: &str) -> FieldResult<Self> {
		let field_type: FieldType = tag.parse()?;
		Ok(Self::new(name, FieldKind::for_type(field_type)))
	}

	pub fn text(name: impl Into<String>) -> Self {
		Self::new(name, FieldKind::Text(TextConfig::default()))
	}

	pub fn email(name: impl Into<String>) -> Self {
		Self::new(
			name,
			FieldKind::Text(TextConfig {
				format: TextFormat::Email,
				..TextConfig::default()
			}),
		)
	}

	pub fn textarea(name: impl Into<String>) -> Self {
		Self::new(name, FieldKind::TextArea(TextConfig::default()))
	}

	pub fn phone(name: impl Into<String>) -> Self {
		Self::new(name, FieldKind::Phone(PhoneConfig::default()))
	}

	pub fn date(name: impl Into<String>, config: DateConfig) -> Self {
		Self::new(name, FieldKind::Date(config))
	}

	pub fn select(name: impl Into<String>, choices: Vec<Choice>) -> Self {
		Self::new(name, FieldKind::Select(ChoiceConfig::new(choices)))
	}

	pub fn radio(name: impl Into<String>, choices: Vec<Choice>) -> Self {
		Self::new(name, FieldKind::Radio(ChoiceConfig::new(choices)))
	}

	pub fn file(name: impl Into<String>, config: FileConfig) -> Self {
		Self::new(name, FieldKind::File(config))
	}

	pub fn checkbox(name: impl Into<String>) -> Self {
		Self::new(name, FieldKind::Checkbox(CheckboxConfig::default()))
	}

	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
		self.placeholder = Some(placeholder.into());
		self
	}

	pub fn with_icon(mut self, src: impl Into<String>, alt: impl Into<String>) -> Self {
		self.icon = Some((src.into(), alt.into()));
		self
	}

	/// Set length bounds; ignored by kinds without free text
	pub fn with_length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
		if let FieldKind::Text(config) | FieldKind::TextArea(config) = &mut self.kind {
			config.min_length = min;
			config.max_length = max;
		}
		self
	}

	/// Message for an unchecked required checkbox; ignored by other kinds
	pub fn with_unchecked_message(mut self, message: impl Into<String>) -> Self {
		if let FieldKind::Checkbox(config) = &mut self.kind {
			config.unchecked_message = Some(message.into());
		}
		self
	}

	pub fn field_type(&self) -> FieldType {
		self.kind.field_type()
	}

	/// Normalise and validate a raw value
	///
	/// Text-based kinds accept [`FieldValue::Text`] as submitted by a browser
	/// and convert it to their typed value. An empty value on a required
	/// field yields [`FieldError::Required`] and nothing else.
	pub fn clean(&self, value: &FieldValue) -> FieldResult<FieldValue> {
		let is_checkbox = matches!(self.kind, FieldKind::Checkbox(_));
		if !is_checkbox && value.is_empty() {
			if self.required {
				return Err(FieldError::Required(self.name.clone()));
			}
			return Ok(FieldValue::Empty);
		}

		match &self.kind {
			FieldKind::Text(config) | FieldKind::TextArea(config) => {
				let text = expect_text(value)?.trim();
				check_length(text, config)?;
				if config.format == TextFormat::Email {
					EmailValidator::new().validate(text)?;
				}
				Ok(FieldValue::Text(text.to_string()))
			}
			FieldKind::Phone(config) => {
				let text: String = expect_text(value)?
					.chars()
					.filter(|c| !c.is_whitespace() && *c != '-')
					.collect();
				config.validator().validate(&text)?;
				Ok(FieldValue::Text(text))
			}
			FieldKind::Date(config) => clean_date(value, config),
			FieldKind::Select(config) | FieldKind::Radio(config) => {
				let text = expect_text(value)?.trim();
				if !config.contains(text) {
					return Err(FieldError::Validation(format!(
						"Select a valid choice. {} is not one of the available choices.",
						text
					)));
				}
				Ok(FieldValue::Text(text.to_string()))
			}
			FieldKind::File(config) => match value {
				FieldValue::File(file) => {
					config
						.check(file)
						.map_err(|e| FieldError::Validation(e.to_string()))?;
					Ok(value.clone())
				}
				_ => Err(FieldError::Invalid("expected an uploaded file".to_string())),
			},
			FieldKind::Checkbox(config) => self.clean_checkbox(config, value),
		}
	}

	fn clean_checkbox(&self, config: &CheckboxConfig, value: &FieldValue) -> FieldResult<FieldValue> {
		let checked = match value {
			FieldValue::Bool(b) => *b,
			FieldValue::Text(s) => matches!(s.trim(), "on" | "true" | "1" | "yes"),
			FieldValue::Empty => false,
			_ => return Err(FieldError::Invalid("expected a checkbox value".to_string())),
		};
		if self.required && !checked {
			return Err(match &config.unchecked_message {
				Some(message) => FieldError::Validation(message.clone()),
				None => FieldError::Required(self.name.clone()),
			});
		}
		Ok(FieldValue::Bool(checked))
	}
}

fn expect_text(value: &FieldValue) -> FieldResult<&str> {
	value
		.as_text()
		.ok_or_else(|| FieldError::Invalid("expected a text value".to_string()))
}

fn check_length(text: &str, config: &TextConfig) -> FieldResult<()> {
	let char_count = text.chars().count();
	if let Some(max_length) = config.max_length
		&& char_count > max_length
	{
		return Err(FieldError::Validation(format!(
			"Ensure this value has at most {} characters (it has {})",
			max_length, char_count
		)));
	}
	if let Some(min_length) = config.min_length
		&& char_count < min_length
	{
		return Err(FieldError::Validation(format!(
			"Ensure this value has at least {} characters (it has {})",
			min_length, char_count
		)));
	}
	Ok(())
}

// Browser date inputs submit `YYYY-MM-DD`; datetime-local submits
// `YYYY-MM-DDTHH:MM` with optional seconds.
const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";
const DATETIME_INPUT_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

fn clean_date(value: &FieldValue, config: &DateConfig) -> FieldResult<FieldValue> {
	match value {
		FieldValue::DateTime(dt) if config.show_time => Ok(FieldValue::DateTime(*dt)),
		FieldValue::DateTime(dt) => Ok(FieldValue::Date(dt.date())),
		FieldValue::Date(d) if config.show_time => Err(FieldError::Validation(format!(
			"Enter a date and time, not only {}",
			d
		))),
		FieldValue::Date(d) => Ok(FieldValue::Date(*d)),
		FieldValue::Text(raw) => {
			let raw = raw.trim();
			if config.show_time {
				DATETIME_INPUT_FORMATS
					.iter()
					.find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
					.map(FieldValue::DateTime)
					.ok_or_else(|| FieldError::Validation("Enter a valid date and time.".to_string()))
			} else {
				NaiveDate::parse_from_str(raw, DATE_INPUT_FORMAT)
					.map(FieldValue::Date)
					.map_err(|_| FieldError::Validation("Enter a valid date.".to_string()))
			}
		}
		_ => Err(FieldError::Invalid("expected a date".to_string())),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("input", FieldType::Text)]
	#[case("textarea", FieldType::TextArea)]
	#[case("phoneInput", FieldType::Phone)]
	#[case("checkbox", FieldType::Checkbox)]
	#[case("datePicker", FieldType::Date)]
	#[case("select", FieldType::Select)]
	#[case("radio", FieldType::Radio)]
	#[case("file", FieldType::File)]
	fn test_field_type_parses_known_tags(#[case] tag: &str, #[case] expected: FieldType) {
		// Act
		let parsed = tag.parse::<FieldType>();

		// Assert
		assert_eq!(parsed, Ok(expected));
	}

	#[rstest]
	#[case("skeleton")]
	#[case("")]
	#[case("Input")]
	fn test_field_type_rejects_unknown_tags(#[case] tag: &str) {
		// Act
		let parsed = tag.parse::<FieldType>();

		// Assert
		assert_eq!(parsed, Err(FieldError::UnknownFieldType(tag.to_string())));
	}

	#[rstest]
	fn test_required_empty_text_yields_required_error() {
		// Arrange
		let field = FieldDescriptor::text("name").required().with_length(Some(2), Some(50));

		// Act
		let result = field.clean(&FieldValue::Text("   ".to_string()));

		// Assert
		assert_eq!(result, Err(FieldError::Required("name".to_string())));
	}

	#[rstest]
	fn test_optional_empty_text_cleans_to_empty() {
		let field = FieldDescriptor::textarea("allergies");

		assert_eq!(field.clean(&FieldValue::Empty), Ok(FieldValue::Empty));
	}

	#[rstest]
	fn test_text_length_counts_characters() {
		// Arrange
		let field = FieldDescriptor::text("name").with_length(None, Some(3));

		// Act
		let ok = field.clean(&FieldValue::Text("ñöü".to_string()));
		let too_long = field.clean(&FieldValue::Text("ñöüa".to_string()));

		// Assert
		assert_eq!(ok, Ok(FieldValue::Text("ñöü".to_string())));
		assert!(matches!(too_long, Err(FieldError::Validation(msg)) if msg.contains("at most 3")));
	}

	#[rstest]
	fn test_email_format_is_checked() {
		let field = FieldDescriptor::email("email").required();

		assert!(field.clean(&FieldValue::Text("bad".to_string())).is_err());
		assert_eq!(
			field.clean(&FieldValue::Text(" a@b.com ".to_string())),
			Ok(FieldValue::Text("a@b.com".to_string()))
		);
	}

	#[rstest]
	fn test_phone_strips_separators() {
		let field = FieldDescriptor::phone("phone").required();

		let cleaned = field.clean(&FieldValue::Text("+880 1234-567890".to_string()));

		assert_eq!(cleaned, Ok(FieldValue::Text("+8801234567890".to_string())));
	}

	#[rstest]
	fn test_select_rejects_values_outside_choices() {
		// Arrange
		let field = FieldDescriptor::select(
			"primaryPhysician",
			vec![Choice::plain("John Green"), Choice::plain("Leila Cameron")],
		)
		.required();

		// Act
		let valid = field.clean(&FieldValue::Text("Leila Cameron".to_string()));
		let invalid = field.clean(&FieldValue::Text("Dr. Nobody".to_string()));

		// Assert
		assert!(valid.is_ok());
		assert!(matches!(invalid, Err(FieldError::Validation(_))));
	}

	#[rstest]
	fn test_date_picker_parses_browser_formats() {
		// Arrange
		let date = FieldDescriptor::date("birthDate", DateConfig::default());
		let schedule = FieldDescriptor::date("schedule", DateConfig::with_time());

		// Act
		let birth = date.clean(&FieldValue::Text("1990-04-12".to_string()));
		let appointment = schedule.clean(&FieldValue::Text("2024-07-01T09:30".to_string()));

		// Assert
		assert_eq!(
			birth,
			Ok(FieldValue::Date(NaiveDate::from_ymd_opt(1990, 4, 12).unwrap()))
		);
		let expected = NaiveDate::from_ymd_opt(2024, 7, 1)
			.unwrap()
			.and_hms_opt(9, 30, 0)
			.unwrap();
		assert_eq!(appointment, Ok(FieldValue::DateTime(expected)));
	}

	#[rstest]
	fn test_date_picker_rejects_garbage() {
		let field = FieldDescriptor::date("birthDate", DateConfig::default());

		assert!(field.clean(&FieldValue::Text("12/04/1990x".to_string())).is_err());
	}

	#[rstest]
	#[case(FieldValue::Text("on".to_string()), true)]
	#[case(FieldValue::Bool(true), true)]
	#[case(FieldValue::Empty, false)]
	fn test_optional_checkbox_values(#[case] raw: FieldValue, #[case] expected: bool) {
		let field = FieldDescriptor::checkbox("newsletter");

		assert_eq!(field.clean(&raw), Ok(FieldValue::Bool(expected)));
	}

	#[rstest]
	fn test_required_checkbox_uses_unchecked_message() {
		// Arrange
		let field = FieldDescriptor::checkbox("privacyConsent")
			.required()
			.with_unchecked_message("You must consent to privacy in order to proceed");

		// Act
		let result = field.clean(&FieldValue::Empty);

		// Assert
		assert_eq!(
			result,
			Err(FieldError::Validation(
				"You must consent to privacy in order to proceed".to_string()
			))
		);
	}

	#[rstest]
	fn test_with_length_ignored_for_non_text_kinds() {
		let field = FieldDescriptor::phone("phone").with_length(Some(1), Some(2));

		assert_eq!(field.kind, FieldKind::Phone(PhoneConfig::default()));
	}
}
