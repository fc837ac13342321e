//! Format validators for text-based fields

use crate::field::{FieldError, FieldResult};
use regex::Regex;
use std::sync::LazyLock;

// Pragmatic address check: one `@`, a non-empty local part, and a dotted
// domain whose labels do not start or end with a hyphen.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
	)
	.expect("EMAIL_REGEX: invalid regex pattern")
});

/// Validates e-mail addresses.
///
/// # Examples
///
/// ```
/// use careusnow_forms::validators::EmailValidator;
///
/// let validator = EmailValidator::new();
/// assert!(validator.validate("a@b.com").is_ok());
/// assert!(validator.validate("bad").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EmailValidator {
	message: Option<String>,
}

impl EmailValidator {
	pub fn new() -> Self {
		Self { message: None }
	}

	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}

	pub fn validate(&self, value: &str) -> FieldResult<()> {
		if value.len() <= 254 && EMAIL_REGEX.is_match(value) {
			Ok(())
		} else {
			Err(FieldError::Validation(self.message.clone().unwrap_or_else(
				|| "Invalid email address".to_string(),
			)))
		}
	}
}

/// Validates phone numbers in E.164 form for one calling code.
///
/// The Bangladesh configuration accepts exactly `^\+880\d{10}$`.
///
/// # Examples
///
/// ```
/// use careusnow_forms::validators::PhoneValidator;
///
/// let validator = PhoneValidator::new("+880", 10);
/// assert!(validator.validate("+8801234567890").is_ok());
/// assert!(validator.validate("123").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PhoneValidator {
	calling_code: String,
	national_digits: usize,
}

impl PhoneValidator {
	pub fn new(calling_code: &str, national_digits: usize) -> Self {
		Self {
			calling_code: calling_code.to_string(),
			national_digits,
		}
	}

	pub fn validate(&self, value: &str) -> FieldResult<()> {
		let national = value.strip_prefix(self.calling_code.as_str());
		let valid = national.is_some_and(|digits| {
			digits.len() == self.national_digits && digits.bytes().all(|b| b.is_ascii_digit())
		});
		if valid {
			Ok(())
		} else {
			Err(FieldError::Validation("Invalid phone number".to_string()))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("a@b.com")]
	#[case("first.last+tag@clinic.example.org")]
	fn test_valid_emails(#[case] email: &str) {
		assert!(EmailValidator::new().validate(email).is_ok());
	}

	#[rstest]
	#[case("bad")]
	#[case("a@b")]
	#[case("@b.com")]
	#[case("a@-b.com")]
	#[case("a b@c.com")]
	fn test_invalid_emails(#[case] email: &str) {
		assert!(EmailValidator::new().validate(email).is_err());
	}

	#[rstest]
	fn test_email_custom_message() {
		let validator = EmailValidator::new().with_message("Check the address");

		assert_eq!(
			validator.validate("nope"),
			Err(FieldError::Validation("Check the address".to_string()))
		);
	}

	#[rstest]
	#[case("+8801234567890", true)]
	#[case("+880123456789", false)]
	#[case("+88012345678901", false)]
	#[case("+8811234567890", false)]
	#[case("8801234567890", false)]
	#[case("+880123456789a", false)]
	#[case("123", false)]
	fn test_bangladesh_phone_pattern(#[case] phone: &str, #[case] valid: bool) {
		// Arrange
		let validator = PhoneValidator::new("+880", 10);

		// Act
		let result = validator.validate(phone);

		// Assert
		assert_eq!(result.is_ok(), valid);
	}
}
