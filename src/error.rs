//! Application error type
//!
//! Every failure is local to one request. Handlers turn an [`AppError`] into a
//! status page; form validation failures never reach this type because the
//! form is re-rendered inline instead.

use crate::pipeline::SubmissionError;
use careusnow_client::ServiceError;
use careusnow_conf::SettingsError;
use careusnow_forms::FormError;
use careusnow_http::{HttpError, StatusCode};

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error(transparent)]
	Http(#[from] HttpError),

	#[error("Form configuration error: {0}")]
	Form(#[from] FormError),

	#[error("Template error: {0}")]
	Template(#[from] tera::Error),

	#[error(transparent)]
	Service(#[from] ServiceError),

	#[error(transparent)]
	Submission(#[from] SubmissionError),

	#[error(transparent)]
	Settings(#[from] SettingsError),

	#[error("Logging setup failed: {0}")]
	Logging(String),

	#[error("Not found: {0}")]
	NotFound(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
	pub fn status_code(&self) -> StatusCode {
		match self {
			Self::Http(e) => e.status_code(),
			Self::NotFound(_) | Self::Service(ServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
			Self::Service(_) => StatusCode::BAD_GATEWAY,
			Self::Submission(e) => e.status_code(),
			Self::Form(_)
			| Self::Template(_)
			| Self::Settings(_)
			| Self::Logging(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(AppError::NotFound("page".into()), StatusCode::NOT_FOUND)]
	#[case(AppError::Service(ServiceError::NotFound("user".into())), StatusCode::NOT_FOUND)]
	#[case(AppError::Service(ServiceError::Timeout), StatusCode::BAD_GATEWAY)]
	#[case(AppError::Http(HttpError::BadRequest("x".into())), StatusCode::BAD_REQUEST)]
	#[case(AppError::Form(FormError::DuplicateField("name".into())), StatusCode::INTERNAL_SERVER_ERROR)]
	fn test_status_code(#[case] error: AppError, #[case] expected: StatusCode) {
		assert_eq!(error.status_code(), expected);
	}
}
