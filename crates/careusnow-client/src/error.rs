use reqwest::StatusCode;

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
	#[error("Network error: {0}")]
	Network(String),

	#[error("Request timed out")]
	Timeout,

	#[error("Service error ({status}): {message}")]
	Status { status: StatusCode, message: String },

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Failed to decode response: {0}")]
	Decode(String),

	#[error("Invalid client configuration: {0}")]
	Config(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<reqwest::Error> for ServiceError {
	fn from(error: reqwest::Error) -> Self {
		if error.is_timeout() {
			Self::Timeout
		} else if error.is_decode() {
			Self::Decode(error.to_string())
		} else if error.is_builder() {
			Self::Config(error.to_string())
		} else {
			Self::Network(error.to_string())
		}
	}
}

impl ServiceError {
	/// Build the error for a non-success response
	///
	/// `body` is the raw response text; Appwrite wraps the message in a JSON
	/// object with a `message` key.
	pub fn from_response(status: StatusCode, body: &str) -> Self {
		let message = serde_json::from_str::<serde_json::Value>(body)
			.ok()
			.and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
			.unwrap_or_else(|| body.to_string());
		match status {
			StatusCode::NOT_FOUND => Self::NotFound(message),
			StatusCode::CONFLICT => Self::Conflict(message),
			_ => Self::Status { status, message },
		}
	}
}
