use hyper::StatusCode;

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
	#[error("Bad request: {0}")]
	BadRequest(String),

	/// `size` is known only when the client sent a Content-Length
	#[error("Request body exceeds the limit of {max} bytes (declared size: {size:?})")]
	PayloadTooLarge { size: Option<usize>, max: usize },

	#[error("Unsupported content type: {0}")]
	UnsupportedMediaType(String),

	#[error("Multipart error: {0}")]
	Multipart(#[from] multer::Error),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Hyper error: {0}")]
	Hyper(#[from] hyper::Error),

	#[error("Invalid route pattern: {0}")]
	InvalidRoute(String),

	#[error("Internal error: {0}")]
	Internal(String),
}

pub type HttpResult<T> = Result<T, HttpError>;

impl HttpError {
	/// Status code sent when this error escapes a handler
	pub fn status_code(&self) -> StatusCode {
		match self {
			Self::BadRequest(_) | Self::Multipart(_) => StatusCode::BAD_REQUEST,
			Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
			Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
			Self::Io(_) | Self::Hyper(_) | Self::InvalidRoute(_) | Self::Internal(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			}
		}
	}
}
