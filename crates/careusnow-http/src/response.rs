use bytes::Bytes;
use hyper::header::{self, HeaderName, HeaderValue};
use hyper::{HeaderMap, StatusCode};

/// HTTP Response representation
#[derive(Debug, Clone)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Response {
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	/// 200 with an HTML body
	///
	/// # Examples
	///
	/// ```
	/// use careusnow_http::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::html("<h1>Hi there</h1>");
	/// assert_eq!(response.status, StatusCode::OK);
	/// assert_eq!(
	///     response.headers.get("content-type").unwrap().to_str().unwrap(),
	///     "text/html; charset=utf-8"
	/// );
	/// ```
	pub fn html(body: impl Into<Bytes>) -> Self {
		Self::ok()
			.with_body(body)
			.with_typed_header(header::CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"))
	}

	pub fn text(body: impl Into<Bytes>) -> Self {
		Self::ok()
			.with_body(body)
			.with_typed_header(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))
	}

	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	/// 405 advertising the methods the path does accept
	pub fn method_not_allowed(allowed: &[hyper::Method]) -> Self {
		let allow = allowed
			.iter()
			.map(hyper::Method::as_str)
			.collect::<Vec<_>>()
			.join(", ");
		Self::new(StatusCode::METHOD_NOT_ALLOWED).with_header("Allow", &allow)
	}

	/// 303 See Other, the redirect that follows a successful form post
	///
	/// # Examples
	///
	/// ```
	/// use careusnow_http::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::see_other("/patients/u1/register");
	/// assert_eq!(response.status, StatusCode::SEE_OTHER);
	/// assert_eq!(response.location(), Some("/patients/u1/register"));
	/// ```
	pub fn see_other(location: impl AsRef<str>) -> Self {
		Self::new(StatusCode::SEE_OTHER).with_location(location.as_ref())
	}

	pub fn with_status(mut self, status: StatusCode) -> Self {
		self.status = status;
		self
	}

	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Add a header; invalid names or values are skipped
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let Ok(header_name) = HeaderName::from_bytes(name.as_bytes())
			&& let Ok(header_value) = HeaderValue::from_str(value)
		{
			self.headers.insert(header_name, header_value);
		}
		self
	}

	pub fn with_typed_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);
		self
	}

	pub fn with_location(mut self, location: &str) -> Self {
		if let Ok(value) = HeaderValue::from_str(location) {
			self.headers.insert(header::LOCATION, value);
		}
		self
	}

	pub fn location(&self) -> Option<&str> {
		self.headers
			.get(header::LOCATION)
			.and_then(|v| v.to_str().ok())
	}

	/// Body as UTF-8 text, lossy
	pub fn body_text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use hyper::Method;
	use rstest::rstest;

	#[rstest]
	fn test_method_not_allowed_lists_allow_header() {
		// Act
		let response = Response::method_not_allowed(&[Method::GET, Method::POST]);

		// Assert
		assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
		assert_eq!(response.headers.get("allow").unwrap(), "GET, POST");
	}

	#[rstest]
	fn test_with_header_skips_invalid_value() {
		let response = Response::ok().with_header("X-Test", "bad\nvalue");

		assert!(response.headers.get("x-test").is_none());
	}

	#[rstest]
	fn test_with_status_keeps_body() {
		let response = Response::html("<p>form</p>").with_status(StatusCode::UNPROCESSABLE_ENTITY);

		assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
		assert_eq!(response.body_text(), "<p>form</p>");
	}
}
