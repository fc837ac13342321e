use crate::error::{HttpError, HttpResult};
use bytes::Bytes;
use careusnow_forms::UploadedFile;
use futures_util::{future::ready, stream::once};
use hyper::{HeaderMap, Method, Uri, Version};
use std::collections::HashMap;
use std::net::SocketAddr;

/// Decoded body of a form submission
///
/// Text fields keep their submission order. File parts with an empty file
/// name are what browsers send for an untouched file input and are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
	pub fields: Vec<(String, String)>,
	pub files: Vec<(String, UploadedFile)>,
}

impl FormData {
	/// Last value submitted under `name`
	pub fn get(&self, name: &str) -> Option<&str> {
		self.fields
			.iter()
			.rev()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}

	pub fn file(&self, name: &str) -> Option<&UploadedFile> {
		self.files
			.iter()
			.rev()
			.find(|(key, _)| key == name)
			.map(|(_, file)| file)
	}
}

/// HTTP request with its body fully read
#[derive(Debug, Clone)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
	pub remote_addr: Option<SocketAddr>,
	/// Parameters captured by the router
	pub path_params: HashMap<String, String>,
}

impl Request {
	pub fn new(method: Method, uri: Uri, version: Version, headers: HeaderMap, body: Bytes) -> Self {
		Self {
			method,
			uri,
			version,
			headers,
			body,
			remote_addr: None,
			path_params: HashMap::new(),
		}
	}

	/// Bodiless request, mostly useful in tests
	///
	/// # Examples
	///
	/// ```
	/// use careusnow_http::Request;
	/// use hyper::Method;
	///
	/// let request = Request::get("/patients/u1/register?step=2");
	/// assert_eq!(request.method, Method::GET);
	/// assert_eq!(request.path(), "/patients/u1/register");
	/// assert_eq!(request.query_param("step").as_deref(), Some("2"));
	/// ```
	pub fn get(uri: &str) -> Self {
		Self::new(
			Method::GET,
			uri.parse().unwrap_or_default(),
			Version::HTTP_11,
			HeaderMap::new(),
			Bytes::new(),
		)
	}

	/// URL-encoded form post
	pub fn post_form(uri: &str, pairs: &[(&str, &str)]) -> Self {
		let body = serde_urlencoded::to_string(pairs).unwrap_or_default();
		let mut headers = HeaderMap::new();
		headers.insert(
			hyper::header::CONTENT_TYPE,
			hyper::header::HeaderValue::from_static("application/x-www-form-urlencoded"),
		);
		Self::new(
			Method::POST,
			uri.parse().unwrap_or_default(),
			Version::HTTP_11,
			headers,
			Bytes::from(body),
		)
	}

	pub fn path(&self) -> &str {
		self.uri.path()
	}

	pub fn path_param(&self, name: &str) -> Option<&str> {
		self.path_params.get(name).map(String::as_str)
	}

	pub fn query_param(&self, name: &str) -> Option<String> {
		let query = self.uri.query()?;
		serde_urlencoded::from_str::<Vec<(String, String)>>(query)
			.ok()?
			.into_iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value)
	}

	pub fn content_type(&self) -> Option<&str> {
		self.headers
			.get(hyper::header::CONTENT_TYPE)
			.and_then(|v| v.to_str().ok())
	}

	/// Decode an `application/x-www-form-urlencoded` or `multipart/form-data`
	/// body
	pub async fn form_data(&self) -> HttpResult<FormData> {
		let content_type = self.content_type().unwrap_or("");
		if content_type.starts_with("application/x-www-form-urlencoded") {
			let fields = serde_urlencoded::from_bytes::<Vec<(String, String)>>(&self.body)
				.map_err(|e| HttpError::BadRequest(format!("Malformed form body: {}", e)))?;
			return Ok(FormData {
				fields,
				files: Vec::new(),
			});
		}
		if content_type.starts_with("multipart/form-data") {
			return self.multipart_form_data(content_type).await;
		}
		Err(HttpError::UnsupportedMediaType(content_type.to_string()))
	}

	async fn multipart_form_data(&self, content_type: &str) -> HttpResult<FormData> {
		let boundary = multer::parse_boundary(content_type)?;
		let stream = once(ready(Ok::<_, std::io::Error>(self.body.clone())));
		let mut multipart = multer::Multipart::new(stream, boundary);

		let mut data = FormData::default();
		while let Some(field) = multipart.next_field().await? {
			let Some(name) = field.name().map(str::to_string) else {
				return Err(HttpError::BadRequest("Multipart field name missing".to_string()));
			};

			match field.file_name().map(str::to_string) {
				None => data.fields.push((name, field.text().await?)),
				Some(file_name) => {
					let content_type = field
						.content_type()
						.map(|mime| mime.to_string())
						.unwrap_or_else(|| "application/octet-stream".to_string());
					let bytes = field.bytes().await?;
					if file_name.is_empty() && bytes.is_empty() {
						continue;
					}
					tracing::debug!(field = %name, file_name = %file_name, size = bytes.len(), "received file part");
					data.files
						.push((name, UploadedFile::new(file_name, content_type, bytes)));
				}
			}
		}
		Ok(data)
	}
}
