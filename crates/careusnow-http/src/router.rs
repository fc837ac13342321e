//! Path-pattern routing
//!
//! Patterns are literal paths with `{name}` placeholders, each matching one
//! non-empty path segment:
//!
//! ```
//! use careusnow_http::router::PathPattern;
//!
//! let pattern = PathPattern::new("/patients/{user_id}/register").unwrap();
//! let params = pattern.matches("/patients/abc123/register").unwrap();
//! assert_eq!(params["user_id"], "abc123");
//! assert!(pattern.matches("/patients/a/b/register").is_none());
//! ```

use crate::error::{HttpError, HttpResult};
use crate::handler::Handler;
use crate::request::Request;
use crate::response::Response;
use async_trait::async_trait;
use hyper::Method;
use std::collections::HashMap;
use std::sync::Arc;

const MAX_PATTERN_LENGTH: usize = 1024;

#[derive(Debug, Clone)]
pub struct PathPattern {
	pattern: String,
	regex: regex::Regex,
	param_names: Vec<String>,
}

impl PathPattern {
	pub fn new(pattern: &str) -> HttpResult<Self> {
		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(HttpError::InvalidRoute(format!(
				"pattern of {} bytes exceeds {} bytes",
				pattern.len(),
				MAX_PATTERN_LENGTH
			)));
		}
		if !pattern.starts_with('/') {
			return Err(HttpError::InvalidRoute(format!("{} must start with '/'", pattern)));
		}

		let (regex_str, param_names) = Self::compile(pattern)?;
		let regex = regex::Regex::new(&regex_str)
			.map_err(|e| HttpError::InvalidRoute(format!("{}: {}", pattern, e)))?;
		Ok(Self {
			pattern: pattern.to_string(),
			regex,
			param_names,
		})
	}

	fn compile(pattern: &str) -> HttpResult<(String, Vec<String>)> {
		let mut regex_str = String::from("^");
		let mut param_names = Vec::new();
		let mut rest = pattern;

		while let Some(start) = rest.find('{') {
			regex_str.push_str(&regex::escape(&rest[..start]));
			let Some(len) = rest[start..].find('}') else {
				return Err(HttpError::InvalidRoute(format!("unclosed '{{' in {}", pattern)));
			};
			let name = &rest[start + 1..start + len];
			if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
				return Err(HttpError::InvalidRoute(format!(
					"invalid parameter name '{}' in {}",
					name, pattern
				)));
			}
			if param_names.iter().any(|n| n == name) {
				return Err(HttpError::InvalidRoute(format!(
					"duplicate parameter '{}' in {}",
					name, pattern
				)));
			}
			regex_str.push_str(&format!("(?P<{}>[^/]+)", name));
			param_names.push(name.to_string());
			rest = &rest[start + len + 1..];
		}
		regex_str.push_str(&regex::escape(rest));
		regex_str.push('$');
		Ok((regex_str, param_names))
	}

	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
		self.regex.captures(path).map(|caps| {
			self.param_names
				.iter()
				.filter_map(|name| caps.name(name).map(|m| (name.clone(), m.as_str().to_string())))
				.collect()
		})
	}
}

struct Route {
	pattern: PathPattern,
	handlers: Vec<(Method, Arc<dyn Handler>)>,
}

/// Dispatches requests by path and method
///
/// Unknown paths go to the fallback handler (a bare 404 unless one is set).
/// A known path with an unregistered method answers 405 with an `Allow`
/// header. `HEAD` is served by the `GET` handler.
pub struct Router {
	routes: Vec<Route>,
	fallback: Option<Arc<dyn Handler>>,
}

impl Router {
	pub fn new() -> Self {
		Self {
			routes: Vec::new(),
			fallback: None,
		}
	}

	pub fn route<H: Handler + 'static>(
		mut self,
		pattern: &str,
		method: Method,
		handler: H,
	) -> HttpResult<Self> {
		let handler: Arc<dyn Handler> = Arc::new(handler);
		if let Some(route) = self.routes.iter_mut().find(|r| r.pattern.pattern() == pattern) {
			if route.handlers.iter().any(|(m, _)| *m == method) {
				return Err(HttpError::InvalidRoute(format!(
					"{} {} registered twice",
					method, pattern
				)));
			}
			route.handlers.push((method, handler));
		} else {
			self.routes.push(Route {
				pattern: PathPattern::new(pattern)?,
				handlers: vec![(method, handler)],
			});
		}
		Ok(self)
	}

	pub fn get<H: Handler + 'static>(self, pattern: &str, handler: H) -> HttpResult<Self> {
		self.route(pattern, Method::GET, handler)
	}

	pub fn post<H: Handler + 'static>(self, pattern: &str, handler: H) -> HttpResult<Self> {
		self.route(pattern, Method::POST, handler)
	}

	pub fn fallback<H: Handler + 'static>(mut self, handler: H) -> Self {
		self.fallback = Some(Arc::new(handler));
		self
	}
}

impl Default for Router {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Handler for Router {
	async fn handle(&self, mut request: Request) -> HttpResult<Response> {
		let path = request.path().to_string();
		for route in &self.routes {
			let Some(params) = route.pattern.matches(&path) else {
				continue;
			};
			let lookup = if request.method == Method::HEAD {
				Method::GET
			} else {
				request.method.clone()
			};
			let Some((_, handler)) = route.handlers.iter().find(|(m, _)| *m == lookup) else {
				let allowed: Vec<Method> = route.handlers.iter().map(|(m, _)| m.clone()).collect();
				tracing::debug!(method = %request.method, path = %path, "method not allowed");
				return Ok(Response::method_not_allowed(&allowed));
			};
			request.path_params = params;
			let handler = handler.clone();
			return handler.handle(request).await;
		}

		match &self.fallback {
			Some(fallback) => fallback.handle(request).await,
			None => Ok(Response::not_found().with_body("Not Found")),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use hyper::StatusCode;
	use rstest::rstest;

	struct Echo(&'static str);

	#[async_trait]
	impl Handler for Echo {
		async fn handle(&self, request: Request) -> HttpResult<Response> {
			let user = request.path_param("user_id").unwrap_or("-").to_string();
			Ok(Response::text(format!("{}:{}", self.0, user)))
		}
	}

	fn router() -> Router {
		Router::new()
			.get("/", Echo("landing"))
			.unwrap()
			.post("/", Echo("create-user"))
			.unwrap()
			.get("/patients/{user_id}/register", Echo("register"))
			.unwrap()
	}

	#[rstest]
	#[case(Method::GET, "/", "landing:-")]
	#[case(Method::POST, "/", "create-user:-")]
	#[case(Method::GET, "/patients/u42/register", "register:u42")]
	#[tokio::test]
	async fn test_dispatch(#[case] method: Method, #[case] path: &str, #[case] expected: &str) {
		// Arrange
		let mut request = Request::get(path);
		request.method = method;

		// Act
		let response = router().handle(request).await.unwrap();

		// Assert
		assert_eq!(response.status, StatusCode::OK);
		assert_eq!(response.body_text(), expected);
	}

	#[rstest]
	#[tokio::test]
	async fn test_unknown_path_is_404() {
		let response = router().handle(Request::get("/nowhere")).await.unwrap();

		assert_eq!(response.status, StatusCode::NOT_FOUND);
	}

	#[rstest]
	#[tokio::test]
	async fn test_fallback_handles_unknown_path() {
		let router = router().fallback(Echo("fallback"));

		let response = router.handle(Request::get("/nowhere")).await.unwrap();

		assert_eq!(response.body_text(), "fallback:-");
	}

	#[rstest]
	#[tokio::test]
	async fn test_wrong_method_is_405() {
		// Arrange
		let mut request = Request::get("/patients/u1/register");
		request.method = Method::DELETE;

		// Act
		let response = router().handle(request).await.unwrap();

		// Assert
		assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
		assert_eq!(response.headers.get("allow").unwrap(), "GET");
	}

	#[rstest]
	fn test_duplicate_registration_is_rejected() {
		let result = Router::new().get("/", Echo("a")).unwrap().get("/", Echo("b"));

		assert!(matches!(result, Err(HttpError::InvalidRoute(_))));
	}

	#[rstest]
	#[case("no-slash")]
	#[case("/patients/{user_id")]
	#[case("/patients/{}/x")]
	#[case("/a/{id}/b/{id}")]
	fn test_invalid_patterns(#[case] pattern: &str) {
		assert!(PathPattern::new(pattern).is_err());
	}

	#[rstest]
	fn test_literal_dots_are_escaped() {
		let pattern = PathPattern::new("/assets/logo.svg").unwrap();

		assert!(pattern.matches("/assets/logo.svg").is_some());
		assert!(pattern.matches("/assets/logoXsvg").is_none());
	}
}
