//! Page templates
//!
//! Templates are compiled into the binary and rendered with Tera. Names ending
//! in `.html` are autoescaped; pre-rendered form markup is inserted with the
//! `safe` filter.

use crate::error::AppResult;
use careusnow_http::{Response, StatusCode};
use std::sync::Arc;
use tera::{Context, Tera};

const TEMPLATES: &[(&str, &str)] = &[
	("base.html", include_str!("../templates/base.html")),
	("landing.html", include_str!("../templates/landing.html")),
	("register.html", include_str!("../templates/register.html")),
	("new_appointment.html", include_str!("../templates/new_appointment.html")),
	("success.html", include_str!("../templates/success.html")),
	("error.html", include_str!("../templates/error.html")),
];

#[derive(Debug, Clone)]
pub struct Templates {
	tera: Arc<Tera>,
}

impl Templates {
	pub fn new() -> AppResult<Self> {
		let mut tera = Tera::default();
		tera.add_raw_templates(TEMPLATES.iter().copied())?;
		Ok(Self {
			tera: Arc::new(tera),
		})
	}

	pub fn render(&self, name: &str, context: &Context) -> AppResult<String> {
		Ok(self.tera.render(name, context)?)
	}

	/// Render `name` into an HTML response with `status`
	pub fn page(&self, name: &str, context: &Context, status: StatusCode) -> AppResult<Response> {
		let html = self.render(name, context)?;
		Ok(Response::html(html).with_status(status))
	}

	/// Status page; falls back to plain text if the template itself fails
	pub fn error_page(&self, status: StatusCode, message: &str) -> Response {
		let mut context = Context::new();
		context.insert("status_code", &status.as_u16());
		context.insert("title", status.canonical_reason().unwrap_or("Error"));
		context.insert("message", message);
		match self.render("error.html", &context) {
			Ok(html) => Response::html(html).with_status(status),
			Err(e) => {
				tracing::error!(error = %e, "failed to render error page");
				Response::text(message.to_string()).with_status(status)
			}
		}
	}
}
