//! Page views
//!
//! Each view answers GET with an empty (or prefilled) form and POST with
//! either a 303 redirect to the next step or the same form re-rendered with
//! its errors.

mod appointment;
mod landing;
mod register;
mod success;

pub use appointment::{NewAppointmentView, appointment_status};
pub use landing::LandingView;
pub use register::RegisterView;
pub use success::SuccessView;

use crate::error::{AppError, AppResult};
use crate::pipeline::{FORM_ID_FIELD, SubmissionError, form_id_from};
use crate::templates::Templates;
use async_trait::async_trait;
use careusnow_forms::rendering::render_non_field_errors;
use careusnow_forms::{ALL_FIELDS_KEY, Form, SubmissionPayload, SubmitButton};
use careusnow_http::{Handler, HttpError, HttpResult, Request, Response, StatusCode};
use chrono::{Datelike, Utc};
use std::collections::HashMap;
use tera::Context;
use uuid::Uuid;

const SUBMISSION_FAILED_MESSAGE: &str = "Something went wrong. Please try again.";
const SUBMISSION_IN_PROGRESS_MESSAGE: &str =
	"This form is already being submitted. Please wait for it to finish.";

/// A page that may fail with an [`AppError`]
#[async_trait]
pub trait View: Send + Sync {
	async fn respond(&self, request: Request) -> AppResult<Response>;
}

/// Adapts a [`View`] to a router handler, turning errors into status pages
pub struct Page<V> {
	view: V,
	templates: Templates,
}

impl<V: View> Page<V> {
	pub fn new(view: V, templates: &Templates) -> Self {
		Self {
			view,
			templates: templates.clone(),
		}
	}
}

#[async_trait]
impl<V: View> Handler for Page<V> {
	async fn handle(&self, request: Request) -> HttpResult<Response> {
		let path = request.path().to_string();
		match self.view.respond(request).await {
			Ok(response) => Ok(response),
			Err(error) => {
				let status = error.status_code();
				if status.is_server_error() {
					tracing::error!(path = %path, error = %error, "page failed");
				} else {
					tracing::debug!(path = %path, error = %error, "page rejected");
				}
				Ok(self.templates.error_page(status, public_message(&error)))
			}
		}
	}
}

/// Text shown to the visitor; internal details stay in the log
fn public_message(error: &AppError) -> &'static str {
	match error.status_code() {
		StatusCode::NOT_FOUND => "The requested page could not be found.",
		StatusCode::BAD_REQUEST => "The request could not be understood.",
		StatusCode::PAYLOAD_TOO_LARGE => "The uploaded file is too large.",
		StatusCode::UNSUPPORTED_MEDIA_TYPE => "The form was submitted in an unsupported format.",
		StatusCode::BAD_GATEWAY => "The service is temporarily unavailable. Please try again.",
		_ => "An error occurred while processing your request.",
	}
}

pub struct NotFoundView;

#[async_trait]
impl View for NotFoundView {
	async fn respond(&self, request: Request) -> AppResult<Response> {
		Err(AppError::NotFound(request.path().to_string()))
	}
}

/// Liveness check
pub struct HealthView;

#[async_trait]
impl Handler for HealthView {
	async fn handle(&self, _request: Request) -> HttpResult<Response> {
		Ok(Response::text("ok"))
	}
}

/// Bind a posted body onto `form` and return the form instance id
///
/// Undeclared keys and files are ignored.
pub(crate) async fn bind_posted(form: &mut Form, request: &Request) -> AppResult<Uuid> {
	let data = request.form_data().await?;
	let form_id = form_id_from(data.get(FORM_ID_FIELD));
	form.bind(data.fields.iter().map(|(name, value)| (name.as_str(), value.clone())));
	for (name, file) in data.files {
		if form.field(&name).is_some() {
			form.select_file(&name, file)?;
		}
	}
	Ok(form_id)
}

pub(crate) fn path_user_id(request: &Request) -> AppResult<String> {
	request
		.path_param("user_id")
		.map(str::to_string)
		.ok_or_else(|| AppError::Http(HttpError::BadRequest("missing user id".to_string())))
}

pub(crate) fn required_text(
	payload: &SubmissionPayload,
	name: &'static str,
) -> Result<String, SubmissionError> {
	payload
		.text(name)
		.map(str::to_string)
		.ok_or(SubmissionError::MissingValue(name))
}

pub(crate) fn optional_text(payload: &SubmissionPayload, name: &str) -> Option<String> {
	payload.text(name).map(str::to_string)
}

/// Template and submit label of a form page
#[derive(Debug, Clone, Copy)]
pub(crate) struct FormTemplate {
	pub name: &'static str,
	pub button_label: &'static str,
}

impl FormTemplate {
	pub fn context(&self, form: &Form, form_id: Uuid, loading: bool) -> Context {
		let fields: HashMap<&str, String> = form
			.bound_fields()
			.map(|field| (field.name(), field.render()))
			.collect();
		let field_order: Vec<&str> = form.fields().iter().map(|f| f.name.as_str()).collect();

		let mut context = Context::new();
		context.insert("fields", &fields);
		context.insert("field_order", &field_order);
		context.insert("non_field_errors", &render_non_field_errors(form));
		context.insert(
			"submit_button",
			&SubmitButton::new(self.button_label)
				.loading(loading)
				.render(),
		);
		context.insert("form_id", &form_id.to_string());
		context.insert("year", &Utc::now().year());
		context
	}

	/// Render `form` on top of the page-specific `context`
	pub fn render(
		&self,
		templates: &Templates,
		form: &Form,
		form_id: Uuid,
		mut context: Context,
		status: StatusCode,
	) -> AppResult<Response> {
		context.extend(self.context(form, form_id, false));
		templates.page(self.name, &context, status)
	}

	/// Re-render a form whose submission did not succeed
	///
	/// Validation errors are already on the form. A rejected duplicate keeps
	/// the button in its loading state; a failed remote call adds a banner.
	pub fn render_rejected(
		&self,
		templates: &Templates,
		form: &mut Form,
		form_id: Uuid,
		mut context: Context,
		error: SubmissionError,
	) -> AppResult<Response> {
		if matches!(error, SubmissionError::MissingValue(_)) {
			return Err(error.into());
		}
		let mut loading = false;
		match error {
			SubmissionError::Invalid(_) => {}
			SubmissionError::InProgress(_) => {
				form.add_error(ALL_FIELDS_KEY, SUBMISSION_IN_PROGRESS_MESSAGE)?;
				loading = true;
			}
			_ => form.add_error(ALL_FIELDS_KEY, SUBMISSION_FAILED_MESSAGE)?,
		}
		context.extend(self.context(form, form_id, loading));
		templates.page(self.name, &context, error.status_code())
	}
}
