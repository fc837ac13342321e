use super::{FormTemplate, View, bind_posted, required_text};
use crate::app::AppState;
use crate::error::AppResult;
use async_trait::async_trait;
use careusnow_client::CreateUserParams;
use careusnow_forms::schemas::user_form;
use careusnow_http::{Method, Request, Response, StatusCode};
use std::sync::Arc;
use tera::Context;
use uuid::Uuid;

const TEMPLATE: FormTemplate = FormTemplate {
	name: "landing.html",
	button_label: "Get Started",
};

/// `/`: collects name, email and phone and creates the user account
pub struct LandingView {
	state: Arc<AppState>,
}

impl LandingView {
	pub fn new(state: Arc<AppState>) -> Self {
		Self { state }
	}

	async fn create_user(&self, request: Request) -> AppResult<Response> {
		let mut form = user_form()?;
		let form_id = bind_posted(&mut form, &request).await?;

		let service = self.state.service.clone();
		let result = self
			.state
			.pipeline
			.submit(&mut form, form_id, |payload| async move {
				let params = CreateUserParams {
					name: required_text(&payload, "name")?,
					email: required_text(&payload, "email")?,
					phone: required_text(&payload, "phone")?,
				};
				Ok(service.create_user(params).await?)
			})
			.await;

		match result {
			Ok(user) => {
				tracing::info!(user_id = %user.id, "user ready for registration");
				Ok(Response::see_other(format!("/patients/{}/register", user.id)))
			}
			Err(error) => TEMPLATE.render_rejected(
				&self.state.templates,
				&mut form,
				form_id,
				Context::new(),
				error,
			),
		}
	}
}

#[async_trait]
impl View for LandingView {
	async fn respond(&self, request: Request) -> AppResult<Response> {
		if request.method == Method::POST {
			return self.create_user(request).await;
		}
		let form = user_form()?;
		TEMPLATE.render(
			&self.state.templates,
			&form,
			Uuid::new_v4(),
			Context::new(),
			StatusCode::OK,
		)
	}
}
