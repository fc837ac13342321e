use super::{FormTemplate, View, bind_posted, optional_text, path_user_id, required_text};
use crate::app::AppState;
use crate::error::AppResult;
use crate::pipeline::SubmissionError;
use async_trait::async_trait;
use careusnow_client::{AppointmentStatus, CreateAppointmentParams};
use careusnow_forms::SubmissionPayload;
use careusnow_forms::schemas::{AppointmentAction, appointment_form};
use careusnow_http::{Method, Request, Response, StatusCode};
use std::sync::Arc;
use tera::Context;
use uuid::Uuid;

const ACTION: AppointmentAction = AppointmentAction::Create;

const TEMPLATE: FormTemplate = FormTemplate {
	name: "new_appointment.html",
	button_label: ACTION.button_label(),
};

pub fn appointment_status(action: AppointmentAction) -> AppointmentStatus {
	match action {
		AppointmentAction::Create => AppointmentStatus::Pending,
		AppointmentAction::Schedule => AppointmentStatus::Scheduled,
		AppointmentAction::Cancel => AppointmentStatus::Cancelled,
	}
}

/// `/patients/{user_id}/new-appointment`: request an appointment
pub struct NewAppointmentView {
	state: Arc<AppState>,
}

impl NewAppointmentView {
	pub fn new(state: Arc<AppState>) -> Self {
		Self { state }
	}

	async fn show(&self, user_id: String) -> AppResult<Response> {
		// Only registered patients can book
		self.state
			.fetch(self.state.service.get_patient(&user_id))
			.await?;

		let form = appointment_form(ACTION)?;
		TEMPLATE.render(
			&self.state.templates,
			&form,
			Uuid::new_v4(),
			page_context(&user_id),
			StatusCode::OK,
		)
	}

	async fn create(&self, user_id: String, request: Request) -> AppResult<Response> {
		let mut form = appointment_form(ACTION)?;
		let form_id = bind_posted(&mut form, &request).await?;

		let service = self.state.service.clone();
		let owner = user_id.clone();
		let result = self
			.state
			.pipeline
			.submit(&mut form, form_id, |payload| async move {
				let patient = service.get_patient(&owner).await?;
				let params = appointment_params(owner, patient.id, ACTION, &payload)?;
				Ok(service.create_appointment(params).await?)
			})
			.await;

		match result {
			Ok(appointment) => {
				tracing::info!(
					user_id = %user_id,
					appointment_id = %appointment.id,
					"appointment requested"
				);
				Ok(Response::see_other(format!(
					"/patients/{}/new-appointment/success?appointmentId={}",
					user_id, appointment.id
				)))
			}
			Err(error) => TEMPLATE.render_rejected(
				&self.state.templates,
				&mut form,
				form_id,
				page_context(&user_id),
				error,
			),
		}
	}
}

fn page_context(user_id: &str) -> Context {
	let mut context = Context::new();
	context.insert("user_id", user_id);
	context
}

/// The `datetime-local` schedule carries no offset; it is stored as UTC.
pub(crate) fn appointment_params(
	user_id: String,
	patient_id: String,
	action: AppointmentAction,
	payload: &SubmissionPayload,
) -> Result<CreateAppointmentParams, SubmissionError> {
	let schedule = payload
		.date_time("schedule")
		.ok_or(SubmissionError::MissingValue("schedule"))?;
	Ok(CreateAppointmentParams {
		user_id,
		patient: patient_id,
		primary_physician: required_text(payload, "primaryPhysician")?,
		schedule: schedule.and_utc(),
		status: appointment_status(action),
		reason: optional_text(payload, "reason").unwrap_or_default(),
		note: optional_text(payload, "notes"),
		cancellation_reason: optional_text(payload, "cancellationReason"),
	})
}

#[async_trait]
impl View for NewAppointmentView {
	async fn respond(&self, request: Request) -> AppResult<Response> {
		let user_id = path_user_id(&request)?;
		if request.method == Method::POST {
			self.create(user_id, request).await
		} else {
			self.show(user_id).await
		}
	}
}
