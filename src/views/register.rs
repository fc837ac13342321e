use super::{FormTemplate, View, bind_posted, optional_text, path_user_id, required_text};
use crate::app::AppState;
use crate::error::AppResult;
use crate::pipeline::SubmissionError;
use async_trait::async_trait;
use careusnow_client::{Document, Gender, RegisterPatientParams};
use careusnow_forms::schemas::patient_form;
use careusnow_forms::SubmissionPayload;
use careusnow_http::{Method, Request, Response, StatusCode};
use std::sync::Arc;
use tera::Context;
use uuid::Uuid;

const TEMPLATE: FormTemplate = FormTemplate {
	name: "register.html",
	button_label: "Submit and continue",
};

/// `/patients/{user_id}/register`: the full patient registration form
pub struct RegisterView {
	state: Arc<AppState>,
}

impl RegisterView {
	pub fn new(state: Arc<AppState>) -> Self {
		Self { state }
	}

	async fn show(&self, user_id: String) -> AppResult<Response> {
		let user = self.state.fetch(self.state.service.get_user(&user_id)).await?;

		let mut form = patient_form()?;
		form.set_value("name", user.name)?;
		form.set_value("email", user.email)?;
		form.set_value("phone", user.phone)?;

		TEMPLATE.render(
			&self.state.templates,
			&form,
			Uuid::new_v4(),
			page_context(&user_id),
			StatusCode::OK,
		)
	}

	async fn register(&self, user_id: String, request: Request) -> AppResult<Response> {
		let mut form = patient_form()?;
		let form_id = bind_posted(&mut form, &request).await?;

		let service = self.state.service.clone();
		let owner = user_id.clone();
		let result = self
			.state
			.pipeline
			.submit(&mut form, form_id, |payload| async move {
				let params = patient_params(owner, payload)?;
				Ok(service.register_patient(params).await?)
			})
			.await;

		match result {
			Ok(patient) => {
				tracing::info!(user_id = %user_id, patient_id = %patient.id, "patient registered");
				Ok(Response::see_other(format!(
					"/patients/{}/new-appointment",
					user_id
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

/// Map a validated registration onto the remote record
pub(crate) fn patient_params(
	user_id: String,
	mut payload: SubmissionPayload,
) -> Result<RegisterPatientParams, SubmissionError> {
	let identification_document = payload.take_attachment().map(|(_, file)| Document {
		file_name: file.file_name,
		content_type: file.content_type,
		bytes: file.bytes,
	});
	let gender = payload
		.text("gender")
		.and_then(Gender::from_label)
		.ok_or(SubmissionError::MissingValue("gender"))?;

	Ok(RegisterPatientParams {
		user_id,
		name: required_text(&payload, "name")?,
		email: required_text(&payload, "email")?,
		phone: required_text(&payload, "phone")?,
		birth_date: payload
			.date("birthDate")
			.ok_or(SubmissionError::MissingValue("birthDate"))?,
		gender,
		address: required_text(&payload, "address")?,
		occupation: required_text(&payload, "occupation")?,
		emergency_contact_name: required_text(&payload, "emergencyContactName")?,
		emergency_contact_number: required_text(&payload, "emergencyContactNumber")?,
		primary_physician: required_text(&payload, "primaryPhysician")?,
		insurance_provider: required_text(&payload, "insuranceProvider")?,
		insurance_policy_number: required_text(&payload, "insurancePolicyNumber")?,
		allergies: optional_text(&payload, "allergies"),
		current_medication: optional_text(&payload, "currentMedication"),
		family_medical_history: optional_text(&payload, "familyMedicalHistory"),
		past_medical_history: optional_text(&payload, "pastMedicalHistory"),
		identification_type: required_text(&payload, "identificationType")?,
		identification_number: required_text(&payload, "identificationNumber")?,
		identification_document,
		treatment_consent: payload.flag("treatmentConsent"),
		disclosure_consent: payload.flag("disclosureConsent"),
		privacy_consent: payload.flag("privacyConsent"),
	})
}

#[async_trait]
impl View for RegisterView {
	async fn respond(&self, request: Request) -> AppResult<Response> {
		let user_id = path_user_id(&request)?;
		if request.method == Method::POST {
			self.register(user_id, request).await
		} else {
			self.show(user_id).await
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use careusnow_forms::{Form, UploadedFile};
	use chrono::NaiveDate;
	use rstest::rstest;

	fn valid_form() -> Form {
		let mut form = patient_form().unwrap();
		form.bind([
			("name", "Ada Lovelace"),
			("email", "ada@example.com"),
			("phone", "+8801234567890"),
			("birthDate", "1990-04-12"),
			("gender", "Female"),
			("address", "14th Street, New York"),
			("occupation", "Engineer"),
			("emergencyContactName", "Byron"),
			("emergencyContactNumber", "+8801987654321"),
			("primaryPhysician", "Leila Cameron"),
			("insuranceProvider", "BlueCross"),
			("insurancePolicyNumber", "ABC123"),
			("allergies", "Peanuts"),
			("identificationType", "Passport"),
			("identificationNumber", "X123"),
			("treatmentConsent", "on"),
			("disclosureConsent", "on"),
			("privacyConsent", "on"),
		]);
		form
	}

	#[rstest]
	fn test_patient_params_from_valid_form() {
		// Arrange
		let mut form = valid_form();
		form.select_file(
			"identificationDocument",
			UploadedFile::new("passport.png", "image/png", &b"png"[..]),
		)
		.unwrap();
		assert!(form.validate());

		// Act
		let params = patient_params("u1".to_string(), form.payload().unwrap()).unwrap();

		// Assert
		assert_eq!(params.user_id, "u1");
		assert_eq!(params.gender, Gender::Female);
		assert_eq!(params.birth_date, NaiveDate::from_ymd_opt(1990, 4, 12).unwrap());
		assert_eq!(params.allergies.as_deref(), Some("Peanuts"));
		assert_eq!(params.current_medication, None);
		assert!(params.privacy_consent);
		assert_eq!(
			params.identification_document.map(|d| d.file_name),
			Some("passport.png".to_string())
		);
	}

	#[rstest]
	fn test_missing_consents_yield_one_error_each() {
		// Arrange
		let mut form = valid_form();
		form.bind([
			("treatmentConsent", ""),
			("disclosureConsent", ""),
			("privacyConsent", ""),
		]);

		// Act
		let valid = form.validate();

		// Assert
		assert!(!valid);
		assert_eq!(form.errors().len(), 3);
		assert_eq!(
			form.error("privacyConsent"),
			Some("You must consent to privacy in order to proceed")
		);
	}
}
