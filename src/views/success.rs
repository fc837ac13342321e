use super::{View, path_user_id};
use crate::app::AppState;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use careusnow_forms::constants::find_doctor;
use careusnow_http::{HttpError, Request, Response, StatusCode};
use chrono::{DateTime, Datelike, Utc};
use std::sync::Arc;
use tera::Context;

/// `/patients/{user_id}/new-appointment/success?appointmentId=`
pub struct SuccessView {
	state: Arc<AppState>,
}

impl SuccessView {
	pub fn new(state: Arc<AppState>) -> Self {
		Self { state }
	}
}

/// e.g. `Jul 1, 2024, 9:30 AM`
pub(crate) fn format_schedule(schedule: &DateTime<Utc>) -> String {
	schedule.format("%b %-d, %Y, %-I:%M %p").to_string()
}

#[async_trait]
impl View for SuccessView {
	async fn respond(&self, request: Request) -> AppResult<Response> {
		let user_id = path_user_id(&request)?;
		let appointment_id = request
			.query_param("appointmentId")
			.filter(|id| !id.is_empty())
			.ok_or_else(|| AppError::Http(HttpError::BadRequest("missing appointmentId".to_string())))?;

		let appointment = self
			.state
			.fetch(self.state.service.get_appointment(&appointment_id))
			.await?;
		if appointment.user_id != user_id {
			return Err(AppError::NotFound(format!(
				"appointment {} of user {}",
				appointment_id, user_id
			)));
		}

		let doctor = find_doctor(&appointment.primary_physician);
		let mut context = Context::new();
		context.insert("user_id", &user_id);
		context.insert("doctor_name", &appointment.primary_physician);
		context.insert("doctor_image", &doctor.map(|d| d.image));
		context.insert("schedule", &format_schedule(&appointment.schedule));
		context.insert("year", &Utc::now().year());
		self.state.templates.page("success.html", &context, StatusCode::OK)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use rstest::rstest;

	#[rstest]
	#[case(Utc.with_ymd_and_hms(2024, 7, 1, 9, 30, 0).unwrap(), "Jul 1, 2024, 9:30 AM")]
	#[case(Utc.with_ymd_and_hms(2024, 12, 24, 18, 5, 0).unwrap(), "Dec 24, 2024, 6:05 PM")]
	fn test_format_schedule(#[case] schedule: DateTime<Utc>, #[case] expected: &str) {
		assert_eq!(format_schedule(&schedule), expected);
	}
}
