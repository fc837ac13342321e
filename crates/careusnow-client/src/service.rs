use crate::error::ServiceResult;
use crate::models::{
	Appointment, CreateAppointmentParams, CreateUserParams, Patient, RegisterPatientParams, User,
};
use async_trait::async_trait;

/// Remote operations the intake pages depend on
///
/// Each call is a single attempt; callers decide what a failure means for the
/// user.
#[async_trait]
pub trait PatientService: Send + Sync {
	/// Create a user account, or return the existing account with the same
	/// email address
	async fn create_user(&self, params: CreateUserParams) -> ServiceResult<User>;

	/// Store a patient record, uploading the identification document first
	/// when one is attached
	async fn register_patient(&self, params: RegisterPatientParams) -> ServiceResult<Patient>;

	async fn get_user(&self, user_id: &str) -> ServiceResult<User>;

	/// Patient record belonging to a user
	async fn get_patient(&self, user_id: &str) -> ServiceResult<Patient>;

	async fn create_appointment(&self, params: CreateAppointmentParams) -> ServiceResult<Appointment>;

	async fn get_appointment(&self, appointment_id: &str) -> ServiceResult<Appointment>;
}
