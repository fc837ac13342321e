//! Client for the remote user, patient and appointment service
//!
//! [`PatientService`] is the seam the web layer depends on. [`AppwriteClient`]
//! implements it over the Appwrite REST API.

pub mod appwrite;
pub mod error;
pub mod models;
pub mod service;

pub use appwrite::{AppwriteClient, AppwriteConfig};
pub use error::{ServiceError, ServiceResult};
pub use models::{
	Appointment, AppointmentStatus, CreateAppointmentParams, CreateUserParams, Document, Gender,
	Patient, RegisterPatientParams, StoredFile, User,
};
pub use service::PatientService;
