//! Appwrite REST backend
//!
//! Talks to the users, databases and storage endpoints with a server API key.
//! Every request is bounded by the configured timeout.

use crate::error::{ServiceError, ServiceResult};
use crate::models::{
	Appointment, CreateAppointmentParams, CreateUserParams, Document, DocumentList, Patient,
	RegisterPatientParams, StoredFile, User, UserList,
};
use crate::service::PatientService;
use async_trait::async_trait;
use careusnow_conf::AppwriteSettings;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, Url, multipart};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

/// Let the service assign the identifier
const UNIQUE_ID: &str = "unique()";

/// Connection parameters for [`AppwriteClient`]
#[derive(Debug, Clone)]
pub struct AppwriteConfig {
	pub endpoint: String,
	pub project_id: String,
	pub api_key: String,
	pub database_id: String,
	pub patient_collection_id: String,
	pub appointment_collection_id: String,
	pub bucket_id: String,
	pub timeout: Duration,
}

impl From<&AppwriteSettings> for AppwriteConfig {
	fn from(settings: &AppwriteSettings) -> Self {
		Self {
			endpoint: settings.endpoint.clone(),
			project_id: settings.project_id.clone(),
			api_key: settings.api_key.expose().to_string(),
			database_id: settings.database_id.clone(),
			patient_collection_id: settings.patient_collection_id.clone(),
			appointment_collection_id: settings.appointment_collection_id.clone(),
			bucket_id: settings.bucket_id.clone(),
			timeout: settings.request_timeout(),
		}
	}
}

/// [`PatientService`] backed by the Appwrite REST API
#[derive(Debug, Clone)]
pub struct AppwriteClient {
	config: AppwriteConfig,
	base: Url,
	client: Client,
}

impl AppwriteClient {
	pub fn new(config: AppwriteConfig) -> ServiceResult<Self> {
		let mut headers = HeaderMap::new();
		headers.insert(
			"X-Appwrite-Project",
			HeaderValue::from_str(&config.project_id)
				.map_err(|e| ServiceError::Config(format!("invalid project id: {}", e)))?,
		);
		let mut key = HeaderValue::from_str(&config.api_key)
			.map_err(|e| ServiceError::Config(format!("invalid api key: {}", e)))?;
		key.set_sensitive(true);
		headers.insert("X-Appwrite-Key", key);

		let client = Client::builder()
			.timeout(config.timeout)
			.default_headers(headers)
			.build()?;
		Self::with_client(config, client)
	}

	/// Use a preconfigured HTTP client; it must send the project and key headers
	pub fn with_client(config: AppwriteConfig, client: Client) -> ServiceResult<Self> {
		let base = Url::parse(&config.endpoint)
			.map_err(|e| ServiceError::Config(format!("invalid endpoint {}: {}", config.endpoint, e)))?;
		if base.cannot_be_a_base() {
			return Err(ServiceError::Config(format!(
				"endpoint {} cannot be a base URL",
				config.endpoint
			)));
		}
		Ok(Self {
			config,
			base,
			client,
		})
	}

	pub fn config(&self) -> &AppwriteConfig {
		&self.config
	}

	fn url(&self, segments: &[&str]) -> Url {
		let mut url = self.base.clone();
		if let Ok(mut path) = url.path_segments_mut() {
			path.pop_if_empty().extend(segments);
		}
		url
	}

	fn documents_url(&self, collection_id: &str) -> Url {
		self.url(&[
			"databases",
			&self.config.database_id,
			"collections",
			collection_id,
			"documents",
		])
	}

	/// Public view URL of a stored file
	pub fn file_view_url(&self, file_id: &str) -> String {
		let mut url = self.url(&["storage", "buckets", &self.config.bucket_id, "files", file_id, "view"]);
		url.query_pairs_mut()
			.append_pair("project", &self.config.project_id);
		url.to_string()
	}

	async fn send(&self, request: RequestBuilder) -> ServiceResult<Response> {
		let response = request.send().await?;
		let status = response.status();
		if status.is_success() {
			return Ok(response);
		}
		let body = response
			.text()
			.await
			.unwrap_or_else(|_| "Unknown error".to_string());
		Err(ServiceError::from_response(status, &body))
	}

	async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ServiceResult<T> {
		let response = self.send(request).await?;
		Ok(response.json::<T>().await?)
	}

	async fn find_user_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
		let query = equal_query("email", email);
		let list: UserList = self
			.send_json(self.client.get(self.url(&["users"])).query(&[("queries[]", query)]))
			.await?;
		Ok(list.users.into_iter().next())
	}

	async fn upload_document(&self, document: Document) -> ServiceResult<StoredFile> {
		let part = multipart::Part::bytes(document.bytes.to_vec())
			.file_name(document.file_name)
			.mime_str(&document.content_type)
			.map_err(|e| ServiceError::Config(format!("invalid content type: {}", e)))?;
		let form = multipart::Form::new()
			.text("fileId", UNIQUE_ID)
			.part("file", part);
		let url = self.url(&["storage", "buckets", &self.config.bucket_id, "files"]);
		self.send_json(self.client.post(url).multipart(form)).await
	}
}

fn equal_query(attribute: &str, value: &str) -> String {
	json!({ "method": "equal", "attribute": attribute, "values": [value] }).to_string()
}

#[async_trait]
impl PatientService for AppwriteClient {
	async fn create_user(&self, params: CreateUserParams) -> ServiceResult<User> {
		let body = json!({
			"userId": UNIQUE_ID,
			"email": params.email,
			"phone": params.phone,
			"name": params.name,
		});
		let created = self
			.send_json::<User>(self.client.post(self.url(&["users"])).json(&body))
			.await;

		match created {
			Ok(user) => {
				tracing::info!(user_id = %user.id, "created user");
				Ok(user)
			}
			Err(ServiceError::Conflict(message)) => {
				tracing::info!("user already exists, looking up by email");
				self.find_user_by_email(&params.email)
					.await?
					.ok_or(ServiceError::Conflict(message))
			}
			Err(e) => Err(e),
		}
	}

	async fn register_patient(&self, mut params: RegisterPatientParams) -> ServiceResult<Patient> {
		let mut data = serde_json::to_value(&params)
			.map_err(|e| ServiceError::Decode(format!("failed to encode patient: {}", e)))?;

		if let Some(document) = params.identification_document.take() {
			let file = self.upload_document(document).await?;
			tracing::debug!(file_id = %file.id, "uploaded identification document");
			data["identificationDocumentId"] = json!(file.id);
			data["identificationDocumentUrl"] = json!(self.file_view_url(&file.id));
		}

		let body = json!({ "documentId": UNIQUE_ID, "data": data });
		let patient: Patient = self
			.send_json(
				self.client
					.post(self.documents_url(&self.config.patient_collection_id))
					.json(&body),
			)
			.await?;
		tracing::info!(patient_id = %patient.id, user_id = %patient.user_id, "registered patient");
		Ok(patient)
	}

	async fn get_user(&self, user_id: &str) -> ServiceResult<User> {
		self.send_json(self.client.get(self.url(&["users", user_id])))
			.await
	}

	async fn get_patient(&self, user_id: &str) -> ServiceResult<Patient> {
		let query = equal_query("userId", user_id);
		let list: DocumentList<Patient> = self
			.send_json(
				self.client
					.get(self.documents_url(&self.config.patient_collection_id))
					.query(&[("queries[]", query)]),
			)
			.await?;
		list.documents
			.into_iter()
			.next()
			.ok_or_else(|| ServiceError::NotFound(format!("no patient for user {}", user_id)))
	}

	async fn create_appointment(&self, params: CreateAppointmentParams) -> ServiceResult<Appointment> {
		let body = json!({ "documentId": UNIQUE_ID, "data": params });
		let appointment: Appointment = self
			.send_json(
				self.client
					.post(self.documents_url(&self.config.appointment_collection_id))
					.json(&body),
			)
			.await?;
		tracing::info!(appointment_id = %appointment.id, status = appointment.status.as_str(), "created appointment");
		Ok(appointment)
	}

	async fn get_appointment(&self, appointment_id: &str) -> ServiceResult<Appointment> {
		let mut url = self.documents_url(&self.config.appointment_collection_id);
		if let Ok(mut path) = url.path_segments_mut() {
			path.push(appointment_id);
		}
		self.send_json(self.client.get(url)).await
	}
}
