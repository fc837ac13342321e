//! Application wiring: shared state, routes and the serve loop

use crate::error::{AppError, AppResult};
use crate::pipeline::SubmissionPipeline;
use crate::templates::Templates;
use crate::views::{
	HealthView, LandingView, NewAppointmentView, NotFoundView, Page, RegisterView, SuccessView,
};
use careusnow_client::{AppwriteClient, AppwriteConfig, PatientService, ServiceError};
use careusnow_conf::Settings;
use careusnow_http::{HttpResult, HttpServer, Router, ShutdownCoordinator, ctrl_c_signal};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// State shared by every view
pub struct AppState {
	pub service: Arc<dyn PatientService>,
	pub templates: Templates,
	pub pipeline: SubmissionPipeline,
}

impl AppState {
	pub fn new(service: Arc<dyn PatientService>, request_timeout: Duration) -> AppResult<Self> {
		Ok(Self {
			service,
			templates: Templates::new()?,
			pipeline: SubmissionPipeline::new(request_timeout),
		})
	}

	/// Await a remote lookup under the request timeout
	pub async fn fetch<T, Fut>(&self, call: Fut) -> AppResult<T>
	where
		Fut: Future<Output = Result<T, ServiceError>>,
	{
		match tokio::time::timeout(self.pipeline.timeout(), call).await {
			Ok(result) => Ok(result?),
			Err(_) => Err(AppError::Service(ServiceError::Timeout)),
		}
	}
}

/// Routes of the intake site
pub fn build_router(state: Arc<AppState>) -> HttpResult<Router> {
	let templates = &state.templates;

	Ok(Router::new()
		.get("/", Page::new(LandingView::new(state.clone()), templates))?
		.post("/", Page::new(LandingView::new(state.clone()), templates))?
		.get(
			"/patients/{user_id}/register",
			Page::new(RegisterView::new(state.clone()), templates),
		)?
		.post(
			"/patients/{user_id}/register",
			Page::new(RegisterView::new(state.clone()), templates),
		)?
		.get(
			"/patients/{user_id}/new-appointment",
			Page::new(NewAppointmentView::new(state.clone()), templates),
		)?
		.post(
			"/patients/{user_id}/new-appointment",
			Page::new(NewAppointmentView::new(state.clone()), templates),
		)?
		.get(
			"/patients/{user_id}/new-appointment/success",
			Page::new(SuccessView::new(state.clone()), templates),
		)?
		.get("/healthz", HealthView)?
		.fallback(Page::new(NotFoundView, templates)))
}

/// Run the server until Ctrl-C
pub async fn serve(settings: Settings) -> AppResult<()> {
	let addr = settings.socket_addr()?;
	let client = AppwriteClient::new(AppwriteConfig::from(&settings.appwrite))?;
	let state = Arc::new(AppState::new(
		Arc::new(client),
		settings.appwrite.request_timeout(),
	)?);
	let router = build_router(state)?;

	let coordinator = ShutdownCoordinator::new(settings.shutdown_grace_period());
	tokio::spawn(ctrl_c_signal(coordinator.clone()));

	tracing::info!(
		address = %addr,
		endpoint = %settings.appwrite.endpoint,
		debug = settings.debug,
		"starting CareUsNow"
	);
	HttpServer::new(router)
		.with_max_body_size(settings.max_upload_size)
		.listen_with_shutdown(addr, coordinator)
		.await?;
	tracing::info!("server stopped");
	Ok(())
}
