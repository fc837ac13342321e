//! Submission pipeline
//!
//! A posted form moves through `Idle -> Submitting -> Succeeded | Failed`.
//! The rendered page carries a form instance id; while a submission for that
//! id is running, a second post of the same instance is turned away before
//! any remote call. The in-flight mark is held by an RAII guard so it is
//! cleared however the submission settles, and every remote call is bounded
//! by a timeout.

use careusnow_client::ServiceError;
use careusnow_forms::{Form, SubmissionPayload, SubmitError};
use careusnow_http::StatusCode;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Name of the hidden input carrying the form instance id
pub const FORM_ID_FIELD: &str = "form_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
	Idle,
	Submitting,
	Succeeded,
	Failed,
}

impl SubmissionState {
	/// State a finished submission settled in
	pub fn of<T>(outcome: &Result<T, SubmissionError>) -> Self {
		match outcome {
			Ok(_) => Self::Succeeded,
			Err(error) => error.state(),
		}
	}
}

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
	#[error("Form has {0} invalid field(s)")]
	Invalid(usize),

	#[error("Form {0} is already being submitted")]
	InProgress(Uuid),

	#[error("Remote call did not finish within {0:?}")]
	Timeout(Duration),

	#[error("Remote call failed: {0}")]
	Service(#[from] ServiceError),

	#[error("Cleaned data is missing {0}")]
	MissingValue(&'static str),
}

impl SubmissionError {
	/// Status of the page re-rendered after this error
	pub fn status_code(&self) -> StatusCode {
		match self {
			Self::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
			Self::InProgress(_) => StatusCode::CONFLICT,
			Self::Timeout(_) | Self::Service(_) => StatusCode::BAD_GATEWAY,
			Self::MissingValue(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	pub fn state(&self) -> SubmissionState {
		match self {
			// Rejected before leaving idle
			Self::Invalid(_) | Self::InProgress(_) => SubmissionState::Idle,
			_ => SubmissionState::Failed,
		}
	}
}

/// Form instance ids with a submission in flight
#[derive(Debug, Clone, Default)]
pub struct InFlightRegistry {
	ids: Arc<Mutex<HashSet<Uuid>>>,
}

impl InFlightRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Mark `id` as submitting; `None` when it already is
	pub fn try_acquire(&self, id: Uuid) -> Option<InFlightGuard> {
		if !self.ids.lock().insert(id) {
			return None;
		}
		Some(InFlightGuard {
			ids: Arc::clone(&self.ids),
			id,
		})
	}

	pub fn state(&self, id: Uuid) -> SubmissionState {
		if self.ids.lock().contains(&id) {
			SubmissionState::Submitting
		} else {
			SubmissionState::Idle
		}
	}

	pub fn len(&self) -> usize {
		self.ids.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.ids.lock().is_empty()
	}
}

/// Clears the in-flight mark when dropped
#[derive(Debug)]
pub struct InFlightGuard {
	ids: Arc<Mutex<HashSet<Uuid>>>,
	id: Uuid,
}

impl InFlightGuard {
	pub fn id(&self) -> Uuid {
		self.id
	}
}

impl Drop for InFlightGuard {
	fn drop(&mut self) {
		self.ids.lock().remove(&self.id);
	}
}

/// Validates a bound form and runs one remote action for it
#[derive(Debug, Clone)]
pub struct SubmissionPipeline {
	registry: InFlightRegistry,
	timeout: Duration,
}

impl SubmissionPipeline {
	pub fn new(timeout: Duration) -> Self {
		Self {
			registry: InFlightRegistry::new(),
			timeout,
		}
	}

	pub fn registry(&self) -> &InFlightRegistry {
		&self.registry
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Submit `form` once
	///
	/// `action` runs only when the form is valid and no other submission of
	/// `form_id` is in flight. It gets a single attempt, cut off after the
	/// configured timeout. Entered values stay on the form whatever the
	/// outcome.
	pub async fn submit<T, F, Fut>(
		&self,
		form: &mut Form,
		form_id: Uuid,
		action: F,
	) -> Result<T, SubmissionError>
	where
		F: FnOnce(SubmissionPayload) -> Fut,
		Fut: Future<Output = Result<T, SubmissionError>>,
	{
		let Some(_guard) = self.registry.try_acquire(form_id) else {
			tracing::warn!(form = form.name(), %form_id, "duplicate submission rejected");
			return Err(SubmissionError::InProgress(form_id));
		};

		let timeout = self.timeout;
		let result = form
			.submit(|payload| async move {
				match tokio::time::timeout(timeout, action(payload)).await {
					Ok(result) => result,
					Err(_) => Err(SubmissionError::Timeout(timeout)),
				}
			})
			.await;

		let outcome = match result {
			Ok(value) => Ok(value),
			Err(SubmitError::Invalid(count)) => Err(SubmissionError::Invalid(count)),
			Err(SubmitError::InProgress) => Err(SubmissionError::InProgress(form_id)),
			Err(SubmitError::Failed(error)) => Err(error),
		};
		let state = SubmissionState::of(&outcome);
		match &outcome {
			Err(error) if state == SubmissionState::Failed => {
				tracing::error!(form = form.name(), %form_id, ?state, error = %error, "submission settled");
			}
			Err(error) => {
				tracing::debug!(form = form.name(), %form_id, ?state, error = %error, "submission rejected");
			}
			Ok(_) => tracing::debug!(form = form.name(), %form_id, ?state, "submission settled"),
		}
		outcome
	}
}

/// Form instance id posted with the page, or a fresh one
pub fn form_id_from(value: Option<&str>) -> Uuid {
	value
		.and_then(|raw| Uuid::parse_str(raw.trim()).ok())
		.unwrap_or_else(Uuid::new_v4)
}

#[cfg(test)]
mod tests {
	use super::*;
	use careusnow_forms::schemas::user_form;
	use rstest::rstest;
	use std::sync::atomic::{AtomicUsize, Ordering};

	fn valid_user_form() -> Form {
		let mut form = user_form().unwrap();
		form.bind([("name", "A"), ("email", "a@b.com"), ("phone", "+8801234567890")]);
		form
	}

	#[rstest]
	fn test_guard_clears_mark_on_drop() {
		// Arrange
		let registry = InFlightRegistry::new();
		let id = Uuid::new_v4();

		// Act
		let guard = registry.try_acquire(id).unwrap();
		let second = registry.try_acquire(id);
		let during = registry.state(id);
		drop(guard);

		// Assert
		assert!(second.is_none());
		assert_eq!(during, SubmissionState::Submitting);
		assert_eq!(registry.state(id), SubmissionState::Idle);
		assert!(registry.is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_invalid_form_never_runs_action() {
		// Arrange
		let pipeline = SubmissionPipeline::new(Duration::from_secs(5));
		let mut form = user_form().unwrap();
		form.bind([("name", ""), ("email", "bad"), ("phone", "123")]);
		let calls = AtomicUsize::new(0);

		// Act
		let result = pipeline
			.submit(&mut form, Uuid::new_v4(), |_| async {
				calls.fetch_add(1, Ordering::SeqCst);
				Ok(())
			})
			.await;

		// Assert
		assert_eq!(SubmissionState::of(&result), SubmissionState::Idle);
		assert!(matches!(result, Err(SubmissionError::Invalid(3))));
		assert_eq!(calls.load(Ordering::SeqCst), 0);
		assert!(pipeline.registry().is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_duplicate_submission_is_rejected() {
		// Arrange
		let pipeline = SubmissionPipeline::new(Duration::from_secs(5));
		let id = Uuid::new_v4();
		let _held = pipeline.registry().try_acquire(id).unwrap();
		let mut form = valid_user_form();
		let calls = AtomicUsize::new(0);

		// Act
		let result = pipeline
			.submit(&mut form, id, |_| async {
				calls.fetch_add(1, Ordering::SeqCst);
				Ok(())
			})
			.await;

		// Assert
		assert!(matches!(result, Err(SubmissionError::InProgress(rejected)) if rejected == id));
		assert_eq!(calls.load(Ordering::SeqCst), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_hung_call_times_out_and_resets() {
		// Arrange
		let pipeline = SubmissionPipeline::new(Duration::from_millis(50));
		let id = Uuid::new_v4();
		let mut form = valid_user_form();

		// Act
		let result: Result<(), _> = pipeline
			.submit(&mut form, id, |_| std::future::pending())
			.await;

		// Assert
		let error = result.unwrap_err();
		assert!(matches!(error, SubmissionError::Timeout(d) if d == Duration::from_millis(50)));
		assert_eq!(error.state(), SubmissionState::Failed);
		assert_eq!(pipeline.registry().state(id), SubmissionState::Idle);
		assert!(!form.is_loading());
		assert_eq!(form.value("name").and_then(|v| v.as_text()), Some("A"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_success_returns_action_value() {
		// Arrange
		let pipeline = SubmissionPipeline::new(Duration::from_secs(5));
		let mut form = valid_user_form();

		// Act
		let result = pipeline
			.submit(&mut form, Uuid::new_v4(), |payload| async move {
				Ok(payload.text("email").unwrap_or_default().to_string())
			})
			.await;

		// Assert
		assert_eq!(SubmissionState::of(&result), SubmissionState::Succeeded);
		assert_eq!(result.unwrap(), "a@b.com");
	}

	#[rstest]
	#[case(Some("6f1c1f8e-4e51-4f0a-9a59-3c1b8d7c2a10"), true)]
	#[case(Some("not-a-uuid"), false)]
	#[case(None, false)]
	fn test_form_id_from(#[case] raw: Option<&str>, #[case] keeps: bool) {
		let id = form_id_from(raw);

		assert_eq!(raw.map(|r| r == id.to_string()).unwrap_or(false), keeps);
	}
}
