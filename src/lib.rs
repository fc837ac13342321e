//! # CareUsNow
//!
//! Server-rendered patient intake: a landing page that creates a user, a
//! registration form that records the patient, and an appointment request
//! form. Submissions are validated on the server and forwarded to a remote
//! document service.
//!
//! ## Crates
//!
//! - `careusnow-forms`: field descriptors, validation, rendering, schemas
//! - `careusnow-client`: the [`PatientService`](careusnow_client::PatientService)
//!   seam and its Appwrite implementation
//! - `careusnow-http`: request/response types, router and server
//! - `careusnow-conf`: layered settings
//!
//! ## Running
//!
//! ```bash
//! CAREUSNOW_APPWRITE__PROJECT_ID=... CAREUSNOW_APPWRITE__API_KEY=... careusnow serve
//! ```

pub mod app;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod templates;
pub mod views;

pub use app::{AppState, build_router, serve};
pub use error::{AppError, AppResult};
pub use pipeline::{InFlightRegistry, SubmissionError, SubmissionPipeline, SubmissionState};
pub use templates::Templates;
