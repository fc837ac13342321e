//! HTTP plumbing for the CareUsNow server
//!
//! - [`Request`] and [`Response`] with the body held in memory
//! - form body decoding for urlencoded and multipart submissions
//! - a [`Router`] over `{param}` path patterns
//! - an HTTP/1.1 [`HttpServer`] with graceful shutdown

pub mod error;
pub mod handler;
pub mod request;
pub mod response;
pub mod router;
pub mod server;

pub use error::{HttpError, HttpResult};
pub use handler::Handler;
pub use request::{FormData, Request};
pub use response::Response;
pub use router::{PathPattern, Router};
pub use server::{DEFAULT_MAX_BODY_SIZE, HttpServer, ShutdownCoordinator, ctrl_c_signal};

pub use hyper::{Method, StatusCode};
