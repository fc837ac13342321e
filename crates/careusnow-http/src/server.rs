use crate::error::{HttpError, HttpResult};
use crate::handler::Handler;
use crate::request::Request;
use crate::response::Response;
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

/// Default maximum request body size (10 MiB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Broadcasts a shutdown request to a running server
///
/// Cloning yields another handle to the same signal.
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
	sender: broadcast::Sender<()>,
	grace_period: Duration,
}

impl ShutdownCoordinator {
	pub fn new(grace_period: Duration) -> Self {
		let (sender, _) = broadcast::channel(1);
		Self {
			sender,
			grace_period,
		}
	}

	pub fn subscribe(&self) -> broadcast::Receiver<()> {
		self.sender.subscribe()
	}

	pub fn shutdown(&self) {
		// No receivers means the server already stopped
		let _ = self.sender.send(());
	}

	/// How long open connections may keep running after shutdown starts
	pub fn grace_period(&self) -> Duration {
		self.grace_period
	}
}

/// HTTP/1.1 server
pub struct HttpServer {
	handler: Arc<dyn Handler>,
	max_body_size: usize,
}

impl HttpServer {
	pub fn new<H: Handler + 'static>(handler: H) -> Self {
		Self {
			handler: Arc::new(handler),
			max_body_size: DEFAULT_MAX_BODY_SIZE,
		}
	}

	pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
		self.max_body_size = max_body_size;
		self
	}

	/// Bind `addr` and serve until `coordinator` signals shutdown
	pub async fn listen_with_shutdown(
		self,
		addr: SocketAddr,
		coordinator: ShutdownCoordinator,
	) -> HttpResult<()> {
		let listener = TcpListener::bind(addr).await?;
		self.serve(listener, coordinator).await
	}

	/// Serve connections from an already bound listener
	///
	/// After shutdown is signalled no new connections are accepted; open
	/// connections finish their current request or are dropped once the
	/// grace period runs out.
	pub async fn serve(self, listener: TcpListener, coordinator: ShutdownCoordinator) -> HttpResult<()> {
		let local_addr = listener.local_addr()?;
		tracing::info!(address = %local_addr, "server listening");

		let graceful = GracefulShutdown::new();
		let mut shutdown_rx = coordinator.subscribe();

		loop {
			tokio::select! {
				result = listener.accept() => {
					let (stream, remote_addr) = match result {
						Ok(accepted) => accepted,
						Err(e) => {
							tracing::warn!(error = %e, "failed to accept connection");
							continue;
						}
					};
					let service = RequestService {
						handler: self.handler.clone(),
						remote_addr,
						max_body_size: self.max_body_size,
					};
					let connection = http1::Builder::new()
						.serve_connection(TokioIo::new(stream), service);
					let connection = graceful.watch(connection);

					tokio::spawn(async move {
						if let Err(e) = connection.await {
							tracing::debug!(remote_addr = %remote_addr, error = %e, "connection closed with error");
						}
					});
				}
				_ = shutdown_rx.recv() => {
					tracing::info!("shutdown signal received, no longer accepting connections");
					break;
				}
			}
		}

		drop(listener);
		tokio::select! {
			_ = graceful.shutdown() => {
				tracing::info!("all connections closed");
			}
			_ = tokio::time::sleep(coordinator.grace_period()) => {
				tracing::warn!(
					grace_period_secs = coordinator.grace_period().as_secs(),
					"grace period elapsed with connections still open"
				);
			}
		}
		Ok(())
	}
}

struct RequestService {
	handler: Arc<dyn Handler>,
	remote_addr: SocketAddr,
	max_body_size: usize,
}

impl RequestService {
	async fn respond(
		handler: Arc<dyn Handler>,
		req: hyper::Request<Incoming>,
		remote_addr: SocketAddr,
		max_body_size: usize,
	) -> Response {
		if let Some(content_length) = req.headers().get(hyper::header::CONTENT_LENGTH)
			&& let Ok(len_str) = content_length.to_str()
			&& let Ok(len) = len_str.parse::<usize>()
			&& len > max_body_size
		{
			return error_response(&HttpError::PayloadTooLarge {
				size: Some(len),
				max: max_body_size,
			});
		}

		let (parts, body) = req.into_parts();
		let body = match Limited::new(body, max_body_size).collect().await {
			Ok(collected) => collected.to_bytes(),
			Err(e) if e.is::<LengthLimitError>() => {
				tracing::warn!(remote_addr = %remote_addr, max = max_body_size, "streamed body over the limit");
				return error_response(&HttpError::PayloadTooLarge {
					size: None,
					max: max_body_size,
				});
			}
			Err(e) => {
				tracing::warn!(remote_addr = %remote_addr, error = %e, "failed to read request body");
				return error_response(&HttpError::BadRequest("Unreadable request body".to_string()));
			}
		};

		let mut request = Request::new(parts.method, parts.uri, parts.version, parts.headers, body);
		request.remote_addr = Some(remote_addr);

		match handler.handle(request).await {
			Ok(response) => response,
			Err(e) => {
				let status = e.status_code();
				if status.is_server_error() {
					tracing::error!(error = %e, "request handler failed");
				} else {
					tracing::warn!(error = %e, "request rejected");
				}
				error_response(&e)
			}
		}
	}
}

fn error_response(error: &HttpError) -> Response {
	let status = error.status_code();
	let reason = status.canonical_reason().unwrap_or("Error");
	Response::text(reason).with_status(status)
}

impl Service<hyper::Request<Incoming>> for RequestService {
	type Response = hyper::Response<Full<Bytes>>;
	type Error = hyper::http::Error;
	type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let handler = self.handler.clone();
		let remote_addr = self.remote_addr;
		let max_body_size = self.max_body_size;

		Box::pin(async move {
			let started = Instant::now();
			let method = req.method().clone();
			let path = req.uri().path().to_string();

			let response = Self::respond(handler, req, remote_addr, max_body_size).await;

			tracing::info!(
				method = %method,
				path = %path,
				status = response.status.as_u16(),
				latency_ms = started.elapsed().as_millis() as u64,
				"request"
			);

			let mut builder = hyper::Response::builder().status(response.status);
			for (key, value) in response.headers.iter() {
				builder = builder.header(key, value);
			}
			builder.body(Full::new(response.body))
		})
	}
}

/// Resolves when the process receives Ctrl-C
pub async fn ctrl_c_signal(coordinator: ShutdownCoordinator) {
	match tokio::signal::ctrl_c().await {
		Ok(()) => coordinator.shutdown(),
		Err(e) => tracing::error!(error = %e, "failed to listen for Ctrl-C"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use rstest::rstest;
	use tokio::io::{AsyncReadExt, AsyncWriteExt};
	use tokio::net::TcpStream;

	struct Health;

	#[async_trait]
	impl Handler for Health {
		async fn handle(&self, request: Request) -> HttpResult<Response> {
			match request.path() {
				"/healthz" => Ok(Response::text("ok")),
				"/fail" => Err(HttpError::Internal("boom".to_string())),
				_ => Ok(Response::not_found()),
			}
		}
	}

	async fn start(max_body_size: usize) -> (SocketAddr, ShutdownCoordinator, tokio::task::JoinHandle<HttpResult<()>>) {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let coordinator = ShutdownCoordinator::new(Duration::from_secs(1));
		let server = HttpServer::new(Health).with_max_body_size(max_body_size);
		let task = tokio::spawn(server.serve(listener, coordinator.clone()));
		(addr, coordinator, task)
	}

	async fn raw_request(addr: SocketAddr, request: &str) -> String {
		let mut stream = TcpStream::connect(addr).await.unwrap();
		stream.write_all(request.as_bytes()).await.unwrap();
		let mut response = String::new();
		stream.read_to_string(&mut response).await.unwrap();
		response
	}

	#[rstest]
	#[tokio::test]
	async fn test_serves_request_and_shuts_down() {
		// Arrange
		let (addr, coordinator, task) = start(DEFAULT_MAX_BODY_SIZE).await;

		// Act
		let response = raw_request(
			addr,
			"GET /healthz HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
		)
		.await;
		coordinator.shutdown();

		// Assert
		assert!(response.starts_with("HTTP/1.1 200 OK"));
		assert!(response.ends_with("ok"));
		assert!(task.await.unwrap().is_ok());
	}

	#[rstest]
	#[tokio::test]
	async fn test_oversized_body_is_rejected() {
		// Arrange
		let (addr, coordinator, _task) = start(4).await;

		// Act
		let response = raw_request(
			addr,
			"POST /healthz HTTP/1.1\r\nHost: localhost\r\nContent-Length: 10\r\nConnection: close\r\n\r\n0123456789",
		)
		.await;
		coordinator.shutdown();

		// Assert
		assert!(response.starts_with("HTTP/1.1 413"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_oversized_chunked_body_is_rejected() {
		// Arrange
		let (addr, coordinator, _task) = start(4).await;

		// Act
		let response = raw_request(
			addr,
			"POST /healthz HTTP/1.1\r\nHost: localhost\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\na\r\n0123456789\r\n0\r\n\r\n",
		)
		.await;
		coordinator.shutdown();

		// Assert
		assert!(response.starts_with("HTTP/1.1 413"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_handler_error_becomes_status_page() {
		let (addr, coordinator, _task) = start(DEFAULT_MAX_BODY_SIZE).await;

		let response = raw_request(
			addr,
			"GET /fail HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
		)
		.await;
		coordinator.shutdown();

		assert!(response.starts_with("HTTP/1.1 500"));
		assert!(response.ends_with("Internal Server Error"));
	}
}
