use crate::error::HttpResult;
use crate::request::Request;
use crate::response::Response;
use async_trait::async_trait;
use std::sync::Arc;

/// Anything that can answer a request
#[async_trait]
pub trait Handler: Send + Sync {
	async fn handle(&self, request: Request) -> HttpResult<Response>;
}

#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, request: Request) -> HttpResult<Response> {
		(**self).handle(request).await
	}
}
