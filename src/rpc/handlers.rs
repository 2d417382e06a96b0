use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use http::StatusCode;
use serde_json::{json, Value};

use crate::rpc::auth::VerifiedCall;

/// Application-level failure: answered with `status` and a JSON `body`.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodError {
    pub status: StatusCode,
    pub body: Value,
}

impl MethodError {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, json!({"error": "method_not_found", "method": method}))
    }
}

/// Trait describing a method implementation behind the receiver.
#[async_trait]
pub trait MethodHandler: Send + Sync + 'static {
    async fn handle(&self, call: &VerifiedCall) -> Result<Value, MethodError>;
}

/// Answers with the verified claims, `_method` included.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoHandler;

#[async_trait]
impl MethodHandler for EchoHandler {
    async fn handle(&self, call: &VerifiedCall) -> Result<Value, MethodError> {
        Ok(Value::Object(call.claims.clone()))
    }
}

/// Wraps a plain closure as a handler
pub struct FnHandler<F>(F);

impl<F> FnHandler<F>
where
    F: Fn(&VerifiedCall) -> Result<Value, MethodError> + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> MethodHandler for FnHandler<F>
where
    F: Fn(&VerifiedCall) -> Result<Value, MethodError> + Send + Sync + 'static,
{
    async fn handle(&self, call: &VerifiedCall) -> Result<Value, MethodError> {
        (self.0)(call)
    }
}

/// Routes verified calls to handlers by method name.
#[derive(Default, Clone)]
pub struct Dispatcher {
    routes: HashMap<String, Arc<dyn MethodHandler>>,
    fallback: Option<Arc<dyn MethodHandler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, method: impl Into<String>, handler: impl MethodHandler) -> Self {
        self.routes.insert(method.into(), Arc::new(handler));
        self
    }

    /// Handler for methods without a route.
    pub fn fallback(mut self, handler: impl MethodHandler) -> Self {
        self.fallback = Some(Arc::new(handler));
        self
    }

    pub async fn dispatch(&self, call: &VerifiedCall) -> (StatusCode, Value) {
        let handler = self.routes.get(&call.method).or(self.fallback.as_ref());
        let result = match handler {
            Some(handler) => handler.handle(call).await,
            None => Err(MethodError::method_not_found(&call.method)),
        };
        match result {
            Ok(value) => (StatusCode::OK, value),
            Err(e) => (e.status, e.body),
        }
    }
}
