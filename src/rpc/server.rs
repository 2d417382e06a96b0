use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::rpc::auth::ReceiverAuth;
use crate::rpc::handlers::Dispatcher;

struct ServerState {
    auth: ReceiverAuth,
    dispatcher: Dispatcher,
}

/// RpcServer ties the verifying receiver to an HTTP listener.
pub struct RpcServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
}

impl RpcServer {
    pub fn new(addr: SocketAddr, auth: ReceiverAuth, dispatcher: Dispatcher) -> Self {
        Self { addr, state: Arc::new(ServerState { auth, dispatcher }) }
    }

    /// `POST /` takes signed calls, `GET /health` answers "ok".
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", post(signed_endpoint))
            .route("/health", get(|| async { "ok" }))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind and serve in a background task; returns the bound address.
    pub async fn spawn(self) -> anyhow::Result<(SocketAddr, JoinHandle<anyhow::Result<()>>)> {
        let listener = TcpListener::bind(self.addr).await?;
        let local = listener.local_addr()?;
        let app = self.router();
        info!("Starting RPC receiver on {}", local);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await?;
            Ok::<(), anyhow::Error>(())
        });
        Ok((local, handle))
    }

    /// Serve until `shutdown` resolves.
    pub async fn start(self, shutdown: impl Future<Output = ()> + Send + 'static) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        info!("Starting RPC receiver on {}", listener.local_addr()?);
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

async fn signed_endpoint(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let call = match state.auth.verify_request(&headers, &body) {
        Ok(call) => call,
        Err(rejection) => return rejection.into_response(),
    };
    debug!(method = %call.method, "dispatching verified call");
    let (status, value) = state.dispatcher.dispatch(&call).await;
    (status, Json(value)).into_response()
}
