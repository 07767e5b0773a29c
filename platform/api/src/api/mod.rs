use std::sync::Arc;

use common::http::error_body;
use common::http::RouteError;
use common::make_response;
use hyper::server::conn::Http;
use hyper::{Body, Request, Response, StatusCode};
use routerify::{RequestServiceBuilder, Router};
use tokio::net::TcpSocket;
use tokio::select;

use self::error::ApiError;
use crate::config::ApiConfig;
use crate::global::ApiGlobal;

pub mod error;
mod middleware;
pub mod request;
pub mod response;
pub mod v1;

pub fn routes<G: ApiGlobal>(global: &Arc<G>) -> Router<Body, RouteError<ApiError>> {
	let weak = Arc::downgrade(global);
	Router::builder()
		.data(weak)
		.err_handler_with_info(common::http::error_handler::<ApiError>)
		// Adds the CORS headers to every response, errors included
		.middleware(middleware::cors::cors_middleware(global))
		.options("/*", preflight)
		.scope("/v1", v1::routes(global))
		.any(not_found)
		.build()
		.expect("failed to build router")
}

async fn preflight(_: Request<Body>) -> error::Result<Response<Body>> {
	Ok(Response::builder()
		.status(StatusCode::NO_CONTENT)
		.body(Body::empty())
		.expect("failed to build response"))
}

async fn not_found(_: Request<Body>) -> error::Result<Response<Body>> {
	Ok(make_response!(StatusCode::NOT_FOUND, error_body("route not found")))
}

pub async fn run<G: ApiGlobal>(global: Arc<G>) -> anyhow::Result<()> {
	let config = global.config::<ApiConfig>();

	tracing::info!("Listening on {}", config.bind_address);
	let socket = if config.bind_address.is_ipv6() {
		TcpSocket::new_v6()?
	} else {
		TcpSocket::new_v4()?
	};

	socket.set_reuseaddr(true)?;
	socket.set_reuseport(true)?;
	socket.bind(config.bind_address)?;
	let listener = socket.listen(1024)?;

	// The router only holds a Weak reference to the global state so open
	// keep-alive connections do not keep it alive past shutdown.
	let request_service = RequestServiceBuilder::new(routes(&global))
		.map_err(|err| anyhow::anyhow!("failed to build request service: {err}"))?;

	loop {
		select! {
			_ = global.ctx().done() => {
				return Ok(());
			},
			r = listener.accept() => {
				let (socket, addr) = r?;

				let service = request_service.build(addr);

				tracing::debug!("Accepted connection from {}", addr);

				tokio::spawn(async move {
					Http::new().serve_connection(socket, service).await.ok();
				});
			},
		}
	}
}
