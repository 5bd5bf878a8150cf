//! HTTP server for the Birdie order service.
//!
//! This module provides the minimal HTTP surface: the staff-facing order
//! list and the status-update endpoint that drives the notification
//! workflow.

use axum::{
	extract::{Form, State},
	http::{header, StatusCode},
	response::{Html, IntoResponse, Response},
	routing::{get, post},
	Router,
};
use birdie_config::ApiConfig;
use birdie_core::{Engine, EngineError};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::views;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the engine for processing requests.
	pub engine: Arc<Engine>,
}

/// Starts the HTTP server.
///
/// Binds to the configured address and serves until ctrl-c.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<Engine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(engine);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Order service listening on {}", bind_address);

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	Ok(())
}

/// Builds the router with both routes and middleware.
fn router(engine: Arc<Engine>) -> Router {
	Router::new()
		.route("/", get(handle_list_orders))
		.route("/updateOrder", post(handle_update_order))
		.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
		.with_state(AppState { engine })
}

/// Resolves when ctrl-c is received.
async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %e, "Failed to listen for shutdown signal");
	}
}

/// Form fields of the status-update request.
#[derive(Debug, Deserialize)]
struct UpdateOrderForm {
	id: i64,
	status: String,
}

/// Handles GET / requests.
///
/// Renders the order list view.
async fn handle_list_orders(State(state): State<AppState>) -> Response {
	match state.engine.list_orders().await {
		Ok(orders) => Html(views::render_order_list(&orders)).into_response(),
		Err(e) => {
			tracing::error!(error = %e, "Failed to list orders");
			(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
		},
	}
}

/// Handles POST /updateOrder requests.
///
/// Runs the status-update workflow and redirects back to the listing on
/// success. Failures map to the two plain-text bodies; the underlying
/// cause stays in the server log.
async fn handle_update_order(
	State(state): State<AppState>,
	Form(form): Form<UpdateOrderForm>,
) -> Response {
	match state
		.engine
		.update_order_status(form.id, &form.status)
		.await
	{
		Ok(_) => {
			// 301 back to the listing view
			(StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, "/")]).into_response()
		},
		Err(EngineError::OrderNotFound) => {
			(StatusCode::BAD_REQUEST, "Invalid input!").into_response()
		},
		Err(EngineError::Notify(e)) => {
			// The status update is already committed at this point
			tracing::warn!(error = %e, "Status update committed but notification failed");
			(
				StatusCode::BAD_GATEWAY,
				"Error occurred while sending message!",
			)
				.into_response()
		},
		Err(e) => {
			tracing::error!(error = %e, "Status update failed");
			(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use axum::body::Body;
	use axum::http::Request;
	use birdie_notify::{NotifyError, NotifyInterface, NotifyService};
	use birdie_store::implementations::memory::create_store;
	use birdie_store::StoreService;
	use birdie_types::{ConfigSchema, NewOrder, Schema, SmsMessage, ValidationError};
	use tower::ServiceExt;

	/// Provider fake that fails every send with a fixed detail.
	struct FailingNotifier;

	struct FailingNotifierSchema;

	impl ConfigSchema for FailingNotifierSchema {
		fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
			Schema::new(vec![], vec![]).validate(config)
		}
	}

	#[async_trait]
	impl NotifyInterface for FailingNotifier {
		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			Box::new(FailingNotifierSchema)
		}

		async fn send(&self, _message: &SmsMessage) -> Result<(), NotifyError> {
			Err(NotifyError::Provider("gateway unavailable".to_string()))
		}
	}

	fn test_config() -> birdie_config::Config {
		r#"
[service]
id = "test"

[storage]
primary = "memory"
[storage.implementations.memory]

[notifier]
primary = "log"
originator = "BirdieNomNo"
[notifier.implementations.log]

[api]
"#
		.parse()
		.unwrap()
	}

	/// Builds a router over a memory store with one seeded order.
	async fn test_router(failing_notifier: bool) -> Router {
		let empty: toml::Value = toml::Value::Table(toml::Table::new());
		let store = Arc::new(StoreService::new(create_store(&empty).unwrap()));
		store
			.insert_order(NewOrder {
				name: "Hannah Hungry".to_string(),
				phone: "+319876543210".to_string(),
				items: "1 x Hipster Burger + Fries".to_string(),
				status: "pending".to_string(),
			})
			.await
			.unwrap();

		let provider: Box<dyn NotifyInterface> = if failing_notifier {
			Box::new(FailingNotifier)
		} else {
			birdie_notify::implementations::log::create_notifier(&empty).unwrap()
		};
		let notifier = Arc::new(NotifyService::new(provider, "BirdieNomNo".to_string()));

		router(Arc::new(Engine::new(test_config(), store, notifier)))
	}

	async fn body_string(response: Response) -> String {
		let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap();
		String::from_utf8(bytes.to_vec()).unwrap()
	}

	fn update_request(id: &str, status: &str) -> Request<Body> {
		Request::builder()
			.method("POST")
			.uri("/updateOrder")
			.header(
				header::CONTENT_TYPE,
				"application/x-www-form-urlencoded",
			)
			.body(Body::from(format!("id={}&status={}", id, status)))
			.unwrap()
	}

	#[tokio::test]
	async fn test_list_orders_page() {
		let app = test_router(false).await;

		let response = app
			.oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::OK);
		let body = body_string(response).await;
		assert!(body.contains("Hannah Hungry"));
		assert!(body.contains("pending"));
	}

	#[tokio::test]
	async fn test_update_redirects_to_listing() {
		let app = test_router(false).await;

		let response = app.oneshot(update_request("1", "confirmed")).await.unwrap();

		assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
		assert_eq!(response.headers()[header::LOCATION], "/");
	}

	#[tokio::test]
	async fn test_unknown_order_is_invalid_input() {
		let app = test_router(false).await;

		let response = app.oneshot(update_request("999", "confirmed")).await.unwrap();

		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
		assert_eq!(body_string(response).await, "Invalid input!");
	}

	#[tokio::test]
	async fn test_provider_failure_returns_send_error_body() {
		let app = test_router(true).await;

		let response = app.oneshot(update_request("1", "delivered")).await.unwrap();

		assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
		assert_eq!(
			body_string(response).await,
			"Error occurred while sending message!"
		);
	}
}
