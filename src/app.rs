use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, field, info, info_span, warn, Span};

use crate::config::AppConfig;
use crate::error::{METHOD_NOT_ALLOWED, ROUTE_NOT_FOUND};
use crate::state::AppState;
use crate::{courses, users};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/health", get(|| async { "ok" }))
        .merge(users::router())
        .merge(courses::router())
        // applies to the routes registered above, so it must follow them
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(route_not_found)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(record_response),
        )
}

fn request_span(req: &Request<Body>) -> Span {
    info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        status = field::Empty,
        latency_ms = field::Empty,
    )
}

fn record_response(res: &Response<Body>, latency: Duration, span: &Span) {
    let status = res.status();
    span.record("status", status.as_u16());
    span.record("latency_ms", latency.as_millis() as u64);
    if status.is_server_error() {
        error!(%status, "request failed");
    } else if status.is_client_error() {
        warn!(%status, "request rejected");
    } else {
        info!(%status, "request finished");
    }
}

async fn welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome to the course catalog REST API!" }))
}

async fn route_not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": ROUTE_NOT_FOUND })))
}

async fn method_not_allowed() -> (StatusCode, Json<Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": METHOD_NOT_ALLOWED })),
    )
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestApp;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn root_and_health_respond() {
        let app = TestApp::new();
        let res = app.request(Method::GET, "/", None, None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert!(res.body["message"].is_string());

        let res = app.request(Method::GET, "/health", None, None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body, json!("ok"));
    }

    #[tokio::test]
    async fn unknown_routes_are_json_404() {
        let app = TestApp::new();
        let res = app.request(Method::GET, "/nope", None, None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.body, json!({ "error": "Route Not Found" }));
    }

    #[tokio::test]
    async fn unsupported_methods_are_json_405() {
        let app = TestApp::new();
        for (method, uri) in [
            (Method::PATCH, "/courses/1"),
            (Method::DELETE, "/courses"),
            (Method::PUT, "/users"),
        ] {
            let res = app.request(method.clone(), uri, None, None).await;
            assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
            assert_eq!(res.body, json!({ "error": "Method Not Allowed" }));
        }
    }

    #[tokio::test]
    async fn responses_carry_cors_headers() {
        let app = TestApp::new();
        let res = app.request(Method::GET, "/courses", None, None).await;
        assert!(res
            .headers
            .contains_key(axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
