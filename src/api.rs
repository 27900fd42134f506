//! HTTP surface for the bridge
//!
//! One control endpoint plus the static page that drives it. Request
//! validation happens here at the boundary: a malformed or missing `state`
//! is rejected by the Json extractor with a 4xx and never reaches the
//! gateway. Transport failures become 5xx responses.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::error;

use crate::command::{Acknowledgement, CommandGateway, DeviceCommand};
use crate::serial::TransportError;

pub fn router(gateway: CommandGateway) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/led", post(set_led))
        .with_state(gateway)
}

async fn set_led(
    State(gateway): State<CommandGateway>,
    Json(cmd): Json<DeviceCommand>,
) -> Result<Json<Acknowledgement>, ApiError> {
    let ack = gateway.apply(cmd).await?;
    Ok(Json(ack))
}

struct ApiError(TransportError);

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("LED command failed: {}", self.0);

        let status = match self.0 {
            TransportError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            TransportError::Disconnected => StatusCode::BAD_GATEWAY,
        };

        (
            status,
            Json(json!({ "status": "error", "message": self.0.to_string() })),
        )
            .into_response()
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Remote Rig - LED Control</title>
</head>
<body>
  <h1>Remote Rig - LED Control</h1>

  <button onclick="setLed(1)">LED ON</button>
  <button onclick="setLed(0)">LED OFF</button>

  <script>
    async function setLed(state) {
      await fetch('/api/led', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ state })
      });
    }
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::SerialChannel;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tokio::io::AsyncReadExt;
    use tower::ServiceExt;

    const TEST_TIMEOUT: Duration = Duration::from_millis(100);

    fn test_router(buffer: usize) -> (Router, tokio::io::DuplexStream) {
        let (local, remote) = tokio::io::duplex(buffer);
        let channel = SerialChannel::start(local, TEST_TIMEOUT);
        (router(CommandGateway::new(channel)), remote)
    }

    fn post_led(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/led")
            .header("content-type", "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn post_led_on_returns_ok_and_writes_line() {
        let (app, mut remote) = test_router(64);

        let response = app.oneshot(post_led(r#"{"state": 1}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let ack: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(ack["status"], "ok");
        assert_eq!(ack["sent"], "LED 1");

        let mut buf = [0u8; 6];
        remote.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"LED 1\n");
    }

    #[tokio::test]
    async fn missing_state_is_a_client_error() {
        let (app, _remote) = test_router(64);

        let response = app.oneshot(post_led(r#"{}"#)).await.unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn non_integer_state_is_a_client_error() {
        let (app, _remote) = test_router(64);

        let response = app
            .oneshot(post_led(r#"{"state": "on"}"#))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn transport_timeout_maps_to_gateway_timeout() {
        let (app, _remote) = test_router(4);

        let response = app.oneshot(post_led(r#"{"state": 0}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn index_serves_the_control_page() {
        let (app, _remote) = test_router(64);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let page = std::str::from_utf8(&body).unwrap();
        assert!(page.contains("/api/led"));
    }
}
