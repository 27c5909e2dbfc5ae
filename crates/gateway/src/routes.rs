//! Proxy routes forwarding the dashboard's same-origin calls to the backend

use crate::server::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error};

type AppStateArc = Arc<AppState>;

pub fn proxy_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/business-data", get(business_data))
        .route("/api/login", post(login))
}

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<AppStateArc>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "upstream": state.upstream.as_str(),
    }))
}

// ============================================================================
// Business data
// ============================================================================

async fn business_data(State(state): State<AppStateArc>, headers: HeaderMap) -> Response {
    match fetch_business_data(&state, &headers).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "Error fetching business data");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response()
        }
    }
}

async fn fetch_business_data(state: &AppState, headers: &HeaderMap) -> anyhow::Result<Response> {
    let url = state.upstream_url("/api/business-data")?;
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    let upstream = state
        .http
        .get(url)
        .header(reqwest::header::COOKIE, cookie)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .send()
        .await?;

    if !upstream.status().is_success() {
        debug!(status = %upstream.status(), "Upstream rejected business data request");
        return Ok((
            status_code(upstream.status().as_u16()),
            Json(json!({ "error": "Failed to fetch business data" })),
        )
            .into_response());
    }

    let data: Value = upstream.json().await?;
    Ok(Json(data).into_response())
}

// ============================================================================
// Login
// ============================================================================

async fn login(State(state): State<AppStateArc>, body: Bytes) -> Response {
    match forward_login(&state, &body).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "Error during login");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": "Internal server error" })),
            )
                .into_response()
        }
    }
}

async fn forward_login(state: &AppState, body: &[u8]) -> anyhow::Result<Response> {
    let credentials: Value = serde_json::from_slice(body)?;
    let url = state.upstream_url("/user_login")?;

    let upstream = state.http.post(url).json(&credentials).send().await?;

    // reqwest and axum sit on different `http` versions, so copy raw bytes
    let cookies = upstream
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|value| HeaderValue::from_bytes(value.as_bytes()).ok())
        .collect::<Vec<_>>();

    let data: Value = upstream.json().await?;

    if data.get("success").and_then(Value::as_bool) != Some(true) {
        return Ok((StatusCode::UNAUTHORIZED, Json(data)).into_response());
    }

    let mut response = Json(data).into_response();
    for cookie in cookies {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    Ok(response)
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
}

#[cfg(test)]
mod tests {
    use crate::server::{router, AppState};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use mockito::Server;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use url::Url;

    fn app(upstream: &str) -> Router {
        router(Arc::new(AppState::with_upstream(Url::parse(upstream).unwrap())))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_business_data_forwards_cookie() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/business-data")
            .match_header("cookie", "session=abc123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"revenue":125000}"#)
            .create_async()
            .await;

        let request = Request::builder()
            .uri("/api/business-data")
            .header(header::COOKIE, "session=abc123")
            .body(Body::empty())
            .unwrap();
        let response = app(&server.url()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["revenue"], 125000);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_business_data_behind_upstream_prefix() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/backend/api/business-data")
            .with_status(200)
            .with_body(r#"{"revenue":1}"#)
            .create_async()
            .await;

        let request = Request::builder()
            .uri("/api/business-data")
            .body(Body::empty())
            .unwrap();
        let upstream = format!("{}/backend", server.url());
        let response = app(&upstream).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_business_data_keeps_upstream_status() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/business-data")
            .with_status(403)
            .with_body("forbidden")
            .create_async()
            .await;

        let request = Request::builder()
            .uri("/api/business-data")
            .body(Body::empty())
            .unwrap();
        let response = app(&server.url()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Failed to fetch business data" })
        );
    }

    #[tokio::test]
    async fn test_business_data_unreachable_upstream() {
        // Port 9 (discard) is not listening
        let request = Request::builder()
            .uri("/api/business-data")
            .body(Body::empty())
            .unwrap();
        let response = app("http://127.0.0.1:9").oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Internal server error" })
        );
    }

    #[tokio::test]
    async fn test_login_success_forwards_cookies() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/user_login")
            .match_body(mockito::Matcher::Json(
                json!({ "email": "owner@example.com", "password": "secret" }),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("set-cookie", "session=abc123; Path=/; HttpOnly")
            .with_header("set-cookie", "remember=1; Path=/")
            .with_body(r#"{"success":true,"user":{"name":"Owner"}}"#)
            .create_async()
            .await;

        let request = Request::builder()
            .method("POST")
            .uri("/api/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"email":"owner@example.com","password":"secret"}"#,
            ))
            .unwrap();
        let response = app(&server.url()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookies: Vec<_> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|value| value.to_str().unwrap().to_string())
            .collect();
        assert!(cookies.contains(&"session=abc123; Path=/; HttpOnly".to_string()));
        assert!(cookies.contains(&"remember=1; Path=/".to_string()));
        assert_eq!(body_json(response).await["user"]["name"], "Owner");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_rejected_is_unauthorized() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/user_login")
            .with_status(200)
            .with_body(r#"{"success":false,"message":"Invalid credentials"}"#)
            .create_async()
            .await;

        let request = Request::builder()
            .method("POST")
            .uri("/api/login")
            .body(Body::from(r#"{"email":"x","password":"y"}"#))
            .unwrap();
        let response = app(&server.url()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(body_json(response).await["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_login_with_invalid_body_is_internal_error() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/login")
            .body(Body::from("not json"))
            .unwrap();
        let response = app("http://127.0.0.1:9").oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "success": false, "message": "Internal server error" })
        );
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app("http://localhost:5001").oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }
}
