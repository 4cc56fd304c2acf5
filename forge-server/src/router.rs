//! Request routing.
//!
//! Every response carries permissive CORS headers. The generation endpoint
//! answers 200 for success, showcase, and terminal failure alike; only bad
//! input produces a 4xx.

use std::convert::Infallible;
use std::sync::Arc;

use forge_kernel::GenerationError;
use forge_primitives::GenerationRequest;
use hyper::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE, HeaderValue,
};
use hyper::{Body, Method, Request, Response, StatusCode};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, warn};

use crate::AppState;

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";

/// Paths that exist; anything else is a 404 rather than a 405.
const KNOWN_PATHS: [&str; 8] = [
    "/",
    "/health",
    "/tweets",
    "/refresh",
    "/prompts",
    "/context",
    "/cache",
    "/process_tweets",
];

/// Serves one request. Never fails; errors become JSON responses.
///
/// # Errors
///
/// The error type is [`Infallible`].
pub async fn handle(
    state: Arc<AppState>,
    request: Request<Body>,
) -> Result<Response<Body>, Infallible> {
    debug!(method = %request.method(), path = request.uri().path(), "request");

    let mut response = route(&state, request).await;
    apply_cors(&mut response);
    Ok(response)
}

async fn route(state: &AppState, request: Request<Body>) -> Response<Body> {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    if method == Method::OPTIONS {
        return empty(StatusCode::NO_CONTENT);
    }

    match (&method, path.as_str()) {
        (&Method::GET, "/") => json_response(
            StatusCode::OK,
            &json!({ "message": state.tweet_count().await }),
        ),
        (&Method::GET, "/health") => json_response(StatusCode::OK, &json!({ "message": "Alive!" })),
        (&Method::GET, "/tweets") => json_response(StatusCode::OK, &state.tweets().await),
        (&Method::GET, "/refresh") => match state.refresh().await {
            Ok(tweets) => json_response(StatusCode::OK, &tweets),
            Err(err) => {
                error!(error = %err, "dataset refresh failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        },
        (&Method::GET, "/prompts") => {
            json_response(StatusCode::OK, state.orchestrator().store().prompts())
        }
        (&Method::GET, "/context") => {
            json_response(StatusCode::OK, state.orchestrator().store().contexts())
        }
        (&Method::GET, "/cache") => json_response(StatusCode::OK, &state.cache().snapshot().await),
        (&Method::POST, "/process_tweets") => process_tweets(state, request).await,
        (_, path) if KNOWN_PATHS.contains(&path) => {
            error_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
        }
        _ => error_response(StatusCode::NOT_FOUND, "not found"),
    }
}

async fn process_tweets(state: &AppState, request: Request<Body>) -> Response<Body> {
    let body = match hyper::body::to_bytes(request.into_body()).await {
        Ok(body) => body,
        Err(err) => {
            return error_response(StatusCode::BAD_REQUEST, format!("failed to read body: {err}"));
        }
    };

    let generation: GenerationRequest = match serde_json::from_slice(&body) {
        Ok(generation) => generation,
        Err(err) => {
            warn!(error = %err, "rejected request body");
            return error_response(StatusCode::BAD_REQUEST, format!("invalid request body: {err}"));
        }
    };

    match state.orchestrator().generate(&generation).await {
        Ok(envelope) => json_response(StatusCode::OK, &envelope),
        Err(err @ GenerationError::UnknownContextTag { .. }) => {
            warn!(error = %err, "rejected request");
            error_response(StatusCode::BAD_REQUEST, err.to_string())
        }
        Err(err) => {
            error!(error = %err, "generation could not start");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn json_response<T>(status: StatusCode, body: &T) -> Response<Body>
where
    T: Serialize + ?Sized,
{
    match serde_json::to_vec(body) {
        Ok(bytes) => {
            let mut response = Response::new(Body::from(bytes));
            *response.status_mut() = status;
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        Err(err) => {
            error!(error = %err, "failed to encode response");
            empty(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response<Body> {
    json_response(status, &json!({ "error": message.into() }))
}

fn empty(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}

fn apply_cors(response: &mut Response<Body>) {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
}
