use axum::{
    body::Body,
    extract::{Path, RawQuery},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;

pub const FORM_BOUNDARY: &str = "mock-boundary";

const FORM_BODY: &str = "--mock-boundary\r\n\
Content-Disposition: form-data; name=\"greeting\"\r\n\
\r\n\
hello\r\n\
--mock-boundary\r\n\
Content-Disposition: form-data; name=\"upload\"; filename=\"notes.txt\"\r\n\
Content-Type: text/plain\r\n\
\r\n\
line one\r\n\
--mock-boundary--\r\n";

pub const BYTES_BODY: [u8; 4] = [0, 1, 2, 255];

/// What `/echo` saw of the incoming request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub query: Option<String>,
    pub body: String,
    pub content_type: Option<String>,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", get(echo).post(echo).put(echo).delete(echo))
        .route("/json", get(json_body))
        .route("/text", get(text))
        .route("/html", get(html))
        .route("/bytes", get(bytes))
        .route("/form", get(form))
        .route("/xml", get(xml))
        .route("/untyped", get(untyped))
        .route("/status/{code}", get(status))
        .route("/cookie/set", get(set_cookie))
        .route("/cookie/echo", get(echo_cookie))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn echo(
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: String,
) -> Json<Echo> {
    log::debug!("echo {method} query={query:?} body={body:?}");
    Json(Echo {
        method: method.to_string(),
        query,
        body,
        content_type: header_str(&headers, header::CONTENT_TYPE),
    })
}

async fn json_body() -> Json<serde_json::Value> {
    Json(json!({"x": 1, "nested": {"ok": true}}))
}

async fn text() -> &'static str {
    "hello from mock-server"
}

async fn html() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        "<p>hello</p>",
    )
}

async fn bytes() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        BYTES_BODY.to_vec(),
    )
}

async fn form() -> impl IntoResponse {
    (
        [(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={FORM_BOUNDARY}"),
        )],
        FORM_BODY,
    )
}

async fn xml() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/xml")], "<x>1</x>")
}

async fn untyped() -> Response {
    Response::new(Body::from("no declared type"))
}

async fn status(Path(code): Path<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, Json(json!({"status": code}))).into_response(),
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn set_cookie() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, "session=mock; Path=/")],
        Json(json!({"set": true})),
    )
}

async fn echo_cookie(headers: HeaderMap) -> Json<serde_json::Value> {
    Json(json!({"cookie": header_str(&headers, header::COOKIE)}))
}
