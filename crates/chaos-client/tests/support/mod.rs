//! warp front for in-process transports

#![allow(dead_code)]

use chaos_core::{Method, Request, RequestBody, Response, Transport};
use parking_lot::Mutex;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::path::FullPath;
use warp::Filter;

/// Running test server; aborted on drop
pub struct TestServer {
    pub base_url: String,
    content_types: Arc<Mutex<Vec<Option<String>>>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// `content-type` header of each request, in arrival order
    pub fn content_types(&self) -> Vec<Option<String>> {
        self.content_types.lock().clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Serve `backend` over HTTP on an ephemeral local port
pub fn serve<T: Transport + 'static>(backend: Arc<T>) -> TestServer {
    let content_types = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&content_types);

    let routes = warp::method()
        .and(warp::path::full())
        .and(warp::header::optional::<String>("content-type"))
        .and(warp::body::bytes())
        .and_then(
            move |method: warp::http::Method,
                  path: FullPath,
                  content_type: Option<String>,
                  body: Bytes| {
                let backend = Arc::clone(&backend);
                let recorded = Arc::clone(&recorded);
                async move {
                    recorded.lock().push(content_type.clone());
                    let response =
                        dispatch(backend.as_ref(), &method, path.as_str(), content_type.as_deref(), &body)
                            .await;
                    let status = StatusCode::from_u16(response.status)
                        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                    Ok::<_, Infallible>(warp::reply::with_status(
                        warp::reply::with_header(response.body, "content-type", "application/json"),
                        status,
                    ))
                }
            },
        );

    let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    TestServer {
        base_url: format!("http://{addr}"),
        content_types,
        handle: tokio::spawn(server),
    }
}

/// Accepts requests and answers only after a minute
pub fn silent_server() -> TestServer {
    let routes = warp::any().and_then(|| async {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok::<_, Infallible>("late")
    });
    let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    TestServer {
        base_url: format!("http://{addr}"),
        content_types: Arc::default(),
        handle: tokio::spawn(server),
    }
}

/// Address with nothing listening
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

async fn dispatch<T: Transport + ?Sized>(
    backend: &T,
    method: &warp::http::Method,
    path: &str,
    content_type: Option<&str>,
    body: &[u8],
) -> Response {
    let method = match method.as_str() {
        "GET" => Method::Get,
        "POST" => Method::Post,
        "PUT" => Method::Put,
        "PATCH" => Method::Patch,
        "DELETE" => Method::Delete,
        _ => return Response::new(405, "Method Not Allowed"),
    };
    let body = String::from_utf8_lossy(body).into_owned();
    let request = Request::new(method, path).with_body(to_body(content_type, body));
    backend
        .send(request)
        .await
        .unwrap_or_else(|e| Response::new(500, e.to_string()))
}

fn to_body(content_type: Option<&str>, body: String) -> RequestBody {
    if body.is_empty() {
        return RequestBody::Empty;
    }
    match serde_json::from_str(&body) {
        Ok(value) => RequestBody::Json(value),
        Err(_) => RequestBody::Raw {
            content_type: if content_type.is_some_and(|c| c.contains("json")) {
                "application/json"
            } else {
                "text/plain"
            },
            data: body,
        },
    }
}
