mod support;

use chaos_client::HttpTransport;
use chaos_core::{Method, Request, RequestBody, Response, Transport, TransportError};
use chaos_test_utils::{created_response, ScriptedTransport};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn transport(base_url: &str) -> HttpTransport {
    HttpTransport::new(base_url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn json_body_reaches_server() {
    let backend = Arc::new(ScriptedTransport::responses([created_response(7)]));
    let server = support::serve(Arc::clone(&backend));

    let payload = json!({ "title": "Dune - 4821", "author": "Frank Herbert" });
    let response = transport(&server.base_url)
        .send(Request::new(Method::Post, "/books").with_body(RequestBody::Json(payload.clone())))
        .await
        .unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(response.json::<serde_json::Value>().unwrap()["id"], 7);

    let sent = backend.sent();
    assert_eq!(sent[0].method, Method::Post);
    assert_eq!(sent[0].path, "/books");
    assert_eq!(sent[0].body, RequestBody::Json(payload));
    assert_eq!(server.content_types(), vec![Some("application/json".to_string())]);
}

#[tokio::test]
async fn raw_body_keeps_declared_content_type() {
    let backend = Arc::new(ScriptedTransport::responses([Response::new(400, "bad json")]));
    let server = support::serve(Arc::clone(&backend));

    let request = Request::new(Method::Put, "/books/3").with_body(RequestBody::Raw {
        content_type: "application/json",
        data: "This is not valid JSON".to_string(),
    });
    let response = transport(&server.base_url).send(request).await.unwrap();

    assert_eq!(response, Response::new(400, "bad json"));
    assert_eq!(
        backend.sent()[0].body,
        RequestBody::Raw {
            content_type: "application/json",
            data: "This is not valid JSON".to_string(),
        }
    );
    assert_eq!(server.content_types(), vec![Some("application/json".to_string())]);
}

#[tokio::test]
async fn methods_and_paths_pass_through() {
    let backend = Arc::new(ScriptedTransport::responses([
        Response::new(405, "Method Not Allowed"),
        Response::new(204, ""),
        Response::new(404, "Not Found"),
    ]));
    let server = support::serve(Arc::clone(&backend));
    let http = transport(&server.base_url);

    let patch = http
        .send(
            Request::new(Method::Patch, "/books/1")
                .with_body(RequestBody::Json(json!({ "title": "This won't work" }))),
        )
        .await
        .unwrap();
    let delete = http.send(Request::new(Method::Delete, "/books/9")).await.unwrap();
    let unknown = http.send(Request::new(Method::Get, "/not_books")).await.unwrap();

    assert_eq!(patch.status, 405);
    assert_eq!(delete, Response::new(204, ""));
    assert_eq!(unknown.body, "Not Found");

    let sent: Vec<_> = backend.sent().into_iter().map(|r| (r.method, r.path)).collect();
    assert_eq!(
        sent,
        vec![
            (Method::Patch, "/books/1".to_string()),
            (Method::Delete, "/books/9".to_string()),
            (Method::Get, "/not_books".to_string()),
        ]
    );
    assert_eq!(server.content_types()[1], None);
}

#[tokio::test]
async fn refused_connection_is_connect_error() {
    let err = transport(&support::refused_url())
        .send(Request::new(Method::Get, "/books"))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Connect(_)), "{err}");
}

#[tokio::test]
async fn silent_server_times_out() {
    let server = support::silent_server();
    let http = HttpTransport::new(&server.base_url, Duration::from_millis(200)).unwrap();

    let err = http.send(Request::new(Method::Get, "/books")).await.unwrap_err();

    assert_eq!(err, TransportError::Timeout(Duration::from_millis(200)));
    assert!(err.is_timeout());
}

#[tokio::test]
async fn pooled_connection_carries_many_requests() {
    let backend = Arc::new(
        ScriptedTransport::responses([]).with_fallback(Ok(Response::new(200, "[]"))),
    );
    let server = support::serve(Arc::clone(&backend));
    let http = transport(&server.base_url);

    for i in 0..20u64 {
        let request = Request::new(Method::Put, format!("/books/{i}"))
            .with_body(RequestBody::Json(json!({ "title": format!("Updated Title - {i}") })));
        let response = http.send(request).await.unwrap();
        assert_eq!(response.status, 200);
    }

    let sent = backend.sent();
    assert_eq!(sent.len(), 20);
    assert_eq!(sent[19].path, "/books/19");
    assert_eq!(
        sent[19].body,
        RequestBody::Json(json!({ "title": "Updated Title - 19" }))
    );
}
