//! Integration tests for the signed-request transport
//!
//! These tests use wiremock to check status handling, retry behavior and
//! request signing against a mock API server.

mod common;

use common::*;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zhihu_comments::client::{
    CommentOrder, Payload, SearchRequest, SignatureHeaders, SignedRequestBuilder, Signer, Transport,
};
use zhihu_comments::session::{Cookie, Session};
use zhihu_comments::{ContentType, Result, ZhihuError};

/// Signer that always fails, counting how often it was asked
#[derive(Debug, Default)]
struct FailingSigner {
    calls: AtomicU32,
}

impl Signer for FailingSigner {
    fn sign(&self, _path_with_query: &str, _cookie_header: &str) -> Result<SignatureHeaders> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ZhihuError::Sign("signer unavailable".to_string()))
    }
}

/// Signer that blocks until another task on the runtime sends a signal
///
/// If signing ran on the only runtime thread, that task could never run
/// and the signal would time out.
struct WaitingSigner {
    signal: Mutex<Receiver<()>>,
    signalled: AtomicBool,
}

impl Signer for WaitingSigner {
    fn sign(&self, _path_with_query: &str, _cookie_header: &str) -> Result<SignatureHeaders> {
        let received = self
            .signal
            .lock()
            .unwrap()
            .recv_timeout(Duration::from_secs(2))
            .is_ok();
        self.signalled.store(received, Ordering::SeqCst);
        Ok(SignatureHeaders {
            x_zst_81: "zst-test".to_string(),
            x_zse_96: "2.0_test".to_string(),
        })
    }
}

#[tokio::test]
async fn test_signed_request_carries_signature_cookie_and_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/me"))
        .and(query_param("include", "email,is_active,is_bind_phone"))
        .and(header("x-zse-96", "2.0_test"))
        .and(header("x-zst-81", "zst-test"))
        .and(header("cookie", "d_c0=device; z_c0=token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "u1", "name": "me"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let signer = Arc::new(RecordingSigner::default());
    let client = client_with(&mock_server, logged_in_session(), signer.clone());

    let payload = client.get_current_user_info().await.unwrap();
    assert_eq!(payload.as_json().unwrap()["name"], "me");

    // The signature covers the path plus the serialized query
    let signed = signer.signed.lock().unwrap().clone();
    assert_eq!(
        signed,
        vec!["/api/v4/me?include=email%2Cis_active%2Cis_bind_phone".to_string()]
    );
}

#[tokio::test]
async fn test_forbidden_carries_body_and_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ROOT_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("account blocked"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client
        .get_root_comments("1", ContentType::Answer, "", 10, CommentOrder::Sort)
        .await
        .unwrap_err();

    match err {
        ZhihuError::Forbidden { body, .. } => assert_eq!(body, "account blocked"),
        other => panic!("expected Forbidden, got {:?}", other),
    }
}

#[tokio::test]
async fn test_not_found_is_empty_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ROOT_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let payload = client
        .get_root_comments("1", ContentType::Answer, "", 10, CommentOrder::Sort)
        .await
        .unwrap();

    assert_eq!(payload, Payload::Empty);
}

#[tokio::test]
async fn test_server_error_is_retried_until_exhausted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ROOT_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client
        .get_root_comments("1", ContentType::Answer, "", 10, CommentOrder::Sort)
        .await
        .unwrap_err();

    assert!(matches!(err, ZhihuError::Fetch { ref message, .. } if message == "internal"));
}

#[tokio::test]
async fn test_transient_failure_recovers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ROOT_PATH))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(ROOT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![], "", true)))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let payload = client
        .get_root_comments("1", ContentType::Answer, "", 10, CommentOrder::Sort)
        .await
        .unwrap();

    assert!(payload.as_json().is_some());
    assert_eq!(request_count(&mock_server).await, 2);
}

#[tokio::test]
async fn test_embedded_error_field_is_fetch_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"error": {"code": 40352, "message": "need captcha"}})),
        )
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.get_current_user_info().await.unwrap_err();

    assert!(matches!(err, ZhihuError::Fetch { ref message, .. } if message == "need captcha"));
}

#[tokio::test]
async fn test_malformed_json_is_fetch_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/me"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>captcha</html>"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.get_current_user_info().await.unwrap_err();

    assert!(matches!(err, ZhihuError::Fetch { ref message, .. } if message.contains("captcha")));
}

#[tokio::test]
async fn test_missing_credential_fails_before_sending() {
    let mock_server = MockServer::start().await;

    let session = Arc::new(Session::with_cookies(
        Default::default(),
        &[Cookie::new("z_c0", "token")],
    ));
    let signer = Arc::new(RecordingSigner::default());
    let client = client_with(&mock_server, session, signer.clone());

    let err = client.get_current_user_info().await.unwrap_err();

    assert!(matches!(err, ZhihuError::MissingCredential { cookie: "d_c0" }));
    assert!(signer.signed.lock().unwrap().is_empty());
    assert_eq!(request_count(&mock_server).await, 0);
}

#[tokio::test]
async fn test_signer_failure_is_retried_then_surfaced() {
    let mock_server = MockServer::start().await;

    let signer = Arc::new(FailingSigner::default());
    let client = client_with(&mock_server, logged_in_session(), signer.clone());

    let err = client.get_current_user_info().await.unwrap_err();

    assert!(matches!(err, ZhihuError::Sign(ref m) if m == "signer unavailable"));
    assert_eq!(signer.calls.load(Ordering::SeqCst), 3);
    assert_eq!(request_count(&mock_server).await, 0);
}

#[tokio::test]
async fn test_refresh_session_is_used_by_next_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/me"))
        .and(header("cookie", "d_c0=fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "u1", "name": "me"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = Arc::new(Session::new(Default::default()));
    let client = client_with(&mock_server, session, Arc::new(RecordingSigner::default()));

    assert!(!client.ping_session().await);

    client.refresh_session(&[Cookie::new("d_c0", "fresh")]);
    assert!(client.ping_session().await);
}

#[tokio::test]
async fn test_ping_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "u1", "name": ""})))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    assert!(!client.ping_session().await);

    let forbidden_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&forbidden_server)
        .await;

    assert!(!test_client(&forbidden_server).ping_session().await);
}

#[tokio::test]
async fn test_search_by_keyword() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/search_v3"))
        .and(query_param("q", "rust"))
        .and(query_param("offset", "20"))
        .and(query_param("lc_idx", "20"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "type": "search_result",
                    "object": {
                        "type": "answer",
                        "id": "1",
                        "question": {"id": "9", "name": "<em>rust</em>?"}
                    }
                },
                {
                    "type": "search_result",
                    "object": {"type": "zvideo", "id": "2", "title": "video"}
                }
            ],
            "paging": {"is_end": false}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let contents = client
        .search_by_keyword(&SearchRequest::new("rust").page(2))
        .await
        .unwrap();

    assert_eq!(contents.len(), 2);
    assert_eq!(contents[0].title, "rust?");
    assert_eq!(contents[0].source_keyword, "rust");
    assert_eq!(contents[1].content_type, ContentType::Zvideo);
}

#[tokio::test]
async fn test_signing_does_not_block_the_runtime() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "u1", "name": "me"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (tx, rx) = mpsc::channel();
    let signer = Arc::new(WaitingSigner {
        signal: Mutex::new(rx),
        signalled: AtomicBool::new(false),
    });
    let client = client_with(&mock_server, logged_in_session(), signer.clone());

    // Runs only once the request yields the runtime thread
    tokio::spawn(async move {
        let _ = tx.send(());
    });

    assert!(client.ping_session().await);
    assert!(signer.signalled.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_get_text_returns_body_verbatim() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .and(header("x-zse-96", "2.0_test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing.txt"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let requests = SignedRequestBuilder::new(
        mock_server.uri(),
        logged_in_session(),
        Arc::new(RecordingSigner::default()),
        Transport::from_config(&client_config()),
    );

    let payload = requests.get_text("/robots.txt", &[]).await.unwrap();
    assert_eq!(payload, Payload::Text("User-agent: *".to_string()));

    let payload = requests.get_text("/missing.txt", &[]).await.unwrap();
    assert_eq!(payload, Payload::Empty);
}
