//! Shared fixtures for the wiremock-backed integration tests

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use wiremock::MockServer;
use zhihu_comments::client::{SignatureHeaders, Signer, ZhihuClient};
use zhihu_comments::config::ClientConfig;
use zhihu_comments::session::{Cookie, Session};
use zhihu_comments::{JsonExtractor, Result};

pub const ROOT_PATH: &str = "/api/v4/answers/1/root_comments";

/// Client config with a short retry wait so retry tests stay fast
pub fn client_config() -> ClientConfig {
    ClientConfig {
        timeout_secs: 5,
        retry_wait_ms: 10,
        ..ClientConfig::default()
    }
}

pub fn logged_in_session() -> Arc<Session> {
    Arc::new(Session::with_cookies(
        Default::default(),
        &[Cookie::new("d_c0", "device"), Cookie::new("z_c0", "token")],
    ))
}

/// Signer that records every path it signs
#[derive(Debug, Default)]
pub struct RecordingSigner {
    pub signed: Mutex<Vec<String>>,
}

impl Signer for RecordingSigner {
    fn sign(&self, path_with_query: &str, _cookie_header: &str) -> Result<SignatureHeaders> {
        self.signed
            .lock()
            .unwrap()
            .push(path_with_query.to_string());
        Ok(SignatureHeaders {
            x_zst_81: "zst-test".to_string(),
            x_zse_96: "2.0_test".to_string(),
        })
    }
}

pub fn client_with(
    server: &MockServer,
    session: Arc<Session>,
    signer: Arc<dyn Signer>,
) -> ZhihuClient {
    ZhihuClient::new(
        &client_config(),
        session,
        signer,
        Arc::new(JsonExtractor::new()),
    )
    .with_base_url(server.uri())
}

pub fn test_client(server: &MockServer) -> ZhihuClient {
    client_with(
        server,
        logged_in_session(),
        Arc::new(RecordingSigner::default()),
    )
}

pub fn comment(id: &str, child_comment_count: u64) -> Value {
    json!({
        "id": id,
        "content": format!("comment {}", id),
        "created_time": 1700000000,
        "like_count": 1,
        "child_comment_count": child_comment_count,
        "author": {"name": "tester"}
    })
}

/// A comment page whose `paging.next` carries `next_offset`
pub fn page(comments: Vec<Value>, next_offset: &str, is_end: bool) -> Value {
    json!({
        "data": comments,
        "paging": {
            "is_end": is_end,
            "next": format!(
                "https://www.zhihu.com/api/v4/comments?limit=10&offset={}",
                next_offset
            )
        }
    })
}

/// Offsets sent by every request the server received on `path`, in order
pub async fn offsets_requested(server: &MockServer, path: &str) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == path)
        .map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "offset")
                .map(|(_, v)| v.into_owned())
                .unwrap()
        })
        .collect()
}

pub async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}
