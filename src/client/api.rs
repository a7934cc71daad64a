//! Endpoint bindings
//!
//! Thin wrappers over [`SignedRequestBuilder`] with the platform's fixed
//! paths and parameter shapes.

use crate::client::{Payload, SearchRequest, SignedRequestBuilder, Signer, Transport};
use crate::config::ClientConfig;
use crate::extract::Extractor;
use crate::model::{Content, ContentType};
use crate::session::{Cookie, Session};
use crate::Result;
use serde_json::Value;
use std::sync::Arc;

/// Base URL every API path is appended to
pub const ZHIHU_URL: &str = "https://www.zhihu.com";

/// Ordering of comment pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommentOrder {
    /// Platform's default ranking
    #[default]
    Sort,
    /// Newest first
    Timestamp,
}

impl CommentOrder {
    pub fn as_param(&self) -> &'static str {
        match self {
            CommentOrder::Sort => "sort",
            CommentOrder::Timestamp => "ts",
        }
    }
}

/// Which comment listing a page comes from
#[derive(Debug, Clone, Copy)]
pub enum CommentEndpoint<'a> {
    /// Top-level comments of a post
    Root {
        content_id: &'a str,
        content_type: ContentType,
    },
    /// Replies under one root comment
    Child { root_comment_id: &'a str },
}

impl<'a> CommentEndpoint<'a> {
    pub fn root(content: &'a Content) -> Self {
        CommentEndpoint::Root {
            content_id: &content.content_id,
            content_type: content.content_type,
        }
    }

    pub fn path(&self) -> String {
        match self {
            CommentEndpoint::Root {
                content_id,
                content_type,
            } => format!("/api/v4/{}s/{}/root_comments", content_type, content_id),
            CommentEndpoint::Child { root_comment_id } => {
                format!("/api/v4/comment_v5/comment/{}/child_comment", root_comment_id)
            }
        }
    }
}

/// Client for the platform's private API
pub struct ZhihuClient {
    requests: SignedRequestBuilder,
    extractor: Arc<dyn Extractor>,
}

impl ZhihuClient {
    /// Creates a client against the production base URL
    pub fn new(
        config: &ClientConfig,
        session: Arc<Session>,
        signer: Arc<dyn Signer>,
        extractor: Arc<dyn Extractor>,
    ) -> Self {
        Self {
            requests: SignedRequestBuilder::new(
                ZHIHU_URL,
                session,
                signer,
                Transport::from_config(config),
            ),
            extractor,
        }
    }

    /// Points the client at another host, e.g. a mock server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.requests.set_base_url(base_url);
        self
    }

    pub fn session(&self) -> &Arc<Session> {
        self.requests.session()
    }

    pub fn extractor(&self) -> &dyn Extractor {
        self.extractor.as_ref()
    }

    /// Accepts cookies from an external login flow
    pub fn refresh_session(&self, cookies: &[Cookie]) {
        self.requests.session().refresh(cookies);
    }

    /// Fetches the logged-in user's profile
    pub async fn get_current_user_info(&self) -> Result<Payload> {
        let params = [("include", "email,is_active,is_bind_phone".to_string())];
        self.requests.get("/api/v4/me", &params).await
    }

    /// Checks whether the session is still logged in
    ///
    /// Any error, or a profile without both an id and a name, means the
    /// session is not alive.
    pub async fn ping_session(&self) -> bool {
        tracing::info!("Checking session liveness...");
        match self.get_current_user_info().await {
            Ok(payload) => {
                let alive = payload.as_json().map(is_logged_in_user).unwrap_or(false);
                if alive {
                    tracing::info!("Session is alive");
                } else {
                    tracing::error!("Session probe returned no user identity: {:?}", payload);
                }
                alive
            }
            Err(e) => {
                tracing::error!("Session probe failed: {}", e);
                false
            }
        }
    }

    /// Searches posts by keyword, returning one page of results
    pub async fn search_by_keyword(&self, request: &SearchRequest) -> Result<Vec<Content>> {
        let payload = self
            .requests
            .get("/api/v4/search_v3", &request.params())
            .await?;

        let mut contents = match payload.as_json() {
            Some(value) => self.extractor.extract_contents(value),
            None => Vec::new(),
        };
        for content in &mut contents {
            content.source_keyword = request.keyword.clone();
        }

        tracing::info!(
            "Search '{}' page {} returned {} contents",
            request.keyword,
            request.page,
            contents.len()
        );
        Ok(contents)
    }

    /// Fetches one page of a post's root comments
    pub async fn get_root_comments(
        &self,
        content_id: &str,
        content_type: ContentType,
        offset: &str,
        limit: u32,
        order: CommentOrder,
    ) -> Result<Payload> {
        let endpoint = CommentEndpoint::Root {
            content_id,
            content_type,
        };
        self.get_comment_page(endpoint, offset, limit, order).await
    }

    /// Fetches one page of replies under a root comment
    pub async fn get_child_comments(
        &self,
        root_comment_id: &str,
        offset: &str,
        limit: u32,
        order: CommentOrder,
    ) -> Result<Payload> {
        let endpoint = CommentEndpoint::Child { root_comment_id };
        self.get_comment_page(endpoint, offset, limit, order).await
    }

    /// Fetches one page from either comment listing
    pub async fn get_comment_page(
        &self,
        endpoint: CommentEndpoint<'_>,
        offset: &str,
        limit: u32,
        order: CommentOrder,
    ) -> Result<Payload> {
        let params = [
            ("order", order.as_param().to_string()),
            ("offset", offset.to_string()),
            ("limit", limit.to_string()),
        ];
        self.requests.get(&endpoint.path(), &params).await
    }
}

fn is_logged_in_user(profile: &Value) -> bool {
    let has_id = ["id", "uid"].iter().any(|key| is_present(profile.get(*key)));
    has_id && is_present(profile.get("name"))
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_u64() != Some(0),
        _ => false,
    }
}
