use crate::session::Cookie;
use crate::{Result, ZhihuError};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER, USER_AGENT,
};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Cookie the signer derives its signature from; requests fail fast without it
pub const REQUIRED_COOKIE: &str = "d_c0";

/// Immutable view of the session at one point in time
///
/// Requests take a snapshot once and use it for signing and sending, so a
/// concurrent refresh can never pair one session's cookie header with
/// another session's cookie map.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    cookies: HashMap<String, String>,
    cookie_header: String,
    default_headers: HeaderMap,
}

impl SessionSnapshot {
    fn build(cookies: &[Cookie], default_headers: HeaderMap) -> Self {
        let cookie_header = cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");

        Self {
            cookies: cookies
                .iter()
                .map(|c| (c.name.clone(), c.value.clone()))
                .collect(),
            cookie_header,
            default_headers,
        }
    }

    /// Value of a cookie by name
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// All cookies, keyed by name
    pub fn cookies(&self) -> &HashMap<String, String> {
        &self.cookies
    }

    /// Cookies serialized for a `Cookie:` header
    pub fn cookie_header(&self) -> &str {
        &self.cookie_header
    }

    /// Headers sent with every request, excluding cookies and signatures
    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// Fails with a credential error unless the named cookie is present and non-empty
    pub fn require_cookie(&self, name: &'static str) -> Result<&str> {
        match self.cookie(name) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(ZhihuError::MissingCredential { cookie: name }),
        }
    }
}

/// Shared session handle
///
/// Cheap concurrent reads through [`Session::snapshot`]; [`Session::refresh`]
/// swaps in a fully built snapshot under the write lock.
#[derive(Debug)]
pub struct Session {
    current: RwLock<Arc<SessionSnapshot>>,
}

impl Session {
    /// Creates a session with no cookies yet
    pub fn new(default_headers: HeaderMap) -> Self {
        Self::with_cookies(default_headers, &[])
    }

    /// Creates a session from an already acquired cookie set
    pub fn with_cookies(default_headers: HeaderMap, cookies: &[Cookie]) -> Self {
        Self {
            current: RwLock::new(Arc::new(SessionSnapshot::build(cookies, default_headers))),
        }
    }

    /// Returns the current snapshot
    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the cookie set, typically after an external login
    ///
    /// Default headers are carried over from the previous snapshot.
    pub fn refresh(&self, cookies: &[Cookie]) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let next = SessionSnapshot::build(cookies, current.default_headers.clone());
        *current = Arc::new(next);
        tracing::info!("Session refreshed with {} cookies", cookies.len());
    }
}

/// Builds the baseline headers the web client sends with API requests
pub fn default_headers(user_agent: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, header_value(user_agent)?);
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"),
    );
    headers.insert(ORIGIN, HeaderValue::from_static("https://www.zhihu.com"));
    headers.insert(REFERER, HeaderValue::from_static("https://www.zhihu.com/"));
    headers.insert(
        HeaderName::from_static("x-api-version"),
        HeaderValue::from_static("3.0.91"),
    );
    headers.insert(
        HeaderName::from_static("x-requested-with"),
        HeaderValue::from_static("fetch"),
    );
    headers.insert(
        HeaderName::from_static("x-zse-93"),
        HeaderValue::from_static("101_3_3.0"),
    );
    Ok(headers)
}

/// Converts a string into a header value, reporting which value was rejected
pub(crate) fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| ZhihuError::InvalidHeader(format!("'{}' is not a valid header value", value)))
}
