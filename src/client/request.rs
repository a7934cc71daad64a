//! Signed GET requests

use crate::client::{HttpRequest, Payload, SignatureHeaders, Signer, Transport};
use crate::session::{header_value, Session, REQUIRED_COOKIE};
use crate::{Result, ZhihuError};
use reqwest::header::{HeaderMap, HeaderName, COOKIE};
use std::sync::Arc;

/// Appends `params` to `path` as a canonical URL-encoded query string
///
/// Parameters keep their given order; spaces encode as `+`.
pub fn with_query(path: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }

    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
        .finish();
    format!("{}?{}", path, query)
}

/// Composes, signs and sends API requests
///
/// Every request is signed over its full path and query with the session's
/// cookie header, then sent with the signature merged into a copy of the
/// session's default headers.
pub struct SignedRequestBuilder {
    base_url: String,
    session: Arc<Session>,
    signer: Arc<dyn Signer>,
    transport: Transport,
}

impl SignedRequestBuilder {
    pub fn new(
        base_url: impl Into<String>,
        session: Arc<Session>,
        signer: Arc<dyn Signer>,
        transport: Transport,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            session,
            signer,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Sends a signed GET request and parses the response as JSON
    ///
    /// # Errors
    ///
    /// * `MissingCredential` - the session lacks the cookie the signer needs;
    ///   nothing is sent
    /// * `Sign` - the signer failed on every attempt
    /// * anything [`Transport::attempt`] reports
    ///
    /// Signing happens inside each attempt, so a signer failure is retried
    /// like a transport failure.
    pub async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Payload> {
        self.send(path, params, false).await
    }

    /// Sends a signed GET request and returns the body verbatim
    ///
    /// Status handling is the same as [`get`](Self::get); a 2xx body comes
    /// back as [`Payload::Text`] without being parsed.
    pub async fn get_text(&self, path: &str, params: &[(&str, String)]) -> Result<Payload> {
        self.send(path, params, true).await
    }

    async fn send(
        &self,
        path: &str,
        params: &[(&str, String)],
        raw_text: bool,
    ) -> Result<Payload> {
        let path_with_query = with_query(path, params);
        let session = self.session.snapshot();
        session.require_cookie(REQUIRED_COOKIE)?;

        let url = format!("{}{}", self.base_url, path_with_query);
        let (path_ref, session_ref, url_ref) = (&path_with_query, &session, &url);

        tracing::debug!("GET {}", path_with_query);
        self.transport
            .execute(&url, move || async move {
                let signature = self
                    .sign(path_ref.clone(), session_ref.cookie_header().to_string())
                    .await?;

                let mut headers: HeaderMap = session_ref.default_headers().clone();
                if !session_ref.cookie_header().is_empty() {
                    headers.insert(COOKIE, header_value(session_ref.cookie_header())?);
                }
                for (name, value) in signature.pairs() {
                    let name = HeaderName::from_static(name);
                    headers.insert(name, header_value(value)?);
                }

                let request = HttpRequest::get(url_ref.as_str()).with_headers(headers);
                Ok(if raw_text { request.raw_text() } else { request })
            })
            .await
    }

    /// Runs the signer on the blocking pool
    ///
    /// Signers may spawn processes or do heavy hashing, which must not stall
    /// the async workers driving other requests.
    async fn sign(
        &self,
        path_with_query: String,
        cookie_header: String,
    ) -> Result<SignatureHeaders> {
        let signer = Arc::clone(&self.signer);
        tokio::task::spawn_blocking(move || signer.sign(&path_with_query, &cookie_header))
            .await
            .map_err(|e| ZhihuError::Sign(format!("signer task failed: {}", e)))?
    }
}

impl std::fmt::Debug for SignedRequestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedRequestBuilder")
            .field("base_url", &self.base_url)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}
