//! Client module for Zhihu's private API
//!
//! This module contains everything between a crawl and the network:
//! - Transport with timeout, proxy and bounded retry
//! - The request signer seam
//! - Signed GET requests built from the current session
//! - Endpoint bindings (user probe, search, comment pages)

mod api;
mod request;
mod search;
mod signer;
mod transport;

pub use api::{CommentEndpoint, CommentOrder, ZhihuClient, ZHIHU_URL};
pub use request::{with_query, SignedRequestBuilder};
pub use search::{SearchRequest, SearchSort, SearchTime, SearchType};
pub use signer::{CommandSigner, SignatureHeaders, Signer};
pub use transport::{build_http_client, HttpRequest, Payload, RetryPolicy, Transport};
