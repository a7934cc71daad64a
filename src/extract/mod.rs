//! Response-to-domain extraction
//!
//! The traversal engine never reads comment fields itself; it hands raw
//! page data to an [`Extractor`] and only looks at paging metadata.

mod json;

pub use json::JsonExtractor;

use crate::model::{Comment, Content};
use serde_json::Value;

/// Turns raw API payloads into domain objects
pub trait Extractor: Send + Sync {
    /// Contents found in a search payload
    fn extract_contents(&self, search_payload: &Value) -> Vec<Content>;

    /// Comments in a page's `data` list, attributed to `content`
    fn extract_comments(&self, content: &Content, data: Option<&Value>) -> Vec<Comment>;

    /// Cursor for the page after the one `paging` describes
    fn extract_offset(&self, paging: &Value) -> String;
}
