//! Domain types produced by the extractor
//!
//! - `Content`: a post found by search (answer, article or video)
//! - `Comment`: a root comment or a reply under one

mod comment;
mod content;

pub use comment::Comment;
pub use content::{Content, ContentType};
