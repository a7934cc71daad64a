//! Output module for crawl results
//!
//! This module handles:
//! - Writing search results as JSON lines
//! - A JSON-lines comment sink for incremental delivery

mod jsonl;

pub use jsonl::{write_contents, JsonLinesSink};
