//! Crawler module for comment traversal
//!
//! This module contains the core crawling logic, including:
//! - The cursor-driven page walk shared by root and child listings
//! - Exhaustive root-then-replies traversal
//! - The push interface pages are delivered through
//! - Overall search-then-comments coordination

mod comments;
mod coordinator;
mod sink;
mod walker;

pub use comments::{CommentCrawler, WalkOptions};
pub use coordinator::{Coordinator, CrawlReport};
pub use sink::{CommentSink, VecSink};

use crate::config::Config;
use crate::Result;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Load the session cookies and build the client
/// 2. Verify the session is logged in
/// 3. Search every configured keyword
/// 4. Walk every found content's comment tree
pub async fn crawl(config: Config) -> Result<CrawlReport> {
    Coordinator::new(config)?.run().await
}
