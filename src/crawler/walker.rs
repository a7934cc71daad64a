//! Cursor-driven page walk shared by the root and child comment walks

use crate::client::{CommentEndpoint, ZhihuClient};
use crate::crawler::WalkOptions;
use crate::model::{Comment, Content};
use crate::Result;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Spaces out page fetches across every walk of one crawl
///
/// The first fetch goes out immediately; each later fetch, whether it
/// continues the same walk or starts a reply walk, waits the delay first.
/// Nothing waits after the final fetch.
#[derive(Debug, Default)]
pub(crate) struct Pacer {
    fetched: AtomicBool,
}

impl Pacer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Waits `delay` unless this is the first fetch
    pub(crate) async fn before_fetch(&self, delay: Duration) {
        let already_fetched = self.fetched.swap(true, Ordering::SeqCst);
        if already_fetched && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// State of one paginated walk over a comment listing
///
/// Each call to [`PageWalk::next_page`] fetches at most one page using the
/// cursor the previous page returned. The walk ends on:
/// - a page marked `is_end`
/// - an empty page payload (including HTTP 404)
/// - a page whose extracted comments are empty
/// - a next cursor equal to the one just used
/// - the configured page cap
///
/// Delays between fetches come from the [`Pacer`] shared by all walks of a
/// crawl.
#[derive(Debug)]
pub(crate) struct PageWalk<'a> {
    endpoint: CommentEndpoint<'a>,
    offset: String,
    pages: u32,
    finished: bool,
}

impl<'a> PageWalk<'a> {
    pub(crate) fn new(endpoint: CommentEndpoint<'a>) -> Self {
        Self {
            endpoint,
            offset: String::new(),
            pages: 0,
            finished: false,
        }
    }

    pub(crate) fn pages_fetched(&self) -> u32 {
        self.pages
    }

    /// Fetches the next page, or returns `None` once the walk has ended
    pub(crate) async fn next_page(
        &mut self,
        client: &ZhihuClient,
        content: &Content,
        options: &WalkOptions,
        pacer: &Pacer,
    ) -> Result<Option<Vec<Comment>>> {
        if self.finished {
            return Ok(None);
        }

        if let Some(max_pages) = options.max_pages {
            if self.pages >= max_pages {
                tracing::warn!(
                    "Stopping walk of {} after {} pages (page cap)",
                    self.endpoint.path(),
                    self.pages
                );
                self.finished = true;
                return Ok(None);
            }
        }

        pacer.before_fetch(options.delay).await;

        let payload = client
            .get_comment_page(self.endpoint, &self.offset, options.page_size, options.order)
            .await?;
        self.pages += 1;

        let Some(body) = payload.into_json() else {
            tracing::debug!("Empty page from {}, walk complete", self.endpoint.path());
            self.finished = true;
            return Ok(None);
        };

        let null = Value::Null;
        let paging = body.get("paging").unwrap_or(&null);
        let is_end = paging.get("is_end").and_then(Value::as_bool);
        let next_offset = client.extractor().extract_offset(paging);
        let mut comments = client
            .extractor()
            .extract_comments(content, body.get("data"));

        if comments.is_empty() {
            tracing::debug!("No comments on page from {}, walk complete", self.endpoint.path());
            self.finished = true;
            return Ok(None);
        }

        match is_end {
            Some(true) => self.finished = true,
            Some(false) => {}
            None => tracing::warn!(
                "Page from {} has no is_end flag, assuming more pages",
                self.endpoint.path()
            ),
        }

        if !self.finished && next_offset == self.offset {
            tracing::warn!(
                "Cursor did not advance past '{}' on {}, stopping walk",
                self.offset,
                self.endpoint.path()
            );
            self.finished = true;
        }

        tracing::debug!(
            "Page {} from {}: {} comments, next offset '{}'",
            self.pages,
            self.endpoint.path(),
            comments.len(),
            next_offset
        );
        for comment in &mut comments {
            comment.page_offset = next_offset.clone();
        }
        self.offset = next_offset;
        Ok(Some(comments))
    }
}
