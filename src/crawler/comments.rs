//! Exhaustive comment-tree traversal

use crate::client::{CommentEndpoint, CommentOrder, ZhihuClient};
use crate::config::CrawlerConfig;
use crate::crawler::walker::{Pacer, PageWalk};
use crate::crawler::CommentSink;
use crate::model::{Comment, Content};
use crate::{Result, ZhihuError};
use std::time::Duration;

/// Tuning for comment walks
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Walk replies under root comments
    pub enable_sub_comments: bool,

    /// Wait between consecutive page fetches, across all walks of a crawler
    pub delay: Duration,

    pub page_size: u32,
    pub order: CommentOrder,

    /// Stop a single walk after this many pages
    pub max_pages: Option<u32>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            enable_sub_comments: true,
            delay: Duration::from_secs(1),
            page_size: 10,
            order: CommentOrder::Sort,
            max_pages: None,
        }
    }
}

impl WalkOptions {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            enable_sub_comments: config.enable_sub_comments,
            delay: Duration::from_millis(config.crawl_interval_ms),
            page_size: config.comment_page_size,
            order: CommentOrder::Sort,
            max_pages: config.max_pages_per_walk,
        }
    }
}

/// Walks every page of a post's comments and of each root comment's replies
///
/// Pages are fetched strictly one after another; crawling several posts at
/// once means running several crawlers. Every fetch after a crawler's first
/// waits the configured delay, including the first page of each reply walk.
pub struct CommentCrawler<'a> {
    client: &'a ZhihuClient,
    options: WalkOptions,
    pacer: Pacer,
}

impl<'a> CommentCrawler<'a> {
    pub fn new(client: &'a ZhihuClient, options: WalkOptions) -> Self {
        Self {
            client,
            options,
            pacer: Pacer::new(),
        }
    }

    pub fn options(&self) -> &WalkOptions {
        &self.options
    }

    /// Fetches all root comments of `content`
    ///
    /// Replies are walked after each root page but are only delivered to
    /// `sink`; the returned list holds root comments only.
    pub async fn fetch_all_comments(
        &self,
        content: &Content,
        sink: Option<&mut (dyn CommentSink + '_)>,
    ) -> Result<Vec<Comment>> {
        let mut result = Vec::new();
        self.collect_all_comments(content, &mut result, sink).await?;
        Ok(result)
    }

    /// Like [`fetch_all_comments`](Self::fetch_all_comments), accumulating into `result`
    ///
    /// If the returned future is dropped between pages, or an error ends the
    /// walk, `result` keeps every root comment gathered so far.
    pub async fn collect_all_comments(
        &self,
        content: &Content,
        result: &mut Vec<Comment>,
        mut sink: Option<&mut (dyn CommentSink + '_)>,
    ) -> Result<()> {
        let mut walk = PageWalk::new(CommentEndpoint::root(content));

        while let Some(comments) = walk
            .next_page(self.client, content, &self.options, &self.pacer)
            .await?
        {
            deliver(&mut sink, &comments).await?;

            let start = result.len();
            result.extend(comments);
            self.fetch_all_sub_comments(content, &result[start..], sink.as_deref_mut())
                .await?;
        }

        tracing::info!(
            "Fetched {} root comments of {} {} over {} pages",
            result.len(),
            content.content_type,
            content.content_id,
            walk.pages_fetched()
        );
        Ok(())
    }

    /// Fetches all replies under each of `parents`
    ///
    /// Does nothing when sub-comment fetching is disabled. Parents with no
    /// replies are skipped without a request.
    pub async fn fetch_all_sub_comments(
        &self,
        content: &Content,
        parents: &[Comment],
        mut sink: Option<&mut (dyn CommentSink + '_)>,
    ) -> Result<Vec<Comment>> {
        if !self.options.enable_sub_comments {
            return Ok(Vec::new());
        }

        let mut all_sub_comments = Vec::new();
        for parent in parents.iter().filter(|c| c.has_replies()) {
            let mut walk = PageWalk::new(CommentEndpoint::Child {
                root_comment_id: &parent.comment_id,
            });

            while let Some(mut replies) = walk
                .next_page(self.client, content, &self.options, &self.pacer)
                .await?
            {
                for reply in &mut replies {
                    if reply.parent_comment_id.is_none() {
                        reply.parent_comment_id = Some(parent.comment_id.clone());
                    }
                }

                deliver(&mut sink, &replies).await?;
                all_sub_comments.extend(replies);
            }
        }

        Ok(all_sub_comments)
    }
}

async fn deliver(
    sink: &mut Option<&mut (dyn CommentSink + '_)>,
    comments: &[Comment],
) -> Result<()> {
    if let Some(sink) = sink.as_deref_mut() {
        sink.on_page(comments).await.map_err(ZhihuError::Sink)?;
    }
    Ok(())
}
