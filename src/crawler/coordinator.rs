//! Crawler coordinator - search-then-comments orchestration
//!
//! This module wires the configured pieces together and runs a full crawl:
//! - Checking the session is still logged in
//! - Searching every keyword for the configured number of pages
//! - Writing found contents to disk
//! - Walking each content's comment tree into the comment sink

use crate::client::{CommandSigner, SearchRequest, ZhihuClient};
use crate::config::Config;
use crate::crawler::{CommentCrawler, WalkOptions};
use crate::extract::JsonExtractor;
use crate::model::{Content, ContentType};
use crate::output::{write_contents, JsonLinesSink};
use crate::session::{default_headers, load_cookies, Session};
use crate::{Result, ZhihuError};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Totals for one crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Distinct contents found by search
    pub contents: usize,

    /// Root comments across all contents
    pub root_comments: usize,

    /// Root and child comments delivered to the sink
    pub comments_written: u64,

    /// Contents whose comment walk ended in an error
    pub failed_contents: usize,
}

/// Main crawl coordinator
pub struct Coordinator {
    config: Config,
    client: ZhihuClient,
}

impl Coordinator {
    /// Builds a coordinator from configuration
    ///
    /// Loads the session cookies and sets up the external signer and the
    /// default extractor.
    pub fn new(config: Config) -> Result<Self> {
        let cookies = load_cookies(Path::new(&config.session.cookies_path))?;
        tracing::info!(
            "Loaded {} cookies from {}",
            cookies.len(),
            config.session.cookies_path
        );

        let session =
            Session::with_cookies(default_headers(&config.client.user_agent)?, &cookies);
        let signer = CommandSigner::new(&config.signer.command)?;
        let client = ZhihuClient::new(
            &config.client,
            Arc::new(session),
            Arc::new(signer),
            Arc::new(JsonExtractor::new()),
        );

        Ok(Self::with_client(config, client))
    }

    /// Builds a coordinator around an existing client
    pub fn with_client(config: Config, client: ZhihuClient) -> Self {
        Self { config, client }
    }

    pub fn client(&self) -> &ZhihuClient {
        &self.client
    }

    /// Runs the crawl
    ///
    /// A forbidden response aborts the run since the session needs to be
    /// refreshed; any other failure of one content's walk is logged and the
    /// crawl moves on to the next content.
    pub async fn run(&self) -> Result<CrawlReport> {
        if !self.client.ping_session().await {
            return Err(ZhihuError::SessionNotAlive);
        }

        let contents = self.search_all().await?;
        write_contents(Path::new(&self.config.output.contents_path), &contents)?;

        let mut report = CrawlReport {
            contents: contents.len(),
            ..CrawlReport::default()
        };

        let mut sink = JsonLinesSink::append_to(Path::new(&self.config.output.comments_path))?;
        let options = WalkOptions::from_config(&self.config.crawler);
        let crawler = CommentCrawler::new(&self.client, options);

        for (index, content) in contents.iter().enumerate() {
            tracing::info!(
                "[{}/{}] Crawling comments of {} {} ({})",
                index + 1,
                contents.len(),
                content.content_type,
                content.content_id,
                content.title
            );

            match crawler.fetch_all_comments(content, Some(&mut sink)).await {
                Ok(roots) => report.root_comments += roots.len(),
                Err(e) if e.is_forbidden() => {
                    tracing::error!(
                        "Session rejected while crawling {}: {}",
                        content.content_id,
                        e
                    );
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!("Failed to crawl comments of {}: {}", content.content_id, e);
                    report.failed_contents += 1;
                }
            }
        }

        report.comments_written = sink.written();
        tracing::info!(
            "Crawl finished: {} contents, {} root comments, {} comments written, {} failed",
            report.contents,
            report.root_comments,
            report.comments_written,
            report.failed_contents
        );
        Ok(report)
    }

    /// Searches every configured keyword, deduplicating results
    async fn search_all(&self) -> Result<Vec<Content>> {
        let search = &self.config.search;
        let delay = Duration::from_millis(self.config.crawler.crawl_interval_ms);
        let mut seen: HashSet<(ContentType, String)> = HashSet::new();
        let mut contents = Vec::new();
        let mut first_request = true;

        for keyword in &search.keywords {
            for page in 1..=search.pages {
                if !first_request {
                    tokio::time::sleep(delay).await;
                }
                first_request = false;

                let mut request = SearchRequest::new(keyword.clone())
                    .page(page)
                    .page_size(search.page_size);
                request.sort = search.sort;
                request.time = search.time;
                request.result_type = search.result_type;

                let found = match self.client.search_by_keyword(&request).await {
                    Ok(found) => found,
                    Err(e) if e.is_forbidden() => return Err(e),
                    Err(e) => {
                        tracing::error!("Search '{}' page {} failed: {}", keyword, page, e);
                        break;
                    }
                };

                if found.is_empty() {
                    break;
                }

                for content in found {
                    if seen.insert((content.content_type, content.content_id.clone())) {
                        contents.push(content);
                    }
                }
            }
        }

        tracing::info!("Search found {} distinct contents", contents.len());
        Ok(contents)
    }
}
