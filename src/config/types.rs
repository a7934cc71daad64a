use crate::client::{SearchSort, SearchTime, SearchType};
use serde::Deserialize;

/// Main configuration structure for Zhihu-Comments
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub search: SearchConfig,
    pub session: SessionConfig,
    pub signer: SignerConfig,
    pub output: OutputConfig,
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Optional proxy URL applied to every request
    #[serde(default)]
    pub proxy: Option<String>,

    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Total attempts per request, including the first one
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed wait between attempts (milliseconds)
    #[serde(rename = "retry-wait-ms", default = "default_retry_wait_ms")]
    pub retry_wait_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            proxy: None,
            user_agent: default_user_agent(),
            max_attempts: default_max_attempts(),
            retry_wait_ms: default_retry_wait_ms(),
        }
    }
}

/// Comment traversal configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Whether replies under root comments are fetched at all
    #[serde(rename = "enable-sub-comments", default = "default_true")]
    pub enable_sub_comments: bool,

    /// Delay between consecutive page fetches of one walk (milliseconds)
    #[serde(rename = "crawl-interval-ms", default = "default_crawl_interval_ms")]
    pub crawl_interval_ms: u64,

    /// Page size for root and child comment pages
    #[serde(rename = "comment-page-size", default = "default_comment_page_size")]
    pub comment_page_size: u32,

    /// Hard cap on pages fetched by a single walk
    #[serde(rename = "max-pages-per-walk", default)]
    pub max_pages_per_walk: Option<u32>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            enable_sub_comments: true,
            crawl_interval_ms: default_crawl_interval_ms(),
            comment_page_size: default_comment_page_size(),
            max_pages_per_walk: None,
        }
    }
}

/// Keyword search configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Keywords to search, in order
    pub keywords: Vec<String>,

    /// Number of result pages fetched per keyword
    #[serde(default = "default_search_pages")]
    pub pages: u32,

    /// Results per search page
    #[serde(rename = "page-size", default = "default_search_page_size")]
    pub page_size: u32,

    #[serde(default)]
    pub sort: SearchSort,

    #[serde(default)]
    pub time: SearchTime,

    #[serde(rename = "result-type", default)]
    pub result_type: SearchType,
}

/// Where the externally acquired session cookies live
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// JSON cookie export or raw cookie header file
    #[serde(rename = "cookies-path")]
    pub cookies_path: String,
}

/// External request signer
#[derive(Debug, Clone, Deserialize)]
pub struct SignerConfig {
    /// Program and leading arguments; the path and cookie are appended
    pub command: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// JSON-lines file receiving search results
    #[serde(rename = "contents-path")]
    pub contents_path: String,

    /// JSON-lines file receiving every fetched comment
    #[serde(rename = "comments-path")]
    pub comments_path: String,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_wait_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_crawl_interval_ms() -> u64 {
    1000
}

fn default_comment_page_size() -> u32 {
    10
}

fn default_search_pages() -> u32 {
    1
}

fn default_search_page_size() -> u32 {
    20
}
