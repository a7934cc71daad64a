use crate::model::ContentType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single comment, root or reply
///
/// Root comments have no `parent_comment_id`; replies carry the id of the
/// root comment they were fetched under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: String,
    pub parent_comment_id: Option<String>,
    pub content_id: String,
    pub content_type: ContentType,
    pub content: String,
    pub publish_time: Option<DateTime<Utc>>,
    pub ip_location: Option<String>,
    pub like_count: u64,
    pub dislike_count: u64,

    /// Number of replies; zero means no child-comment walk is needed
    pub sub_comment_count: u64,

    pub author_name: String,

    /// Cursor the platform returned with the page this comment came from
    ///
    /// Requesting that cursor continues the listing after this comment's
    /// page, so a persisted comment is enough to resume an interrupted walk.
    #[serde(default)]
    pub page_offset: String,
}

impl Comment {
    /// Whether this comment has replies worth walking
    pub fn has_replies(&self) -> bool {
        self.sub_comment_count > 0
    }
}
