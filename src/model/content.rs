use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of post a comment tree hangs off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Answer,
    Article,
    Zvideo,
}

impl ContentType {
    /// The platform's name for this type, as used in API paths
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Answer => "answer",
            ContentType::Article => "article",
            ContentType::Zvideo => "zvideo",
        }
    }

    /// Parses the platform's type name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "answer" => Some(ContentType::Answer),
            "article" => Some(ContentType::Article),
            "zvideo" => Some(ContentType::Zvideo),
            _ => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A crawled post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub content_id: String,
    pub content_type: ContentType,

    /// Question id, present for answers only
    pub question_id: Option<String>,

    pub title: String,
    pub desc: String,
    pub content_url: String,
    pub author_name: String,
    pub voteup_count: u64,
    pub comment_count: u64,
    pub created_time: Option<DateTime<Utc>>,

    /// Keyword the post was found with
    pub source_keyword: String,
}

impl Content {
    /// Creates a content reference with only the fields comment fetching needs
    pub fn new(content_id: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            content_id: content_id.into(),
            content_type,
            question_id: None,
            title: String::new(),
            desc: String::new(),
            content_url: String::new(),
            author_name: String::new(),
            voteup_count: 0,
            comment_count: 0,
            created_time: None,
            source_keyword: String::new(),
        }
    }
}
