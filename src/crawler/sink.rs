//! Push interface for incrementally delivered comments

use crate::model::Comment;
use async_trait::async_trait;

/// Receives every fetched page of comments, root and child alike
///
/// Called once per page, before the page is merged into the walk's result.
/// An error returned here aborts the walk; sinks that want to keep going on
/// failure must handle it themselves.
#[async_trait]
pub trait CommentSink: Send {
    async fn on_page(&mut self, comments: &[Comment]) -> anyhow::Result<()>;
}

/// Collects every delivered page in memory
#[derive(Debug, Default)]
pub struct VecSink {
    pub pages: Vec<Vec<Comment>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All delivered comments, in delivery order
    pub fn comments(&self) -> impl Iterator<Item = &Comment> {
        self.pages.iter().flatten()
    }
}

#[async_trait]
impl CommentSink for VecSink {
    async fn on_page(&mut self, comments: &[Comment]) -> anyhow::Result<()> {
        self.pages.push(comments.to_vec());
        Ok(())
    }
}
