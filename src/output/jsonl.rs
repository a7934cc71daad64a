use crate::crawler::CommentSink;
use crate::model::{Comment, Content};
use crate::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Comment sink writing one JSON object per line
///
/// Flushes after every page so a crash loses at most the page in flight.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
    written: u64,
}

impl JsonLinesSink<BufWriter<File>> {
    /// Opens `path` for appending, creating it if needed
    pub fn append_to(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of comments written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: Write + Send> CommentSink for JsonLinesSink<W> {
    async fn on_page(&mut self, comments: &[Comment]) -> anyhow::Result<()> {
        write_lines(&mut self.writer, comments)?;
        self.writer.flush()?;
        self.written += comments.len() as u64;
        Ok(())
    }
}

/// Appends search results to a JSON-lines file
pub fn write_contents(path: &Path, contents: &[Content]) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    write_lines(&mut writer, contents)?;
    writer.flush()?;
    Ok(())
}

fn write_lines<W: Write, T: Serialize>(writer: &mut W, items: &[T]) -> Result<()> {
    for item in items {
        serde_json::to_writer(&mut *writer, item)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}
