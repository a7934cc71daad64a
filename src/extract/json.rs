use crate::client::ZHIHU_URL;
use crate::extract::Extractor;
use crate::model::{Comment, Content, ContentType};
use chrono::{DateTime, Utc};
use serde_json::Value;
use url::Url;

/// Extractor for the platform's v4/v5 JSON shapes
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExtractor;

impl JsonExtractor {
    pub fn new() -> Self {
        Self
    }

    fn content_from_object(&self, object: &Value) -> Option<Content> {
        let content_type = ContentType::parse(object.get("type")?.as_str()?)?;
        let content_id = id_string(object.get("id"))?;
        let mut content = Content::new(content_id, content_type);

        let question = object.get("question");
        content.question_id = id_string(question.and_then(|q| q.get("id")));

        let title = match content_type {
            ContentType::Answer => question.and_then(|q| q.get("name")),
            ContentType::Article | ContentType::Zvideo => object.get("title"),
        };
        content.title = strip_highlight(title.and_then(Value::as_str).unwrap_or_default());
        content.desc = strip_highlight(
            object
                .get("excerpt")
                .or_else(|| object.get("description"))
                .and_then(Value::as_str)
                .unwrap_or_default(),
        );
        content.author_name = object
            .get("author")
            .and_then(|a| a.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        content.voteup_count = count(object.get("voteup_count"));
        content.comment_count = count(object.get("comment_count"));
        content.created_time = timestamp(object.get("created_time"));
        content.content_url = content_url(&content);

        Some(content)
    }

    fn comment_from_object(&self, content: &Content, object: &Value) -> Option<Comment> {
        let comment_id = id_string(object.get("id"))?;

        let parent_comment_id = id_string(object.get("reply_root_comment_id"))
            .filter(|id| id != "0" && *id != comment_id);

        let ip_location = object
            .get("comment_tag")
            .and_then(Value::as_array)
            .and_then(|tags| {
                tags.iter()
                    .find(|t| t.get("type").and_then(Value::as_str) == Some("ip_info"))
            })
            .and_then(|t| t.get("text"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Some(Comment {
            comment_id,
            parent_comment_id,
            content_id: content.content_id.clone(),
            content_type: content.content_type,
            content: object
                .get("content")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            publish_time: timestamp(object.get("created_time")),
            ip_location,
            like_count: count(object.get("like_count").or_else(|| object.get("vote_count"))),
            dislike_count: count(object.get("dislike_count")),
            sub_comment_count: count(object.get("child_comment_count")),
            author_name: object
                .get("author")
                .and_then(|a| a.get("name"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            page_offset: String::new(),
        })
    }
}

impl Extractor for JsonExtractor {
    fn extract_contents(&self, search_payload: &Value) -> Vec<Content> {
        let Some(items) = search_payload.get("data").and_then(Value::as_array) else {
            return Vec::new();
        };

        items
            .iter()
            .filter(|item| item.get("type").and_then(Value::as_str) == Some("search_result"))
            .filter_map(|item| item.get("object"))
            .filter_map(|object| self.content_from_object(object))
            .collect()
    }

    fn extract_comments(&self, content: &Content, data: Option<&Value>) -> Vec<Comment> {
        let Some(items) = data.and_then(Value::as_array) else {
            return Vec::new();
        };

        items
            .iter()
            .filter_map(|object| self.comment_from_object(content, object))
            .collect()
    }

    fn extract_offset(&self, paging: &Value) -> String {
        let Some(next) = paging.get("next").and_then(Value::as_str) else {
            return String::new();
        };

        let parsed =
            Url::parse(next).or_else(|_| Url::parse(ZHIHU_URL).and_then(|base| base.join(next)));
        match parsed {
            Ok(url) => url
                .query_pairs()
                .find(|(k, _)| k == "offset")
                .map(|(_, v)| v.into_owned())
                .unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Unparsable paging.next '{}': {}", next, e);
                String::new()
            }
        }
    }
}

/// Ids arrive as strings or numbers depending on the endpoint
fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn count(value: Option<&Value>) -> u64 {
    value.and_then(Value::as_u64).unwrap_or(0)
}

fn timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(value?.as_i64()?, 0)
}

/// Search highlights wrap matches in `<em>` tags
fn strip_highlight(text: &str) -> String {
    text.replace("<em>", "").replace("</em>", "")
}

fn content_url(content: &Content) -> String {
    match content.content_type {
        ContentType::Answer => match &content.question_id {
            Some(question_id) => format!(
                "{}/question/{}/answer/{}",
                ZHIHU_URL, question_id, content.content_id
            ),
            None => format!("{}/answer/{}", ZHIHU_URL, content.content_id),
        },
        ContentType::Article => format!("https://zhuanlan.zhihu.com/p/{}", content.content_id),
        ContentType::Zvideo => format!("{}/zvideo/{}", ZHIHU_URL, content.content_id),
    }
}
