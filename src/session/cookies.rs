use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single browser cookie
///
/// Deserializes from browser automation exports, which carry extra fields
/// (domain, path, expiry...) that are ignored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Parses a raw `Cookie:` header value such as `a=1; b=2`
///
/// Pairs without `=` are skipped. Values keep any embedded `=`.
pub fn parse_cookie_header(header: &str) -> Vec<Cookie> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(Cookie::new(name, value.trim()))
        })
        .collect()
}

/// Loads cookies from a file
///
/// The file may hold either a JSON array of cookie objects or a raw cookie
/// header string copied from a browser.
pub fn load_cookies(path: &Path) -> Result<Vec<Cookie>> {
    let content = std::fs::read_to_string(path)?;
    let trimmed = content.trim();

    if trimmed.starts_with('[') {
        Ok(serde_json::from_str(trimmed)?)
    } else {
        Ok(parse_cookie_header(trimmed))
    }
}
