//! Keyword search parameters

use serde::Deserialize;

/// Result ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchSort {
    #[default]
    Default,
    Upvoted,
    Latest,
}

impl SearchSort {
    pub fn as_param(&self) -> &'static str {
        match self {
            SearchSort::Default => "",
            SearchSort::Upvoted => "upvoted_count",
            SearchSort::Latest => "created_time",
        }
    }
}

/// Publication time window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchTime {
    #[default]
    Default,
    OneDay,
    OneWeek,
    OneMonth,
    ThreeMonths,
    HalfYear,
    OneYear,
}

impl SearchTime {
    pub fn as_param(&self) -> &'static str {
        match self {
            SearchTime::Default => "",
            SearchTime::OneDay => "a_day",
            SearchTime::OneWeek => "a_week",
            SearchTime::OneMonth => "a_month",
            SearchTime::ThreeMonths => "three_months",
            SearchTime::HalfYear => "half_a_year",
            SearchTime::OneYear => "a_year",
        }
    }
}

/// Kind of result to search for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchType {
    #[default]
    Default,
    Answer,
    Article,
    Video,
}

impl SearchType {
    pub fn as_param(&self) -> &'static str {
        match self {
            SearchType::Default => "",
            SearchType::Answer => "answer",
            SearchType::Article => "article",
            SearchType::Video => "zvideo",
        }
    }
}

/// One page of a keyword search
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub keyword: String,

    /// Page number, starting at 1
    pub page: u32,
    pub page_size: u32,
    pub sort: SearchSort,
    pub time: SearchTime,
    pub result_type: SearchType,
}

impl SearchRequest {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            page: 1,
            page_size: 20,
            sort: SearchSort::Default,
            time: SearchTime::Default,
            result_type: SearchType::Default,
        }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Index of the first result on this page
    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1) * self.page_size
    }

    /// Query parameters in the order the web client sends them
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let offset = self.offset().to_string();
        vec![
            ("gk_version", "gz-gaokao".to_string()),
            ("t", "general".to_string()),
            ("q", self.keyword.clone()),
            ("correction", "1".to_string()),
            ("offset", offset.clone()),
            ("limit", self.page_size.to_string()),
            ("filter_fields", String::new()),
            ("lc_idx", offset),
            ("show_all_topics", "0".to_string()),
            ("search_source", "Filter".to_string()),
            ("time_interval", self.time.as_param().to_string()),
            ("sort", self.sort.as_param().to_string()),
            ("vertical", self.result_type.as_param().to_string()),
        ]
    }
}
