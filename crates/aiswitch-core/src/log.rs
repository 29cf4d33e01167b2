//! Request log types served by the logging API

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Log entry id. The backend sends integers; older payloads used strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LogId(String);

impl LogId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl<'de> Deserialize<'de> for LogId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => LogId(n.to_string()),
            RawId::Text(s) => LogId(s),
        })
    }
}

/// One row of the log table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogOverview {
    pub id: LogId,
    pub provider_id: String,
    #[serde(default)]
    pub model: String,
    /// Chat completion when true, text completion otherwise
    #[serde(default)]
    pub chat: bool,
    #[serde(default, alias = "request_tokens")]
    pub prompt_tokens: Option<u64>,
    #[serde(default, alias = "response_tokens")]
    pub completion_tokens: Option<u64>,
    #[serde(default)]
    pub request_time: String,
    /// Empty while the response is pending
    #[serde(default)]
    pub response_time: String,
    /// Completion tokens per second
    #[serde(default)]
    pub speed: Option<i64>,
}

impl LogOverview {
    pub fn kind(&self) -> &'static str {
        if self.chat { "chat" } else { "completion" }
    }

    /// Time between request and response, when both timestamps parse
    pub fn latency(&self) -> Option<TimeDelta> {
        let request = parse_timestamp(&self.request_time)?;
        let response = parse_timestamp(&self.response_time)?;
        Some(response - request)
    }
}

/// Parse a log timestamp: SQLite `CURRENT_TIMESTAMP` text or RFC 3339
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if value.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

/// One page of log rows plus the total row count
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogPage {
    #[serde(default)]
    pub logs: Vec<LogOverview>,
    #[serde(rename = "rowCount", default)]
    pub row_count: u64,
}

impl LogPage {
    /// Number of pages of `size` rows
    pub fn page_count(&self, size: u32) -> u64 {
        if size == 0 {
            return 0;
        }
        self.row_count.div_ceil(u64::from(size))
    }
}

/// Columns the backend accepts for sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogColumn {
    Timestamp,
    ProviderId,
    PromptTokens,
    CompletionTokens,
    RequestTime,
    ResponseTime,
    Chat,
    Model,
    Speed,
}

impl LogColumn {
    pub const ALL: [LogColumn; 9] = [
        LogColumn::Timestamp,
        LogColumn::ProviderId,
        LogColumn::PromptTokens,
        LogColumn::CompletionTokens,
        LogColumn::RequestTime,
        LogColumn::ResponseTime,
        LogColumn::Chat,
        LogColumn::Model,
        LogColumn::Speed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogColumn::Timestamp => "timestamp",
            LogColumn::ProviderId => "provider_id",
            LogColumn::PromptTokens => "prompt_tokens",
            LogColumn::CompletionTokens => "completion_tokens",
            LogColumn::RequestTime => "request_time",
            LogColumn::ResponseTime => "response_time",
            LogColumn::Chat => "chat",
            LogColumn::Model => "model",
            LogColumn::Speed => "speed",
        }
    }
}

impl fmt::Display for LogColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogColumn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        LogColumn::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::UnknownSortColumn(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSort {
    pub column: LogColumn,
    pub descending: bool,
}

impl LogSort {
    /// `column,asc` or `column,desc`
    pub fn to_param(&self) -> String {
        format!(
            "{},{}",
            self.column,
            if self.descending { "desc" } else { "asc" }
        )
    }
}

/// Parameters of a paged log listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    /// Zero-based page index
    pub page: u32,
    pub size: u32,
    /// Backend default ordering (newest first) when absent
    pub sort: Option<LogSort>,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: 50,
            sort: None,
        }
    }
}

impl LogQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("page", self.page.to_string()), ("size", self.size.to_string())];
        if let Some(sort) = &self.sort {
            params.push(("sort", sort.to_param()));
        }
        params
    }
}

/// A full persisted exchange: overview fields plus raw request and response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(flatten)]
    pub overview: LogOverview,

    pub request: serde_json::Value,

    /// Absent while pending or when the upstream call failed
    #[serde(default)]
    pub response: Option<serde_json::Value>,
}
