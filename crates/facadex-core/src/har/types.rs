use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Top-level HAR object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Har {
    pub log: Log,
}

/// Main HAR log object.
///
/// Only the parts of the HAR 1.2 format needed to summarize resource timing
/// are modelled; everything else in the file is ignored while parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Log {
    pub version: String,
    pub creator: Creator,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<Page>>,
    pub entries: Vec<Entry>,
}

/// Creator/Browser information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creator {
    pub name: String,
    pub version: String,
}

/// Page information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    #[serde(rename = "startedDateTime")]
    pub started_date_time: String,
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// Individual HTTP transaction entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "pageref", skip_serializing_if = "Option::is_none")]
    pub page_ref: Option<String>,
    #[serde(rename = "startedDateTime")]
    pub started_date_time: String,
    /// Total elapsed time of the request in milliseconds
    pub time: f64,
    pub request: Request,
    pub response: Response,
}

impl Entry {
    /// Parsed `startedDateTime`, or `None` if it is not RFC 3339
    pub fn started_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.started_date_time).ok()
    }

    /// Bytes transferred over the network for this entry.
    ///
    /// Prefers Chrome's `_transferSize` extension and falls back to
    /// `headersSize + bodySize`. HAR uses `-1` for unknown sizes, which
    /// count as zero.
    pub fn transfer_size(&self) -> u64 {
        if let Some(size) = self.response.transfer_size
            && size >= 0
        {
            return size as u64;
        }
        self.response.headers_size.max(0) as u64 + self.response.body_size.max(0) as u64
    }

    /// Whether the response looks like an HTML document
    pub fn is_html_document(&self) -> bool {
        self.response
            .content
            .mime_type
            .parse::<mime::Mime>()
            .map(|m| m.type_() == mime::TEXT && m.subtype() == mime::HTML)
            .unwrap_or(false)
    }
}

/// HTTP request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    pub url: String,
}

/// HTTP response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub status: i64,
    pub content: Content,
    #[serde(rename = "headersSize", default = "unknown_size")]
    pub headers_size: i64,
    #[serde(rename = "bodySize", default = "unknown_size")]
    pub body_size: i64,
    /// Chrome DevTools extension: bytes on the wire including headers
    #[serde(rename = "_transferSize", skip_serializing_if = "Option::is_none")]
    pub transfer_size: Option<i64>,
}

/// Response content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub size: i64,
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
}

fn unknown_size() -> i64 {
    -1
}
