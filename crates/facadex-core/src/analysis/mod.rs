mod main_resource;
mod url_summary;

pub use main_resource::MainResourceAnalyzer;
pub use url_summary::{BLOCKING_THRESHOLD_MS, UrlSummaryAnalyzer};

use crate::har::Har;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Observed timing and size for one URL over the page load.
///
/// Times are milliseconds relative to the first request in the HAR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlSummary {
    pub url: String,
    pub first_start_time: f64,
    pub first_end_time: f64,
    pub transfer_size: u64,
    pub blocking_time: f64,
}

/// Per-URL summaries keyed by URL
pub type UrlSummaries = BTreeMap<String, UrlSummary>;

pub trait Analyzer {
    type Output;

    fn analyze(&self, har: &Har) -> crate::Result<Self::Output>;
}
