use super::Analyzer;
use crate::Result;
use crate::har::Har;

/// Finds the URL of the page's main document.
///
/// The main document is the first HTML response in the HAR (by start time),
/// falling back to the earliest entry when nothing looks like HTML. An
/// explicit override always wins.
#[derive(Default)]
pub struct MainResourceAnalyzer {
    override_url: Option<String>,
}

impl MainResourceAnalyzer {
    pub fn new(override_url: Option<String>) -> Self {
        Self { override_url }
    }
}

impl Analyzer for MainResourceAnalyzer {
    type Output = Option<String>;

    fn analyze(&self, har: &Har) -> Result<Self::Output> {
        if let Some(url) = &self.override_url {
            tracing::debug!("Using main resource override: {}", url);
            return Ok(Some(url.clone()));
        }

        let mut entries: Vec<_> = har
            .log
            .entries
            .iter()
            .filter(|e| !e.request.url.starts_with("data:"))
            .collect();
        // Unparseable timestamps go last; stable sort keeps file order for ties
        entries.sort_by_key(|e| {
            let started_at = e.started_at();
            (started_at.is_none(), started_at)
        });

        let main = entries
            .iter()
            .find(|e| e.is_html_document())
            .or_else(|| entries.first())
            .map(|e| e.request.url.clone());

        match &main {
            Some(url) => tracing::info!("Main resource: {}", url),
            None => tracing::warn!("Could not determine the main resource"),
        }

        Ok(main)
    }
}
