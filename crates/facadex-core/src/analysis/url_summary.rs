use super::{Analyzer, UrlSummaries, UrlSummary};
use crate::Result;
use crate::har::Har;
use crate::tasks::MainThreadTask;

/// Main-thread time beyond this counts as blocking
pub const BLOCKING_THRESHOLD_MS: f64 = 50.0;

/// Builds one [`UrlSummary`] per requested URL.
///
/// Network timing comes from the HAR entries; blocking time comes from the
/// main-thread tasks attributed to each URL.
pub struct UrlSummaryAnalyzer<'a> {
    tasks: &'a [MainThreadTask],
    cpu_multiplier: f64,
}

impl<'a> UrlSummaryAnalyzer<'a> {
    pub fn new(tasks: &'a [MainThreadTask]) -> Self {
        Self {
            tasks,
            cpu_multiplier: 1.0,
        }
    }

    /// Scale task durations, e.g. to undo CPU throttling applied during capture
    pub fn with_cpu_multiplier(mut self, cpu_multiplier: f64) -> Self {
        self.cpu_multiplier = cpu_multiplier;
        self
    }
}

impl Default for UrlSummaryAnalyzer<'_> {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl Analyzer for UrlSummaryAnalyzer<'_> {
    type Output = UrlSummaries;

    fn analyze(&self, har: &Har) -> Result<Self::Output> {
        tracing::debug!("Summarizing per-URL timing for {} entries", har.log.entries.len());

        let mut summaries = UrlSummaries::new();

        let origin = match har.log.entries.iter().filter_map(|e| e.started_at()).min() {
            Some(origin) => origin,
            None => {
                tracing::warn!("No entry has a valid startedDateTime");
                return Ok(summaries);
            }
        };

        for entry in &har.log.entries {
            let url = &entry.request.url;
            if url.starts_with("data:") {
                continue;
            }

            let Some(started_at) = entry.started_at() else {
                tracing::warn!(
                    "Skipping {} with invalid startedDateTime '{}'",
                    url,
                    entry.started_date_time
                );
                continue;
            };

            let start = (started_at - origin).num_microseconds().unwrap_or(0) as f64 / 1000.0;
            let end = start + entry.time.max(0.0);

            let summary = summaries.entry(url.clone()).or_insert_with(|| UrlSummary {
                url: url.clone(),
                first_start_time: f64::INFINITY,
                first_end_time: f64::INFINITY,
                transfer_size: 0,
                blocking_time: 0.0,
            });
            summary.transfer_size += entry.transfer_size();
            summary.first_start_time = summary.first_start_time.min(start);
            summary.first_end_time = summary.first_end_time.min(end);
        }

        let mut unmatched_tasks = 0usize;
        for task in self.tasks.iter().filter(|t| !t.nested) {
            let Some(url) = &task.url else {
                continue;
            };
            match summaries.get_mut(url) {
                Some(summary) => {
                    let duration = task.duration * self.cpu_multiplier;
                    summary.blocking_time += (duration - BLOCKING_THRESHOLD_MS).max(0.0);
                }
                None => unmatched_tasks += 1,
            }
        }
        if unmatched_tasks > 0 {
            tracing::warn!(
                "{} main-thread tasks reference URLs missing from the HAR",
                unmatched_tasks
            );
        }

        tracing::info!("Summarized timing for {} URLs", summaries.len());

        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::har::HarReader;

    fn sample_har() -> Har {
        HarReader::from_str(
            r#"{
            "log": {
                "version": "1.2",
                "creator": {"name": "test", "version": "1.0"},
                "entries": [
                    {
                        "startedDateTime": "2024-03-01T10:00:00.000Z",
                        "time": 80,
                        "request": {"method": "GET", "url": "https://www.example.com/"},
                        "response": {"status": 200, "content": {"mimeType": "text/html"}, "headersSize": 200, "bodySize": 5000}
                    },
                    {
                        "startedDateTime": "2024-03-01T10:00:00.100Z",
                        "time": 50,
                        "request": {"method": "GET", "url": "https://www.youtube.com/iframe_api"},
                        "response": {"status": 200, "content": {"mimeType": "text/javascript"}, "_transferSize": 1000}
                    },
                    {
                        "startedDateTime": "2024-03-01T10:00:00.400Z",
                        "time": 10,
                        "request": {"method": "GET", "url": "https://www.youtube.com/iframe_api"},
                        "response": {"status": 200, "content": {"mimeType": "text/javascript"}, "_transferSize": 300}
                    },
                    {
                        "startedDateTime": "2024-03-01T10:00:00.200Z",
                        "time": 5,
                        "request": {"method": "GET", "url": "data:image/gif;base64,R0lGOD"},
                        "response": {"status": 200, "content": {"mimeType": "image/gif"}}
                    }
                ]
            }
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_network_timing_is_relative_to_first_request() {
        let har = sample_har();
        let summaries = UrlSummaryAnalyzer::default().analyze(&har).unwrap();

        assert_eq!(summaries.len(), 2);

        let document = &summaries["https://www.example.com/"];
        assert_eq!(document.first_start_time, 0.0);
        assert_eq!(document.first_end_time, 80.0);
        assert_eq!(document.transfer_size, 5200);

        let api = &summaries["https://www.youtube.com/iframe_api"];
        assert_eq!(api.first_start_time, 100.0);
        assert_eq!(api.first_end_time, 150.0);
        assert_eq!(api.transfer_size, 1300);
    }

    #[test]
    fn test_blocking_time_counts_only_long_top_level_tasks() {
        let har = sample_har();
        let tasks = vec![
            MainThreadTask {
                url: Some("https://www.youtube.com/iframe_api".to_string()),
                duration: 120.0,
                nested: false,
            },
            MainThreadTask {
                url: Some("https://www.youtube.com/iframe_api".to_string()),
                duration: 30.0,
                nested: false,
            },
            MainThreadTask {
                url: Some("https://www.youtube.com/iframe_api".to_string()),
                duration: 500.0,
                nested: true,
            },
            MainThreadTask {
                url: None,
                duration: 400.0,
                nested: false,
            },
        ];

        let summaries = UrlSummaryAnalyzer::new(&tasks).analyze(&har).unwrap();
        assert_eq!(summaries["https://www.youtube.com/iframe_api"].blocking_time, 70.0);
        assert_eq!(summaries["https://www.example.com/"].blocking_time, 0.0);
    }

    #[test]
    fn test_cpu_multiplier_scales_task_duration() {
        let har = sample_har();
        let tasks = vec![MainThreadTask {
            url: Some("https://www.youtube.com/iframe_api".to_string()),
            duration: 40.0,
            nested: false,
        }];

        let summaries = UrlSummaryAnalyzer::new(&tasks)
            .with_cpu_multiplier(2.0)
            .analyze(&har)
            .unwrap();
        assert_eq!(summaries["https://www.youtube.com/iframe_api"].blocking_time, 30.0);
    }

    #[test]
    fn test_empty_har_yields_no_summaries() {
        let har = HarReader::from_str(
            r#"{"log": {"version": "1.2", "creator": {"name": "t", "version": "1"}, "entries": []}}"#,
        )
        .unwrap();

        let summaries = UrlSummaryAnalyzer::default().analyze(&har).unwrap();
        assert!(summaries.is_empty());
    }
}
