use super::classifier::ProductSummary;
use crate::entities::{Facade, Product};
use facadex_core::analysis::UrlSummary;
use serde::{Deserialize, Serialize};

/// Primary product categories that get a suffix in the row label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelCategory {
    Video,
    CustomerSuccess,
}

impl LabelCategory {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "video" => Some(LabelCategory::Video),
            "customer-success" => Some(LabelCategory::CustomerSuccess),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LabelCategory::Video => "Video",
            LabelCategory::CustomerSuccess => "Customer Success",
        }
    }

    pub fn label(&self, product_name: &str) -> String {
        format!("{} ({})", product_name, self.as_str())
    }
}

/// Display name for a product, suffixed with its primary category if known
pub fn product_label(product: &Product) -> String {
    match product.primary_category().and_then(LabelCategory::from_tag) {
        Some(category) => category.label(&product.name),
        None => product.name.clone(),
    }
}

/// One facadable product and the resources it pulls in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacadeRow {
    pub product: String,
    pub entity: String,
    pub facades: Vec<Facade>,
    pub transfer_size: u64,
    pub blocking_time: f64,
    /// Largest transfer first
    pub sub_rows: Vec<UrlSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacadeReport {
    /// 1.0 when there is nothing to defer, 0.0 otherwise
    pub score: f64,
    pub not_applicable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_value: Option<String>,
    pub wasted_bytes: u64,
    pub wasted_ms: f64,
    pub rows: Vec<FacadeRow>,
}

impl FacadeReport {
    fn not_applicable() -> Self {
        Self {
            score: 1.0,
            not_applicable: true,
            display_value: None,
            wasted_bytes: 0,
            wasted_ms: 0.0,
            rows: vec![],
        }
    }

    pub fn opportunity_count(&self) -> usize {
        self.rows.len()
    }
}

/// Turn product summaries into the scored facade report
pub fn build_report(summaries: &[ProductSummary<'_>]) -> FacadeReport {
    if summaries.is_empty() {
        tracing::info!("No facade opportunities found");
        return FacadeReport::not_applicable();
    }

    let mut wasted_bytes = 0u64;
    let mut wasted_ms = 0.0f64;

    let mut rows: Vec<FacadeRow> = summaries
        .iter()
        .map(|summary| {
            let mut sub_rows: Vec<UrlSummary> =
                summary.urls().iter().map(|s| (*s).clone()).collect();
            sub_rows.sort_by(|a, b| b.transfer_size.cmp(&a.transfer_size));

            let transfer_size: u64 = sub_rows.iter().map(|s| s.transfer_size).sum();
            let blocking_time: f64 = sub_rows.iter().map(|s| s.blocking_time).sum();
            wasted_bytes += transfer_size;
            wasted_ms += blocking_time;

            FacadeRow {
                product: product_label(summary.product),
                entity: summary.entity.name.clone(),
                facades: summary.product.facades.clone(),
                transfer_size,
                blocking_time,
                sub_rows,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.transfer_size.cmp(&a.transfer_size));

    let display_value = match rows.len() {
        1 => "1 facade alternative available".to_string(),
        n => format!("{} facade alternatives available", n),
    };

    tracing::info!(
        "Facade report complete: {} products, {} bytes, {:.0} ms",
        rows.len(),
        wasted_bytes,
        wasted_ms
    );

    FacadeReport {
        score: 0.0,
        not_applicable: false,
        display_value: Some(display_value),
        wasted_bytes,
        wasted_ms,
        rows,
    }
}
