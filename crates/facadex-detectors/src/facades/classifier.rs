use crate::entities::{Entity, Product, ThirdPartyClassifier};
use facadex_core::analysis::{UrlSummaries, UrlSummary};
use std::collections::{BTreeMap, HashSet};

/// Facade opportunity for one (entity, product) pair
#[derive(Debug, Clone)]
pub struct ProductSummary<'a> {
    pub entity: &'a Entity,
    pub product: &'a Product,
    /// Earliest end time among the product's own URLs
    pub cutoff_time: f64,
    urls: Vec<&'a UrlSummary>,
    seen: HashSet<&'a str>,
}

impl<'a> ProductSummary<'a> {
    fn new(entity: &'a Entity, product: &'a Product) -> Self {
        Self {
            entity,
            product,
            cutoff_time: f64::INFINITY,
            urls: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Insert a URL once; later inserts of the same URL are ignored
    fn insert(&mut self, summary: &'a UrlSummary) {
        if self.seen.insert(summary.url.as_str()) {
            self.urls.push(summary);
        }
    }

    /// Attributed URLs in insertion order
    pub fn urls(&self) -> &[&'a UrlSummary] {
        &self.urls
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }
}

type ProductKey = (String, String);

/// Group third-party URLs under the facadable products they belong to.
///
/// URLs of a facadable product seed its summary and set its cutoff time.
/// Other URLs from the same entity that start at or after the cutoff are
/// treated as loaded by that product and attributed to it as well. URLs of
/// `main_entity` are never considered.
///
/// The result is ordered by (entity, product) name and does not depend on
/// the iteration order of `summaries`.
pub fn classify<'a, C>(
    classifier: &'a C,
    summaries: &'a UrlSummaries,
    main_entity: Option<&Entity>,
) -> Vec<ProductSummary<'a>>
where
    C: ThirdPartyClassifier + ?Sized,
{
    tracing::debug!("Classifying {} URLs for facade opportunities", summaries.len());

    let mut by_product: BTreeMap<ProductKey, ProductSummary<'a>> = BTreeMap::new();

    let third_party = move |url: &str| -> Option<&'a Entity> {
        let entity = classifier.resolve_entity(url)?;
        if classifier.is_first_party(url, main_entity) {
            return None;
        }
        Some(entity)
    };

    // Seed summaries from URLs that belong to a facadable product
    for (url, summary) in summaries {
        let Some(entity) = third_party(url.as_str()) else {
            continue;
        };
        let Some(product) = classifier.resolve_product(url).filter(|p| p.has_facade()) else {
            continue;
        };

        let product_summary = by_product
            .entry((entity.name.clone(), product.name.clone()))
            .or_insert_with(|| ProductSummary::new(entity, product));
        product_summary.insert(summary);
        product_summary.cutoff_time = product_summary.cutoff_time.min(summary.first_end_time);
    }

    // Attribute the entity's remaining URLs once every cutoff is final
    for (url, summary) in summaries {
        let Some(entity) = third_party(url.as_str()) else {
            continue;
        };
        if classifier
            .resolve_product(url)
            .is_some_and(|p| p.has_facade())
        {
            continue;
        }

        for product_summary in by_product
            .values_mut()
            .filter(|s| s.entity.is_same(entity))
        {
            if summary.first_start_time >= product_summary.cutoff_time {
                product_summary.insert(summary);
            }
        }
    }

    tracing::debug!("Found {} facadable products", by_product.len());

    by_product.into_values().collect()
}
