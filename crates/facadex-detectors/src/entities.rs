//! Third-party knowledge base: which organization owns a URL, which of its
//! products the URL belongs to, and whether that product has a facade.

use crate::{Error, Result};
use facadex_core::host::{HostPattern, host_of};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const BUNDLED_ENTITIES: &str = include_str!("../data/entities.json");

/// Prefix marking a product URL pattern as a regular expression
const REGEXP_PREFIX: &str = "REGEXP:";

/// A lightweight stand-in that defers loading a product until interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facade {
    pub name: String,
    pub repo: String,
}

/// A piece of software delivered by an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    /// Substrings of the URL, or regexes when prefixed with `REGEXP:`
    #[serde(default)]
    pub url_patterns: Vec<String>,
    /// Ordered, the first one is the primary category
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub facades: Vec<Facade>,
}

impl Product {
    pub fn has_facade(&self) -> bool {
        !self.facades.is_empty()
    }

    pub fn primary_category(&self) -> Option<&str> {
        self.categories.first().map(String::as_str)
    }
}

/// An organization serving third-party resources from a set of domains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub domains: Vec<String>,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl Entity {
    /// Entities are identified by name
    pub fn is_same(&self, other: &Entity) -> bool {
        self.name == other.name
    }
}

/// Lookups the facade classifier depends on.
///
/// Any failure to recognize a URL (malformed, unknown host, no matching
/// product) is reported as `None`, never as an error.
pub trait ThirdPartyClassifier {
    fn resolve_entity(&self, url: &str) -> Option<&Entity>;

    fn resolve_product(&self, url: &str) -> Option<&Product>;

    /// Whether `url` belongs to the same entity as the page's main resource
    fn is_first_party(&self, url: &str, main_entity: Option<&Entity>) -> bool {
        match (main_entity, self.resolve_entity(url)) {
            (Some(main), Some(entity)) => main.is_same(entity),
            _ => false,
        }
    }
}

struct EntityMatcher {
    domains: Vec<HostPattern>,
    /// One list of compiled URL patterns per product, in product order
    products: Vec<Vec<Regex>>,
}

/// In-memory knowledge base with precompiled domain and URL matchers
pub struct EntityDatabase {
    entities: Vec<Entity>,
    matchers: Vec<EntityMatcher>,
}

impl EntityDatabase {
    /// The knowledge base shipped with the crate
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_ENTITIES)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!("Reading knowledge base from: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let entities: Vec<Entity> = serde_json::from_str(content)?;
        Self::new(entities)
    }

    pub fn new(mut entities: Vec<Entity>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut matchers = Vec::with_capacity(entities.len());

        for entity in &mut entities {
            if entity.name.trim().is_empty() {
                return Err(Error::InvalidData("Entity with empty name".to_string()));
            }
            if !seen.insert(entity.name.clone()) {
                return Err(Error::InvalidData(format!(
                    "Duplicate entity '{}'",
                    entity.name
                )));
            }

            let domains = entity
                .domains
                .iter()
                .map(|d| HostPattern::parse(d))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|source| Error::Domain {
                    entity: entity.name.clone(),
                    source,
                })?;

            let mut products = Vec::with_capacity(entity.products.len());
            for product in &mut entity.products {
                if product.categories.is_empty() {
                    product.categories = entity.categories.clone();
                }
                products.push(compile_url_patterns(&entity.name, product)?);
            }

            matchers.push(EntityMatcher { domains, products });
        }

        tracing::debug!("Loaded knowledge base with {} entities", entities.len());

        Ok(Self { entities, matchers })
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Products with at least one facade, with their owning entity
    pub fn facadable_products(&self) -> impl Iterator<Item = (&Entity, &Product)> {
        self.entities.iter().flat_map(|entity| {
            entity
                .products
                .iter()
                .filter(|p| p.has_facade())
                .map(move |p| (entity, p))
        })
    }

    fn entity_index(&self, url: &str) -> Option<usize> {
        let host = host_of(url)?;

        // An explicit host pattern beats a registrable-domain match
        if let Some(idx) = self
            .matchers
            .iter()
            .position(|m| m.domains.iter().any(|d| d.matches(&host)))
        {
            return Some(idx);
        }

        let root = registrable_domain(&host);
        self.matchers.iter().position(|m| {
            m.domains
                .iter()
                .any(|d| d.as_exact() == Some(root.as_str()))
        })
    }
}

impl ThirdPartyClassifier for EntityDatabase {
    fn resolve_entity(&self, url: &str) -> Option<&Entity> {
        self.entity_index(url).map(|idx| &self.entities[idx])
    }

    fn resolve_product(&self, url: &str) -> Option<&Product> {
        let idx = self.entity_index(url)?;
        let position = self.matchers[idx]
            .products
            .iter()
            .position(|patterns| patterns.iter().any(|re| re.is_match(url)))?;
        self.entities[idx].products.get(position)
    }
}

fn compile_url_patterns(entity: &str, product: &Product) -> Result<Vec<Regex>> {
    product
        .url_patterns
        .iter()
        .map(|pattern| {
            let source = match pattern.strip_prefix(REGEXP_PREFIX) {
                Some(raw) => raw.to_string(),
                None => regex::escape(pattern),
            };
            Regex::new(&source).map_err(|e| {
                Error::Pattern(format!(
                    "Invalid URL pattern '{}' for {} / {}: {}",
                    pattern, entity, product.name, e
                ))
            })
        })
        .collect()
}

/// Extract root domain using Public Suffix List
fn registrable_domain(host: &str) -> String {
    if host.parse::<std::net::IpAddr>().is_ok() {
        return host.to_string();
    }

    match psl::domain(host.as_bytes()) {
        Some(root) => String::from_utf8_lossy(root.as_bytes()).to_string(),
        None => host.to_string(),
    }
}
