pub mod entities;
pub mod error;
pub mod facades;

pub use entities::{Entity, EntityDatabase, Facade, Product, ThirdPartyClassifier};
pub use error::{Error, Result};
pub use facades::{FacadeReport, FacadeRow, ProductSummary, build_report, classify};
