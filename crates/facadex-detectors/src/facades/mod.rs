//! Facade opportunities: third-party products that could be lazy-loaded
//! behind a lightweight placeholder.

mod classifier;
mod report;

pub use classifier::{ProductSummary, classify};
pub use report::{FacadeReport, FacadeRow, LabelCategory, build_report, product_label};
