pub mod analysis;
pub mod error;
pub mod har;
pub mod host;
pub mod tasks;

pub use error::{Error, Result};
