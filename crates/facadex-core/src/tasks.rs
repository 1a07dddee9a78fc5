//! Main-thread task input.
//!
//! Tasks come from a trace processed elsewhere; each one is already
//! attributed to the script URL responsible for it.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A main-thread task attributed to a script URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainThreadTask {
    /// Script responsible for the task, if it could be attributed
    #[serde(default)]
    pub url: Option<String>,
    /// Task duration in milliseconds
    pub duration: f64,
    /// Nested tasks run inside a parent and never block on their own
    #[serde(default)]
    pub nested: bool,
}

pub struct TaskReader;

impl TaskReader {
    pub fn from_file(path: &Path) -> Result<Vec<MainThreadTask>> {
        tracing::debug!("Reading main-thread tasks from: {}", path.display());

        let file = File::open(path)?;
        let tasks: Vec<MainThreadTask> = serde_json::from_reader(BufReader::new(file))?;

        tracing::info!("Loaded {} main-thread tasks", tasks.len());
        Ok(tasks)
    }

    pub fn from_str(content: &str) -> Result<Vec<MainThreadTask>> {
        Ok(serde_json::from_str(content)?)
    }
}
