use crate::OutputFormat;
use anyhow::{Context, Result};
use facadex_core::analysis::{Analyzer, MainResourceAnalyzer, UrlSummaryAnalyzer};
use facadex_core::har::{Har, HarReader};
use facadex_core::tasks::{MainThreadTask, TaskReader};
use facadex_detectors::{EntityDatabase, FacadeReport, ThirdPartyClassifier, build_report, classify};
use std::path::{Path, PathBuf};

/// Inputs beyond the HAR file itself
#[derive(Debug, Clone)]
pub struct FacadeOptions {
    /// Main-thread tasks used to compute blocking time
    pub tasks: Option<PathBuf>,
    /// Knowledge base replacing the bundled one
    pub entities: Option<PathBuf>,
    /// URL of the page's main document, instead of guessing it from the HAR
    pub main_url: Option<String>,
    pub cpu_multiplier: f64,
}

impl Default for FacadeOptions {
    fn default() -> Self {
        Self {
            tasks: None,
            entities: None,
            main_url: None,
            cpu_multiplier: 1.0,
        }
    }
}

struct Artifacts {
    har: Har,
    tasks: Vec<MainThreadTask>,
    entities: EntityDatabase,
}

/// Load the HAR, the task list and the knowledge base concurrently
fn load_artifacts(file: &Path, options: &FacadeOptions) -> Result<Artifacts> {
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async {
        let har_path = file.to_path_buf();
        let har = tokio::task::spawn_blocking(move || HarReader::from_file(&har_path));

        let tasks_path = options.tasks.clone();
        let tasks = tokio::task::spawn_blocking(move || match tasks_path {
            Some(path) => TaskReader::from_file(&path),
            None => Ok(Vec::new()),
        });

        let entities_path = options.entities.clone();
        let entities = tokio::task::spawn_blocking(move || match entities_path {
            Some(path) => EntityDatabase::from_file(&path),
            None => EntityDatabase::bundled(),
        });

        let (har, tasks, entities) = tokio::try_join!(har, tasks, entities)?;

        Ok::<_, anyhow::Error>(Artifacts {
            har: har.with_context(|| format!("Failed to load HAR file {}", file.display()))?,
            tasks: tasks.context("Failed to load main-thread tasks")?,
            entities: entities.context("Failed to load third-party knowledge base")?,
        })
    })
}

/// Find facade opportunities in a HAR file
pub fn analyze_facades(file: &Path, options: &FacadeOptions) -> Result<FacadeReport> {
    tracing::debug!("Reading HAR file: {}", file.display());

    let Artifacts {
        har,
        tasks,
        entities,
    } = load_artifacts(file, options)?;
    HarReader::validate(&har)?;

    let summaries = UrlSummaryAnalyzer::new(&tasks)
        .with_cpu_multiplier(options.cpu_multiplier)
        .analyze(&har)?;

    let main_url = MainResourceAnalyzer::new(options.main_url.clone()).analyze(&har)?;
    let main_entity = main_url
        .as_deref()
        .and_then(|url| entities.resolve_entity(url));
    match main_entity {
        Some(entity) => tracing::info!("First-party entity: {}", entity.name),
        None => tracing::debug!("Main resource has no known entity"),
    }

    let product_summaries = classify(&entities, &summaries, main_entity);
    Ok(build_report(&product_summaries))
}

pub fn execute(file: &Path, options: &FacadeOptions, format: OutputFormat) -> Result<()> {
    tracing::info!("Looking for facade opportunities in: {}", file.display());

    let report = analyze_facades(file, options)?;

    match format {
        OutputFormat::Json => output_json(&report)?,
        OutputFormat::Table => output_table(&report),
        OutputFormat::Pretty => output_pretty(&report),
    }

    Ok(())
}

fn output_pretty(report: &FacadeReport) {
    use console::style;

    println!("\n{}", style("Third-Party Facades").bold().cyan());
    println!("{}", style("===================").cyan());

    if report.not_applicable {
        println!(
            "\n  {} No third-party embeds with a known facade were found.\n",
            style("✓").green()
        );
        return;
    }

    if let Some(display_value) = &report.display_value {
        println!("\n  {}", style(display_value).yellow().bold());
    }
    println!(
        "  Deferrable transfer: {}",
        format_bytes(report.wasted_bytes)
    );
    println!("  Deferrable blocking: {:.0} ms", report.wasted_ms);

    for row in &report.rows {
        println!(
            "\n  {} {}",
            style(&row.product).bold(),
            style(format!("[{}]", row.entity)).dim()
        );
        println!(
            "    {}  {:.0} ms blocking",
            format_bytes(row.transfer_size),
            row.blocking_time
        );
        if !row.facades.is_empty() {
            let names: Vec<&str> = row.facades.iter().map(|f| f.name.as_str()).collect();
            println!("    Facades: {}", style(names.join(", ")).green());
        }
        for sub_row in &row.sub_rows {
            println!(
                "    {:>10}  {:>6.0} ms  {}",
                format_bytes(sub_row.transfer_size),
                sub_row.blocking_time,
                style(&sub_row.url).dim()
            );
        }
    }

    println!();
}

fn output_json(report: &FacadeReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

fn output_table(report: &FacadeReport) {
    println!("Product,Entity,URL,Transfer Size (bytes),Blocking Time (ms)");
    for row in &report.rows {
        println!(
            "{},{},,{},{:.0}",
            csv_field(&row.product),
            csv_field(&row.entity),
            row.transfer_size,
            row.blocking_time
        );
        for sub_row in &row.sub_rows {
            println!(
                "{},{},{},{},{:.0}",
                csv_field(&row.product),
                csv_field(&row.entity),
                csv_field(&sub_row.url),
                sub_row.transfer_size,
                sub_row.blocking_time
            );
        }
    }
}

pub(crate) fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let bytes_f = bytes as f64;
    if bytes_f >= KIB * KIB {
        format!("{:.1} MiB", bytes_f / (KIB * KIB))
    } else if bytes_f >= KIB {
        format!("{:.1} KiB", bytes_f / KIB)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MiB");
    }

    #[test]
    fn test_csv_field_quotes_when_needed() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
