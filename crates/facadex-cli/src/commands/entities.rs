use super::facades::csv_field;
use crate::OutputFormat;
use anyhow::Result;
use facadex_detectors::EntityDatabase;
use facadex_detectors::facades::product_label;
use std::path::Path;

/// Load the knowledge base to list, bundled unless a file is given
pub fn load_entities(entities: Option<&Path>) -> Result<EntityDatabase> {
    let db = match entities {
        Some(path) => EntityDatabase::from_file(path)?,
        None => EntityDatabase::bundled()?,
    };
    Ok(db)
}

pub fn execute(entities: Option<&Path>, facadable_only: bool, format: OutputFormat) -> Result<()> {
    let db = load_entities(entities)?;
    tracing::debug!("Listing {} entities", db.len());

    match format {
        OutputFormat::Json => {
            let listed: Vec<_> = db
                .entities()
                .iter()
                .filter(|e| !facadable_only || e.products.iter().any(|p| p.has_facade()))
                .collect();
            println!("{}", serde_json::to_string_pretty(&listed)?);
        }
        OutputFormat::Table => {
            println!("Entity,Product,Label,Facades");
            for entity in db.entities() {
                for product in &entity.products {
                    if facadable_only && !product.has_facade() {
                        continue;
                    }
                    let facades: Vec<&str> =
                        product.facades.iter().map(|f| f.name.as_str()).collect();
                    println!(
                        "{},{},{},{}",
                        csv_field(&entity.name),
                        csv_field(&product.name),
                        csv_field(&product_label(product)),
                        csv_field(&facades.join("; "))
                    );
                }
            }
        }
        OutputFormat::Pretty => output_pretty(&db, facadable_only),
    }

    Ok(())
}

fn output_pretty(db: &EntityDatabase, facadable_only: bool) {
    use console::style;

    println!("\n{}", style("Third-Party Knowledge Base").bold().cyan());
    println!("{}", style("==========================").cyan());

    if facadable_only {
        for (entity, product) in db.facadable_products() {
            print_product(&entity.name, product);
        }
    } else {
        for entity in db.entities() {
            println!(
                "\n  {} {}",
                style(&entity.name).bold(),
                style(format!("({})", entity.categories.join(", "))).dim()
            );
            println!("    Domains: {}", entity.domains.join(", "));
            for product in &entity.products {
                print_product(&entity.name, product);
            }
        }
    }

    println!();
}

fn print_product(entity: &str, product: &facadex_detectors::Product) {
    use console::style;

    let facades = if product.has_facade() {
        style(
            product
                .facades
                .iter()
                .map(|f| f.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        )
        .green()
    } else {
        style("no facade".to_string()).dim()
    };
    println!(
        "    - {} [{}]: {}",
        product_label(product),
        entity,
        facades
    );
}
