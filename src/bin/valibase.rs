//! Valibase CLI
//!
//! Validates JSON payloads against the built-in collections or against the
//! schemas derived from a PocketBase collections export.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use valibase::config::ValibaseConfig;
use valibase::schema::Kind;
use valibase::{CollectionName, CollectionSchemas, SchemaSet, SchemaVariant, ValidationError};

#[derive(Parser)]
#[command(name = "valibase")]
#[command(about = "Validate PocketBase records and payloads")]
struct Cli {
    /// PocketBase collections export; overrides the configured one
    #[arg(short, long, global = true)]
    schema: Option<PathBuf>,

    /// Extra config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List built-in collections
    Collections,

    /// Validate a JSON document
    Validate {
        /// Collection name
        collection: String,
        /// create, update or response
        variant: SchemaVariant,
        /// JSON file, or "-" for stdin
        #[arg(default_value = "-")]
        input: PathBuf,
    },

    /// List the collections of an export and their derived entries
    Inspect,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

/// `Ok(false)` when the input did not validate
fn run(cli: Cli) -> Result<bool> {
    let config = ValibaseConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    let schema_path = cli.schema.clone().or_else(|| config.schema_path());

    match cli.command {
        Commands::Collections => {
            for name in CollectionName::ALL {
                print_collection(name.schemas());
            }
            Ok(true)
        }

        Commands::Validate {
            collection,
            variant,
            input,
        } => {
            let value = read_json(&input)?;
            let result = match &schema_path {
                Some(path) => load_set(path)?.validate(&collection, variant, &value),
                None => valibase::validate(&collection, variant, &value),
            };

            match result {
                Ok(output) => {
                    let output = output.unwrap_or(Value::Null);
                    println!("{}", config.output.format.render(&output)?);
                    Ok(true)
                }
                Err(valibase::SchemaError::Validation(e)) => {
                    print_issues(&e, config.output.show_received);
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            }
        }

        Commands::Inspect => {
            let path = schema_path.context("inspect needs --schema or schema.path in the config")?;
            let set = load_set(&path)?;
            for collection in set.iter() {
                print_collection(&collection.schemas);
                if !collection.expandable.is_empty() {
                    println!("  expand: {}", collection.expandable.join(", "));
                }
            }
            Ok(true)
        }
    }
}

fn load_set(path: &Path) -> Result<SchemaSet> {
    SchemaSet::from_path(path).with_context(|| format!("loading collections export {}", path.display()))
}

fn read_json(input: &Path) -> Result<Value> {
    let content = if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?
    };
    serde_json::from_str(&content).context("input is not valid JSON")
}

fn print_collection(schemas: &CollectionSchemas) {
    println!("{} ({})", schemas.name, schemas.kind);
    for variant in SchemaVariant::ALL {
        println!("  {:<8} {}", variant.as_str(), entry_names(schemas.get(variant).kind()));
    }
}

/// Entry names of an object, or of every object in an intersection
fn entry_names(kind: &Kind) -> String {
    match kind {
        Kind::Object(object) => object
            .entries()
            .iter()
            .map(|e| {
                if e.presence.is_required() {
                    e.name.clone()
                } else {
                    format!("{}?", e.name)
                }
            })
            .collect::<Vec<_>>()
            .join(", "),
        Kind::Intersect(options) => options
            .iter()
            .map(|o| entry_names(o.kind()))
            .collect::<Vec<_>>()
            .join(" & "),
        _ => "-".to_string(),
    }
}

fn print_issues(error: &ValidationError, show_received: bool) {
    eprintln!("❌ {} issue(s)", error.issues.len());
    for issue in &error.issues {
        match (&issue.received, show_received) {
            (Some(received), true) => eprintln!("  {}: {} (received {})", issue.path, issue.message, received),
            _ => eprintln!("  {}: {}", issue.path, issue.message),
        }
    }
}
