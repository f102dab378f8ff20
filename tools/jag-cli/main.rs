//! CLI: inspect and check Joint Activity Graph documents.
//!
//! Usage: `jag-cli [-v] <COMMAND>`
//!
//! Set RUST_LOG=jag=trace for span-level detail.

use clap::{Parser, Subcommand};
use jag::prelude::*;
use jag::taxonomy::{onfail_options, operator_options, returns_options};
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Inspect and check Joint Activity Graph documents
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate and load one or more activity documents
    Validate {
        /// JSON files holding one activity or an array of activities
        #[arg(required = true)]
        files: Vec<String>,

        /// Reject the legacy connector and binding shapes
        #[arg(long)]
        strict: bool,
    },
    /// Print an activity and everything nested below it
    Tree {
        /// Library file written by `Library::save` or `jag-gen`
        library: String,
        urn: String,
    },
    /// List the providers a child may bind its inputs from, or, without a child id, the
    /// providers for the activity's own outputs
    Providers {
        library: String,
        urn: String,
        child_id: Option<String>,
    },
    /// Show which connector values are permitted
    Options {
        /// Execution mode to list returns and failure policies for
        #[arg(long)]
        execution: Option<String>,

        /// Returns mode to list operators for
        #[arg(long)]
        returns: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Validate { files, strict } => run_validate(&files, strict),
        Command::Tree { library, urn } => {
            let library = load_library(&library);
            if library.resolve(&urn).is_none() {
                exit_with_error(&format!("Activity '{}' not found in library", urn));
            }
            print!("{}", library.tree(&urn));
        }
        Command::Providers {
            library,
            urn,
            child_id,
        } => run_providers(&library, &urn, child_id.as_deref()),
        Command::Options { execution, returns } => run_options(execution, returns),
    }
}

fn run_validate(files: &[String], strict: bool) {
    let options = if strict {
        ValidationOptions::strict()
    } else {
        ValidationOptions::default()
    };

    let mut failures = 0;
    for path in files {
        let result = fs::read_to_string(path)
            .map_err(|e| JagError::Io {
                path: path.clone(),
                message: e.to_string(),
            })
            .and_then(|text| {
                serde_json::from_str::<serde_json::Value>(&text)
                    .map_err(|e| JagError::JsonParseError(e.to_string()))
            })
            .and_then(|json| jag::serialization::import_with(&json, &options));

        match result {
            Ok(activities) => {
                info!(path = %path, count = activities.len(), "document valid");
                println!("OK    {} ({} activities)", path, activities.len());
            }
            Err(JagError::InvalidJag { violation, .. }) => {
                failures += 1;
                println!("FAIL  {}: {}", path, violation);
            }
            Err(e) => {
                failures += 1;
                println!("FAIL  {}: {}", path, e);
            }
        }
    }

    if failures > 0 {
        exit_with_error(&format!("{} of {} files failed validation", failures, files.len()));
    }
}

fn run_providers(library_path: &str, urn: &str, child_id: Option<&str>) {
    let library = load_library(library_path);
    let activity = library
        .resolve(urn)
        .unwrap_or_else(|| exit_with_error(&format!("Activity '{}' not found in library", urn)));

    let providers = match child_id {
        Some(id) => {
            if activity.child(id).is_none() {
                exit_with_error(&format!("'{}' has no child slot '{}'", urn, id));
            }
            activity.inputs_to(id, &library)
        }
        None => activity.available_outputs(&library),
    };

    if providers.is_empty() {
        println!("No providers available.");
    }
    for provider in providers {
        println!("{}", provider);
    }
}

fn run_options(execution: Option<String>, returns: Option<String>) {
    if execution.is_none() && returns.is_none() {
        println!("Execution modes:");
        for e in Execution::ALL {
            println!("  {:<28} {}", e.name(), e.description());
        }
        return;
    }

    if let Some(name) = execution {
        let execution: Execution = name
            .parse()
            .unwrap_or_else(|e: JagError| exit_with_error(&e.to_string()));
        println!("Returns modes under {}:", execution);
        for r in returns_options(execution) {
            println!("  {:<28} {}", r.name(), r.description());
        }
        println!("Failure policies under {}:", execution);
        for o in onfail_options(execution) {
            println!("  {:<28} {}", o.name(), o.description());
        }
    }

    if let Some(name) = returns {
        let returns: Returns = name
            .parse()
            .unwrap_or_else(|e: JagError| exit_with_error(&e.to_string()));
        println!("Operators under {}:", returns);
        for o in operator_options(returns) {
            println!("  {:<28} {}", o.name(), o.description());
        }
    }
}

fn load_library(path: &str) -> Library {
    Library::from_file(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load library '{}': {}", path, e)))
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
