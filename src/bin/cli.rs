//! Depend CLI - inspect the code model built from a declarations file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use depend::{CodeModel, DependConfig, ModelBuilder, ModelDeclarations, TypeId};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "depend")]
#[command(about = "Depend CLI - class and interface dependency analysis", long_about = None)]
struct Cli {
    /// Path to the config file
    #[arg(short, long, default_value = "depend.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print entity counts
    Summary {
        /// Declarations file (.json, .yaml or .toml)
        declarations: PathBuf,
    },

    /// Show the hierarchy and dependencies of one type
    Inspect {
        /// Declarations file (.json, .yaml or .toml)
        declarations: PathBuf,

        /// Type name (case-insensitive)
        name: String,
    },

    /// List groups of mutually dependent types
    Cycles {
        /// Declarations file (.json, .yaml or .toml)
        declarations: PathBuf,
    },

    /// Print a JSON report of every type
    Report {
        /// Declarations file (.json, .yaml or .toml)
        declarations: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_model(config: &DependConfig, path: &Path) -> Result<CodeModel> {
    let declarations = ModelDeclarations::load(path)
        .with_context(|| format!("failed to load declarations from {}", path.display()))?;
    let model = ModelBuilder::new()
        .with_filters(config.filter_collection())
        .create_placeholders(config.model.create_placeholders)
        .build(&declarations)?;
    Ok(model)
}

fn run(cli: Cli) -> Result<()> {
    let config = DependConfig::load(&cli.config);

    match cli.command {
        Commands::Summary { declarations } => {
            let model = load_model(&config, &declarations)?;
            let stats = model.stats();

            println!("Code Model");
            println!("──────────");
            println!("Packages:     {}", stats.packages);
            println!("Classes:      {}", stats.classes);
            println!("Interfaces:   {}", stats.interfaces);
            println!("User defined: {}", stats.user_defined);
            println!("Methods:      {}", stats.methods);
            println!("Constants:    {}", stats.constants);
            println!("Functions:    {}", stats.functions);
        }

        Commands::Inspect { declarations, name } => {
            let model = load_model(&config, &declarations)?;
            let ty = model.require_type(&name)?;
            let summary = model
                .summarize(ty)
                .with_context(|| format!("no summary for {name}"))?;

            println!("{} {}", summary.kind, summary.name);
            if let Some(package) = &summary.package {
                println!("  package:      {}", package);
            }
            if summary.is_abstract {
                println!("  abstract");
            }
            if !summary.user_defined {
                println!("  (referenced only)");
            }
            print_list("ancestors", &names(&model, model.ancestors(ty)));
            print_list("interfaces", &summary.interfaces);
            print_list("dependencies", &summary.dependencies);
            print_list("children", &summary.children);
            print_list("implementors", &names(&model, model.implementors(ty)));

            let methods: Vec<String> = model.methods(ty).map(|m| m.name().to_string()).collect();
            let constants: Vec<String> = model.constants(ty).map(|m| m.name().to_string()).collect();
            print_list("methods", &methods);
            print_list("constants", &constants);
        }

        Commands::Cycles { declarations } => {
            let model = load_model(&config, &declarations)?;
            let cycles = model.dependency_cycles();

            if cycles.is_empty() {
                println!("No dependency cycles found.");
            } else {
                println!("Dependency cycles ({}):", cycles.len());
                for group in cycles {
                    println!("  - {}", names(&model, group).join(" <-> "));
                }
            }
        }

        Commands::Report { declarations } => {
            let model = load_model(&config, &declarations)?;
            println!("{}", model.report().to_json());
        }
    }

    Ok(())
}

fn names(model: &CodeModel, ids: Vec<TypeId>) -> Vec<String> {
    ids.into_iter()
        .filter_map(|ty| model.get_type(ty))
        .map(|node| node.name().to_string())
        .collect()
}

fn print_list(label: &str, items: &[String]) {
    if !items.is_empty() {
        println!("  {:<13} {}", format!("{label}:"), items.join(", "));
    }
}
