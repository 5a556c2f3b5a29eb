//! cve-inventory: list the open-source components of a project
//!
//! Reads lockfiles, package metadata and SBOMs and prints one
//! `vendor,product,version` line per identity found.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use cve_inventory::{
    cli::{self, OutputTarget},
    config::{self, AppConfig},
    pipeline::exit_codes,
    sbom::SbomType,
};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build long version string with format support info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nManifests:",
        "\n  package-lock.json, requirements.txt, PKG-INFO, METADATA, Cargo.lock,",
        "\n  Gemfile.lock, go.mod, composer.lock, pubspec.lock, Package.resolved,",
        "\n  cpanfile, pom.xml, renv.lock",
        "\n\nSBOM Formats:",
        "\n  SPDX:      JSON, YAML, tag-value, RDF/XML, XML",
        "\n  CycloneDX: JSON, XML",
        "\n  SWID:      ISO/IEC 19770-2 tags"
    )
}

#[derive(Parser)]
#[command(name = "cve-inventory")]
#[command(version, long_version = build_long_version())]
#[command(about = "Identify the open-source components in manifests and SBOMs", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success
    1  Some files could not be decoded (scan)
    2  Error occurred

EXAMPLES:
    # Inventory a source tree
    cve-inventory scan ./project --index vendors.json

    # Read a CycloneDX SBOM
    cve-inventory sbom app.cdx.json --type cyclonedx")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Product-to-vendor index (JSON or YAML)
    #[arg(long, global = true, env = "CVE_INVENTORY_INDEX")]
    index: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by the commands that produce an inventory
#[derive(clap::Args)]
struct OutputArgs {
    /// Write the inventory to a file instead of stdout
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk a directory and inventory every recognised file
    Scan {
        /// Directory (or single file) to scan
        path: PathBuf,

        /// Do not split unknown products on '-'
        #[arg(long)]
        no_hyphen_split: bool,

        /// Follow symbolic links
        #[arg(long)]
        follow_links: bool,

        /// Deepest directory level to descend into
        #[arg(long)]
        max_depth: Option<usize>,

        /// Decode files one at a time
        #[arg(long)]
        sequential: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Inventory one SBOM document
    Sbom {
        /// SBOM file
        path: PathBuf,

        /// Document type (defaults to the configured one)
        #[arg(short = 't', long = "type", value_enum)]
        sbom_type: Option<SbomType>,

        /// Skip structural validation of XML documents
        #[arg(long)]
        no_validate: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Inventory one manifest file, recognised by its name
    Manifest {
        /// Manifest file
        path: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print an example config file or its JSON Schema
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print a commented example .cve-inventory.yaml
    Example,
    /// Print the JSON Schema of the config file format
    Schema,
    /// Print the effective configuration (defaults + file)
    Show,
}

/// Load the config file and layer the global flags over it.
fn effective_config(cli: &Cli, overrides: AppConfig) -> Result<AppConfig> {
    let overrides = AppConfig {
        index: config::IndexConfig {
            path: cli.index.clone(),
        },
        ..overrides
    };
    let (config, loaded_from) = AppConfig::from_file_with_overrides(cli.config.as_deref(), &overrides);
    if let Some(path) = &loaded_from {
        tracing::debug!("Loaded config from {}", path.display());
    }

    config.validated().context("checking configuration")
}

fn run(cli: Cli) -> Result<i32> {
    match &cli.command {
        Commands::Scan {
            path,
            no_hyphen_split,
            follow_links,
            max_depth,
            sequential,
            output,
        } => {
            let overrides = AppConfig::builder()
                .hyphen_split(!no_hyphen_split)
                .follow_links(*follow_links)
                .max_depth(*max_depth)
                .parallel(!sequential)
                .build();
            let config = effective_config(&cli, overrides)?;
            cli::run_scan(
                &config,
                path,
                &OutputTarget::from_option(output.output_file.clone()),
            )
        }

        Commands::Sbom {
            path,
            sbom_type,
            no_validate,
            output,
        } => {
            let overrides = AppConfig::builder().validate_sboms(!no_validate).build();
            let config = effective_config(&cli, overrides)?;
            cli::run_sbom(
                &config,
                path,
                *sbom_type,
                &OutputTarget::from_option(output.output_file.clone()),
            )
        }

        Commands::Manifest { path, output } => {
            let config = effective_config(&cli, AppConfig::default())?;
            cli::run_manifest(
                &config,
                path,
                &OutputTarget::from_option(output.output_file.clone()),
            )
        }

        Commands::Config { action } => {
            match action {
                ConfigAction::Example => print!("{}", config::generate_example_config()),
                ConfigAction::Schema => println!("{}", config::generate_json_schema()),
                ConfigAction::Show => {
                    let (config, loaded_from) = config::load_or_default(cli.config.as_deref());
                    match &loaded_from {
                        Some(path) => eprintln!("# Loaded from: {}", path.display()),
                        None => eprintln!("# No config file found; showing defaults"),
                    }
                    let yaml =
                        serde_yaml::to_string(&config).context("failed to serialize config")?;
                    print!("{yaml}");
                }
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Completions { shell } => {
            generate(*shell, &mut Cli::command(), "cve-inventory", &mut io::stdout());
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            exit_codes::ERROR
        }
    };
    std::process::exit(code);
}
