mod commands;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use formcraft::{Config, FieldDraft};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "formcraft")]
#[command(version, about = "Build, save and preview local form definitions", long_about = None)]
struct Cli {
    /// Config file
    #[arg(short, long, global = true, default_value = formcraft::config::CONFIG_FILE)]
    config: PathBuf,

    /// Store directory (overrides the config file)
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create and save a new form
    New {
        /// Form name
        #[arg(short, long)]
        name: String,

        /// Field definition, repeatable: "label=Email;type=text;required;email"
        #[arg(short, long = "field", value_name = "FIELD", required = true)]
        fields: Vec<FieldDraft>,
    },

    /// List saved forms
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Preview a saved form, optionally filling and submitting it
    Preview {
        /// Form id
        id: String,

        /// Set a field value before rendering, repeatable: "field_id=value"
        #[arg(short, long = "set", value_name = "ID=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, String)>,

        /// Validate and submit after applying values
        #[arg(long)]
        submit: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the stored definition of a form
    Show {
        /// Form id
        id: String,
    },

    /// Delete a saved form
    Delete {
        /// Form id
        id: String,
    },
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(id, value)| (id.trim().to_string(), value.to_string()))
        .filter(|(id, _)| !id.is_empty())
        .ok_or_else(|| format!("expected ID=VALUE, got '{}'", raw))
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    if let Some(dir) = cli.store_dir {
        config.store.dir = dir;
    }

    init_logging(&config.log.level);

    let ctx = commands::Context::new(config)?;
    debug!(store = %ctx.config.store.dir.display(), key = %ctx.config.store.key, "Store opened");

    // Execute command
    match cli.command {
        Commands::New { name, fields } => commands::new::execute(&ctx, &name, fields)?,
        Commands::List { json } => commands::list::execute(&ctx, json)?,
        Commands::Preview { id, set, submit, json } => {
            commands::preview::execute(&ctx, &id, &set, submit, json)?
        }
        Commands::Show { id } => commands::show::execute(&ctx, &id)?,
        Commands::Delete { id } => commands::delete::execute(&ctx, &id)?,
    }

    Ok(())
}
