mod client;
mod commands;
mod config;
mod context;
mod error;
mod lifecycle;
mod output;
mod provider;
mod resources;
mod schema;
mod services;
mod traits;

use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use client::ZpaClient;
use commands::{
    ApplyCommand, DataCommand, DestroyCommand, ImportCommand, RefreshCommand, SchemaCommand,
    ValidateCommand,
};
use config::ProviderConfig;
use context::Context;

#[derive(Parser)]
#[command(name = "zpa")]
#[command(about = "Manage Zscaler Private Access resources declaratively", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging (overrides ZPA_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Provider configuration file (defaults to ~/.zpa/config.yaml)
    #[arg(long, global = true, env = "ZPA_CONFIG_FILE")]
    config_file: Option<PathBuf>,

    #[command(flatten)]
    provider: ProviderArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Provider settings; each overrides the configuration file
#[derive(Args)]
struct ProviderArgs {
    /// OAuth client ID
    #[arg(long, global = true, env = "ZPA_CLIENT_ID")]
    client_id: Option<String>,

    /// OAuth client secret
    #[arg(long, global = true, env = "ZPA_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// ZPA customer (tenant) ID
    #[arg(long, global = true, env = "ZPA_CUSTOMER_ID")]
    customer_id: Option<String>,

    /// ZPA cloud: PRODUCTION, ZPATWO, BETA, GOV, GOVUS or PREVIEW
    #[arg(long, global = true, env = "ZPA_CLOUD")]
    cloud: Option<String>,

    /// Explicit API base URL (wins over --cloud)
    #[arg(long, global = true, env = "ZPA_BASE_URL")]
    base_url: Option<String>,
}

impl ProviderArgs {
    fn into_config(self) -> ProviderConfig {
        ProviderConfig {
            client_id: self.client_id,
            client_secret: self.client_secret,
            customer_id: self.customer_id,
            cloud: self.cloud,
            base_url: self.base_url,
            ..ProviderConfig::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the schema of every resource and data source, or of one type
    Schema {
        /// Resource or data source type, e.g. zpa_inspection_profile
        #[arg(short = 't', long = "type")]
        type_name: Option<String>,
    },

    /// Check a configuration file against a schema without calling the API
    Validate {
        /// Resource or data source type
        #[arg(short = 't', long = "type")]
        type_name: String,

        /// YAML or JSON file with attribute values
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Create or update a resource and record it in a state file
    Apply {
        /// Resource type
        #[arg(short = 't', long = "type")]
        type_name: String,

        /// YAML or JSON file with attribute values
        #[arg(short, long)]
        config: PathBuf,

        /// State file (JSON); created when missing
        #[arg(short, long)]
        state: PathBuf,
    },

    /// Re-read a resource and update its state file
    Refresh {
        /// State file (JSON)
        #[arg(short, long)]
        state: PathBuf,
    },

    /// Delete a resource and its state file
    Destroy {
        /// State file (JSON)
        #[arg(short, long)]
        state: PathBuf,
    },

    /// Adopt an existing object into a new state file
    Import {
        /// Resource type
        #[arg(short = 't', long = "type")]
        type_name: String,

        /// Identifier of the object (some types also accept its name)
        #[arg(long)]
        id: String,

        /// State file (JSON) to create
        #[arg(short, long)]
        state: PathBuf,
    },

    /// Look up an existing object through a data source
    Data {
        /// Data source type
        #[arg(short = 't', long = "type")]
        type_name: String,

        /// YAML or JSON file with the lookup attributes
        #[arg(short, long)]
        config: PathBuf,

        /// Write the result here instead of printing it
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("ZPA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn connect(ctx: &Context, config_file: Option<&Path>, overrides: ProviderConfig) -> Result<ZpaClient> {
    let config = ProviderConfig::load(&*ctx.fs, config_file)?.merge(overrides);
    ZpaClient::new(&config).context("Failed to configure the ZPA client")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = Context::new();
    let config_file = cli.config_file.as_deref();
    let overrides = cli.provider.into_config();

    match cli.command {
        Commands::Schema { type_name } => {
            SchemaCommand::execute(&ctx, type_name.as_deref())?;
        }
        Commands::Validate { type_name, config } => {
            ValidateCommand::execute(&ctx, &type_name, &config)?;
        }
        Commands::Apply {
            type_name,
            config,
            state,
        } => {
            let client = connect(&ctx, config_file, overrides)?;
            ApplyCommand::execute(&ctx, &client, &type_name, &config, &state)?;
        }
        Commands::Refresh { state } => {
            let client = connect(&ctx, config_file, overrides)?;
            RefreshCommand::execute(&ctx, &client, &state)?;
        }
        Commands::Destroy { state } => {
            let client = connect(&ctx, config_file, overrides)?;
            DestroyCommand::execute(&ctx, &client, &state)?;
        }
        Commands::Import {
            type_name,
            id,
            state,
        } => {
            let client = connect(&ctx, config_file, overrides)?;
            ImportCommand::execute(&ctx, &client, &type_name, &id, &state)?;
        }
        Commands::Data {
            type_name,
            config,
            out,
        } => {
            let client = connect(&ctx, config_file, overrides)?;
            DataCommand::execute(&ctx, &client, &type_name, &config, out.as_deref())?;
        }
    }

    Ok(())
}
