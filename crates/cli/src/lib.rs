//! Library interface for the vecadmin CLI
//!
//! Argument parsing and command execution live here so integration tests
//! can drive them against an in-memory service; main.rs only wires up
//! logging and configuration.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::debug;
use vecadmin_client::CollectionClient;
use vecadmin_core::{CollectionSpec, DataType, FieldSpec};

#[derive(Parser, Debug)]
#[command(name = "vecadmin")]
#[command(about = "Manage collections on a vector database service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Per-call deadline in milliseconds, overriding the configuration
    #[arg(long, value_name = "MS", global = true)]
    pub timeout_ms: Option<u64>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a collection
    Create(CreateArgs),
    /// Drop a collection and all of its data
    Drop { name: String },
    /// List collection names
    List,
    /// Show a collection's schema
    Describe { name: String },
    /// Show a collection's statistics
    Stats { name: String },
    /// Check whether a collection exists
    Has { name: String },
    /// Show the service version
    Version,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    pub name: String,

    /// JSON or TOML file holding the collection parameters
    #[arg(long, value_name = "FILE", conflicts_with_all = ["vector", "scalar"])]
    pub spec: Option<PathBuf>,

    /// Vector field as NAME:TYPE:DIM, e.g. embedding:float_vector:128
    #[arg(long, value_name = "FIELD")]
    pub vector: Vec<String>,

    /// Scalar field as NAME:TYPE, e.g. age:int32
    #[arg(long, value_name = "FIELD")]
    pub scalar: Vec<String>,

    /// Rows per segment; the configured default applies when omitted
    #[arg(long, conflicts_with = "spec")]
    pub segment_row_limit: Option<u64>,

    /// Whether the service assigns row ids
    #[arg(long, conflicts_with = "spec")]
    pub auto_id: Option<bool>,
}

/// Parse `NAME:TYPE:DIM`
pub fn parse_vector_field(arg: &str) -> Result<FieldSpec> {
    let parts: Vec<&str> = arg.split(':').collect();
    let [name, data_type, dim] = parts.as_slice() else {
        bail!("Vector field '{arg}' must look like NAME:TYPE:DIM");
    };

    let data_type = parse_data_type(data_type)?;
    if !data_type.is_vector() {
        bail!("'{data_type}' is not a vector type; use --scalar for '{name}'");
    }
    let dim = dim
        .parse::<u32>()
        .with_context(|| format!("Invalid dimension '{dim}' for field '{name}'"))?;

    Ok(FieldSpec::vector(*name, data_type, dim))
}

/// Parse `NAME:TYPE`
pub fn parse_scalar_field(arg: &str) -> Result<FieldSpec> {
    let Some((name, data_type)) = arg.split_once(':') else {
        bail!("Scalar field '{arg}' must look like NAME:TYPE");
    };

    let data_type = parse_data_type(data_type)?;
    if data_type.is_vector() {
        bail!("'{data_type}' is a vector type; use --vector for '{name}'");
    }

    Ok(FieldSpec::scalar(name, data_type))
}

fn parse_data_type(raw: &str) -> Result<DataType> {
    raw.parse::<DataType>()
        .map_err(|_| anyhow!("Unknown data type '{raw}'"))
}

/// Read collection parameters from a `.toml` or `.json` file
pub fn load_spec_file(path: &Path) -> Result<CollectionSpec> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read spec file {}", path.display()))?;

    let spec = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => CollectionSpec::from_toml_str(&content)?,
        _ => CollectionSpec::from_json_str(&content)?,
    };
    Ok(spec)
}

impl CreateArgs {
    /// Collection parameters from either the spec file or the field flags
    pub fn to_spec(&self) -> Result<CollectionSpec> {
        if let Some(path) = &self.spec {
            return load_spec_file(path);
        }

        let mut builder = CollectionSpec::builder();
        for arg in &self.vector {
            builder.field(parse_vector_field(arg)?);
        }
        for arg in &self.scalar {
            builder.field(parse_scalar_field(arg)?);
        }
        if let Some(limit) = self.segment_row_limit {
            builder.segment_row_limit(limit);
        }
        if let Some(auto_id) = self.auto_id {
            builder.auto_id(auto_id);
        }

        Ok(builder.build()?)
    }
}

/// Run one command and return its JSON output
pub async fn execute(client: &CollectionClient, command: &Commands) -> Result<Value> {
    debug!("Executing {command:?}");

    let output = match command {
        Commands::Create(args) => {
            let spec = args.to_spec()?;
            client.create_collection(&args.name, spec).await?;
            json!({ "created": args.name })
        }
        Commands::Drop { name } => {
            client.drop_collection(name).await?;
            json!({ "dropped": name })
        }
        Commands::List => json!(client.list_collections().await?),
        Commands::Describe { name } => {
            serde_json::to_value(client.describe_collection(name).await?)?
        }
        Commands::Stats { name } => serde_json::to_value(client.collection_stats(name).await?)?,
        Commands::Has { name } => {
            let exists = client.has_collection(name).await?;
            json!({ "name": name, "exists": exists })
        }
        Commands::Version => {
            let version = client.server_version().await?;
            json!({ "version": version })
        }
    };

    Ok(output)
}
