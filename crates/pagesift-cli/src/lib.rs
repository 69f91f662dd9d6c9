//! Runs pagesift list requests against JSON record files.
//!
//! The binary reads a JSON array of records, a list request (from a file or
//! stdin), an optional schema of declared field types and optional query
//! limits, then prints the resulting page envelope as JSON.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use pagesift::{PageQuery, QueryOptions, Schema};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

/// Filter, sort and paginate a JSON record file.
#[derive(Debug, Parser)]
#[command(name = "pagesift", version, about)]
pub struct Args {
    /// JSON file holding an array of records
    #[arg(short, long)]
    pub records: PathBuf,

    /// JSON list request; read from stdin when omitted
    #[arg(short = 'q', long)]
    pub request: Option<PathBuf>,

    /// YAML or JSON map of field names to types (string, number, bool, timestamp)
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// YAML file with query limits
    #[arg(short, long, env = "PAGESIFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Pretty-print the output
    #[arg(long)]
    pub pretty: bool,
}

/// Executes the request described by `args` and returns the page as JSON.
///
/// `stdin` is read only when no request file is given.
pub fn run(args: &Args, mut stdin: impl Read) -> Result<String> {
    let request = match &args.request {
        Some(path) => read(path)?,
        None => {
            let mut buf = String::new();
            stdin
                .read_to_string(&mut buf)
                .context("failed to read request from stdin")?;
            buf
        }
    };
    let query = PageQuery::from_json(&request).context("invalid list request")?;

    let records: Vec<serde_json::Value> = serde_json::from_str(&read(&args.records)?)
        .with_context(|| format!("{} is not a JSON array of records", args.records.display()))?;
    if let Some(index) = records.iter().position(|record| !record.is_object()) {
        bail!(
            "{}: record {index} is not a JSON object",
            args.records.display()
        );
    }

    let schema: Schema = match &args.schema {
        Some(path) => load_yaml(path)?,
        None => Schema::new(),
    };
    let options: QueryOptions = match &args.config {
        Some(path) => load_yaml(path)?,
        None => QueryOptions::default(),
    };
    debug!(?options, fields = schema.iter().count(), "loaded configuration");

    let page = query
        .execute_with(&records, &schema, &options)
        .context("query failed")?;
    info!(
        returned = page.len(),
        total = page.page.total_elements,
        "query complete"
    );

    let output = if args.pretty {
        serde_json::to_string_pretty(&page)?
    } else {
        serde_json::to_string(&page)?
    };
    Ok(output)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    serde_yaml::from_str(&read(path)?)
        .with_context(|| format!("failed to parse {}", path.display()))
}
