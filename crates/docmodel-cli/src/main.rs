//! `docmodel` CLI: flatten JSON attribute maps into collision-free documents.
//!
//! ## Usage
//!
//! ```sh
//! # Flat dotted keys (stdin → stdout)
//! echo '{"a":{"b":1},"a.c":2}' | docmodel render
//!
//! # Nested objects, written to a file
//! docmodel render --layout dedot -i attrs.json -o doc.json
//!
//! # Put every attribute under a namespace and add a timestamp field
//! docmodel render --prefix resource --timestamp @timestamp=2024-01-01T00:00:00Z -i attrs.json
//!
//! # Inspect the sorted field list, including superseded entries
//! docmodel fields -i attrs.json
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use docmodel_core::{AttributeMap, Document, Layout};
use tracing::{debug, info, Level};

#[derive(Parser)]
#[command(
    name = "docmodel",
    version,
    about = "Flatten attribute maps into collision-free JSON documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Render attributes as a JSON document
    Render {
        #[command(flatten)]
        source: SourceArgs,
        /// Key layout of the output document
        #[arg(long, value_enum, default_value_t = LayoutArg::Flat)]
        layout: LayoutArg,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Print the sorted, deduplicated field list, one field per line
    Fields {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Input JSON object (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
    /// Namespace every attribute is flattened under
    #[arg(long, default_value = "")]
    prefix: String,
    /// Extra timestamp field, as KEY=RFC3339 (repeatable)
    #[arg(long = "timestamp", value_name = "KEY=RFC3339")]
    timestamps: Vec<String>,
    /// Skip collision resolution (output may contain duplicate keys)
    #[arg(long)]
    no_dedup: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutArg {
    Flat,
    Dedot,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Flat => Layout::Flat,
            LayoutArg::Dedot => Layout::Dedot,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render {
            source,
            layout,
            output,
        } => {
            let doc = build_document(&source)?;
            write_document(&doc, layout.into(), output.as_deref())?;
        }
        Commands::Fields { source } => {
            let doc = build_document(&source)?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for field in doc.fields() {
                if field.value().is_ignored() {
                    writeln!(out, "{}\t(ignored)", field.key())?;
                } else {
                    writeln!(out, "{}\t{}", field.key(), field.value().to_json_string())?;
                }
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

/// Ingest, sort and (unless disabled) dedup the input attributes.
fn build_document(source: &SourceArgs) -> Result<Document> {
    let json = read_input(source.input.as_deref())?;
    let attrs =
        AttributeMap::from_json_str(&json).context("Failed to parse attribute input")?;
    debug!(attributes = attrs.len(), prefix = %source.prefix, "ingesting attributes");

    let mut doc = Document::from_attributes_with_prefix(&source.prefix, &attrs);
    for spec in &source.timestamps {
        let (key, ts) = parse_timestamp_arg(spec)?;
        doc.add_timestamp(key, ts);
    }

    doc.sort();
    if !source.no_dedup {
        doc.dedup();
    }
    info!(
        fields = doc.len(),
        live = doc.live_fields().count(),
        "document ready"
    );
    Ok(doc)
}

/// Parse `KEY=RFC3339` into a key and a UTC timestamp.
fn parse_timestamp_arg(spec: &str) -> Result<(String, DateTime<Utc>)> {
    let (key, raw) = spec
        .split_once('=')
        .with_context(|| format!("Invalid --timestamp '{}': expected KEY=RFC3339", spec))?;
    if key.is_empty() {
        anyhow::bail!("Invalid --timestamp '{}': key must not be empty", spec);
    }
    let ts = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid --timestamp '{}': bad RFC 3339 time", spec))?;
    Ok((key.to_string(), ts.with_timezone(&Utc)))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_document(doc: &Document, layout: Layout, path: Option<&str>) -> Result<()> {
    let sink: Box<dyn Write> = match path {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create file: {}", path))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut out = BufWriter::new(sink);
    doc.serialize(&mut out, layout)
        .context("Failed to write document")?;
    writeln!(out)?;
    out.flush().context("Failed to flush output")?;
    Ok(())
}
