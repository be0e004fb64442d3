//! `kpjson`: reformat JSON documents and read or write fields by key path.
//!
//! ## Usage
//!
//! ```sh
//! # Validate and re-emit compact JSON (stdin → stdout)
//! echo '{"a": {"b": 1}}' | kpjson format
//!
//! # Pretty-print from file to file
//! kpjson format --indent 2 -i config.json -o config.pretty.json
//!
//! # Read one field
//! kpjson get wifi.ssid -i config.json --raw
//!
//! # Write fields, starting from an existing document
//! kpjson set wifi.channel=11 wifi.ssid=home -i config.json -o config.json
//! ```
//!
//! Diagnostics go to stderr; set `RUST_LOG=debug` to see parser and encoder
//! events.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use keypath_json::{
    Decoder, EncodeError, Encoder, FormatOptions, MergePolicy, ParserConfig, Value,
};
use std::io::{self, Read};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "kpjson",
    version,
    about = "Reformat JSON documents and read or write fields by key path"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Maximum nesting depth accepted when parsing input and produced by `set`
    #[arg(long, global = true, default_value_t = ParserConfig::default().max_depth)]
    max_depth: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a document and write it back out (fails on malformed input)
    Format {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Pretty-print with this many spaces per level
        #[arg(long)]
        indent: Option<usize>,
        /// Fractional digits kept for non-integral numbers
        #[arg(long, default_value_t = FormatOptions::default().precision)]
        precision: usize,
    },
    /// Print the value stored at a key path
    Get {
        /// Dotted key path, e.g. `wifi.ssid`
        key_path: String,
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Print strings without surrounding quotes
        #[arg(long)]
        raw: bool,
    },
    /// Write `KEY_PATH=VALUE` assignments into a document
    Set {
        /// Assignments applied in order; VALUE is read as JSON when it parses,
        /// otherwise as a string
        #[arg(required = true)]
        assignments: Vec<String>,
        /// Document to start from (an empty object if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Refuse to replace an object with a scalar or a scalar with an object
        #[arg(long)]
        strict: bool,
        /// Pretty-print with this many spaces per level
        #[arg(long)]
        indent: Option<usize>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let parser_config = ParserConfig {
        max_depth: cli.max_depth,
    };

    match cli.command {
        Commands::Format {
            input,
            output,
            indent,
            precision,
        } => {
            let text = read_input(input.as_deref())?;
            let value = parse_document(&text, parser_config)?;
            let options = FormatOptions {
                precision,
                indent,
                ..FormatOptions::default()
            };
            write_output(output.as_deref(), &keypath_json::serialize_with(&value, &options))?;
        }
        Commands::Get {
            key_path,
            input,
            raw,
        } => {
            let text = read_input(input.as_deref())?;
            let decoder = Decoder::new(parse_document(&text, parser_config)?)
                .context("Document root must be an object")?;
            let value = decoder
                .lookup_value(&key_path)
                .with_context(|| format!("Failed to read key path '{}'", key_path))?;
            let rendered = match value {
                Value::String(s) if raw => s.clone(),
                other => keypath_json::serialize(other),
            };
            println!("{}", rendered);
        }
        Commands::Set {
            assignments,
            input,
            output,
            strict,
            indent,
        } => {
            let mut encoder = match input.as_deref() {
                Some(path) => {
                    let text = read_input(Some(path))?;
                    Encoder::with_root(parse_document(&text, parser_config)?)
                        .context("Document root must be an object")?
                }
                None => Encoder::new(),
            };
            if strict {
                encoder.set_policy(MergePolicy::Strict);
            }
            encoder.set_max_depth(cli.max_depth);
            for assignment in &assignments {
                apply_assignment(&mut encoder, assignment)
                    .with_context(|| format!("Failed to apply '{}'", assignment))?;
            }
            let options = FormatOptions {
                indent,
                ..FormatOptions::default()
            };
            write_output(output.as_deref(), &encoder.to_json_string_with(&options))?;
        }
    }

    Ok(())
}

/// Split `KEY_PATH=VALUE` and encode it. A value that parses as JSON is
/// stored with its JSON type; anything else is stored as a string.
fn apply_assignment(encoder: &mut Encoder, assignment: &str) -> Result<(), EncodeError> {
    let (key_path, raw) = assignment
        .split_once('=')
        .ok_or_else(|| EncodeError::MissingValue(assignment.to_string()))?;
    let value = keypath_json::parse(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    debug!(key_path, kind = value.type_name(), "applying assignment");
    encoder.encode(value, key_path)
}

fn parse_document(text: &str, config: ParserConfig) -> Result<Value> {
    keypath_json::Parser::with_config(text, config)
        .parse()
        .context("Failed to parse JSON input")
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
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

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
