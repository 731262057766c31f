//! AbiForge CLI — human-readable signatures in, calldata out (and back).
//!
//! # Commands
//! ```
//! abiforge parse    --sig <signature>... [--file <path>] [--json]
//! abiforge selector --sig <signature>
//! abiforge encode   --sig <signature> --args <json-array>
//! abiforge decode   --sig <signature> --data <hex> [--raw] [--json]
//! abiforge resolve  --sig <signature>... (--data <hex> | --args <json-array>)
//! ```

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use abiforge_codec::{decode, decode_call, encode_call, resolve_by_args, resolve_by_data};
use abiforge_core::{AbiItem, AbiValue, Keccak256};
use abiforge_parser::{canonical_signature, parse_abi, selector, topic};

#[derive(Parser)]
#[command(
    name = "abiforge",
    about = "Ethereum ABI toolkit — signatures, selectors, calldata",
    long_about = "
AbiForge CLI: parse human-readable ABI signatures, compute selectors,
encode and decode calldata, and resolve overloads.

Signatures are given with --sig (repeatable) or one per line in a file
passed with --file; blank lines and lines starting with '#' are skipped.
Struct definitions in the batch are inlined into referencing signatures.
",
    version
)]
struct Cli {
    /// Enable verbose tracing output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse signatures and print their canonical forms and selectors
    Parse {
        /// A human-readable signature (repeatable)
        #[arg(long = "sig")]
        sigs: Vec<String>,
        /// File with one signature per line
        #[arg(long)]
        file: Option<PathBuf>,
        /// Output the parsed items as ABI JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the 4-byte selector (functions/errors) or topic0 (events)
    Selector {
        /// The signature to hash
        #[arg(long = "sig")]
        sig: String,
    },

    /// Encode calldata for a function or error
    Encode {
        /// The signature to encode against
        #[arg(long = "sig")]
        sig: String,
        /// JSON array of arguments, e.g. '["0xabc...", "1000000"]'
        #[arg(long)]
        args: String,
    },

    /// Decode calldata (or a bare parameter region with --raw)
    Decode {
        /// The signature to decode against
        #[arg(long = "sig")]
        sig: String,
        /// Hex data, 0x-prefixed or not
        #[arg(long)]
        data: String,
        /// Data has no 4-byte selector prefix
        #[arg(long)]
        raw: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Pick one overload out of several same-named signatures
    Resolve {
        /// Candidate signatures sharing one name (repeatable)
        #[arg(long = "sig")]
        sigs: Vec<String>,
        /// File with one signature per line
        #[arg(long)]
        file: Option<PathBuf>,
        /// Raw calldata or topic0 to resolve by
        #[arg(long)]
        data: Option<String>,
        /// JSON array of arguments to resolve by
        #[arg(long)]
        args: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
    }

    match cli.command {
        Commands::Parse { sigs, file, json } => cmd_parse(&load_signatures(sigs, file)?, json),
        Commands::Selector { sig } => cmd_selector(&sig),
        Commands::Encode { sig, args } => cmd_encode(&sig, &args),
        Commands::Decode { sig, data, raw, json } => cmd_decode(&sig, &data, raw, json),
        Commands::Resolve { sigs, file, data, args } => {
            cmd_resolve(&load_signatures(sigs, file)?, data.as_deref(), args.as_deref())
        }
    }
}

/// Merge `--sig` values with the lines of `--file`, if given.
fn load_signatures(mut sigs: Vec<String>, file: Option<PathBuf>) -> Result<Vec<String>> {
    if let Some(path) = file {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("read signature file '{}'", path.display()))?;
        sigs.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(str::to_string),
        );
    }
    if sigs.is_empty() {
        anyhow::bail!("no signatures given (use --sig or --file)");
    }
    Ok(sigs)
}

// ─── Command implementations ─────────────────────────────────────────────────

fn cmd_parse(sigs: &[String], as_json: bool) -> Result<()> {
    let items = parse_abi(sigs)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    for item in &items {
        println!("{item}");
        if let Some(canonical) = canonical_signature(item) {
            println!("  canonical: {canonical}");
        }
        if let Some(sel) = selector(item, &Keccak256) {
            println!("  selector:  0x{}", hex::encode(sel));
        }
        if let Some(topic0) = topic(item, &Keccak256) {
            println!("  topic0:    0x{}", hex::encode(topic0));
        }
    }
    Ok(())
}

fn cmd_selector(sig: &str) -> Result<()> {
    let item = parse_one(sig)?;
    if let Some(sel) = selector(&item, &Keccak256) {
        println!("0x{}", hex::encode(sel));
    } else if let Some(topic0) = topic(&item, &Keccak256) {
        println!("0x{}", hex::encode(topic0));
    } else {
        anyhow::bail!("'{}' items have no selector", item.kind());
    }
    Ok(())
}

fn cmd_encode(sig: &str, args_json: &str) -> Result<()> {
    let item = parse_one(sig)?;
    let values = parse_args(&item, args_json)?;
    let calldata = encode_call(&item, &values, &Keccak256)?;
    println!("0x{}", hex::encode(&calldata));
    Ok(())
}

fn cmd_decode(sig: &str, data: &str, raw: bool, as_json: bool) -> Result<()> {
    let item = parse_one(sig)?;
    let bytes = decode_hex(data)?;

    let values = if raw {
        decode(item.inputs(), &bytes)?
    } else {
        decode_call(&item, &bytes, &Keccak256)?
    };

    if as_json {
        let fields: Vec<serde_json::Value> = item
            .inputs()
            .iter()
            .zip(&values)
            .map(|(param, value)| {
                serde_json::json!({
                    "name": param.name,
                    "type": param.canonical_type(),
                    "value": value.to_json(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&fields)?);
    } else {
        println!("{item}");
        for (param, value) in item.inputs().iter().zip(&values) {
            let name = param.name.as_deref().unwrap_or("_");
            println!("  {}: {}", name, value.to_json());
        }
    }
    Ok(())
}

fn cmd_resolve(sigs: &[String], data: Option<&str>, args_json: Option<&str>) -> Result<()> {
    let candidates = parse_abi(sigs)?;

    let resolved = match (data, args_json) {
        (Some(data), None) => {
            let bytes = decode_hex(data)?;
            resolve_by_data(&candidates, &bytes, &Keccak256)?
        }
        (None, Some(args_json)) => {
            // Coerce the JSON against each candidate's own parameter list;
            // the first list the values fit decides the typed shapes.
            let values = candidates
                .iter()
                .find_map(|item| parse_args(item, args_json).ok())
                .ok_or_else(|| anyhow!("arguments fit no candidate's parameter list"))?;
            resolve_by_args(&candidates, &values)?
        }
        _ => anyhow::bail!("pass exactly one of --data or --args"),
    };

    println!("{resolved}");
    if !resolved.overloads().is_empty() {
        println!("overloads:");
        for sibling in resolved.overloads() {
            println!("  {sibling}");
        }
    }
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn parse_one(sig: &str) -> Result<AbiItem> {
    let items = parse_abi(&[sig])?;
    items
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("'{sig}' is a struct definition, not a callable item"))
}

fn parse_args(item: &AbiItem, args_json: &str) -> Result<Vec<AbiValue>> {
    let raw: Vec<serde_json::Value> =
        serde_json::from_str(args_json).context("parse args JSON")?;
    if raw.len() != item.inputs().len() {
        anyhow::bail!(
            "expected {} arguments, got {}",
            item.inputs().len(),
            raw.len()
        );
    }
    item.inputs()
        .iter()
        .zip(&raw)
        .map(|(param, json)| AbiValue::from_json(param, json).map_err(Into::into))
        .collect()
}

fn decode_hex(data: &str) -> Result<Vec<u8>> {
    hex::decode(data.strip_prefix("0x").unwrap_or(data)).context("invalid hex data")
}
