use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use thyroid_ocr_core::{Extractor, ReportMode};
use thyroid_ocr_vendor::fragments_from_response;

#[derive(Parser, Debug)]
#[command(about = "Extract thyroid lab or ultrasound fields from OCR output", version)]
struct Args {
    /// Vendor JSON payload (or a JSON array of text fragments with --fragments). Use - for stdin.
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Report type: lab or ultrasound. Anything else is treated as lab.
    #[arg(long, default_value = "lab")]
    mode: String,

    /// Input is a JSON array of strings instead of a vendor payload
    #[arg(long)]
    fragments: bool,

    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let body = read_input(&args.input)?;

    let fragments: Vec<String> = if args.fragments {
        serde_json::from_str(&body).context("Input is not a JSON array of strings")?
    } else {
        fragments_from_response(&body).context("Failed to read OCR vendor payload")?
    };

    let mode = ReportMode::parse_lenient(&args.mode);
    let report = Extractor::new().extract(fragments.as_slice(), mode);

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        report.to_json()?
    };
    println!("{}", json);

    if report.needs_manual_entry() {
        tracing::warn!("no fields recognized; manual entry required");
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .context("Failed to read stdin")?;
        return Ok(body);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
