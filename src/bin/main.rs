//! hwp2md CLI - decode an HWP 5.0 document and print its IR as JSON.

use clap::Parser;
use hwp2md::detect::detect_format_from_extension;
use hwp2md::{parse_file, Error, ParseOptions};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

/// Decode HWP 5.0 documents into a Markdown-ready JSON tree
#[derive(Parser)]
#[command(name = "hwp2md", version, about = "Decode HWP 5.0 documents to IR JSON")]
struct Cli {
    /// Input .hwp file
    input: PathBuf,

    /// Resolve picture controls into image blocks
    #[arg(long)]
    extract_images: bool,

    /// Write extracted images into this directory (implies --extract-images)
    #[arg(long, value_name = "DIR")]
    image_dir: Option<PathBuf>,

    /// Skip sections that fail to decode instead of aborting
    #[arg(long)]
    lenient: bool,

    /// Output file path (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output compact JSON (no indentation)
    #[arg(long)]
    compact: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let mut options = ParseOptions::new().with_images(cli.extract_images);
    if let Some(dir) = &cli.image_dir {
        options = options.with_image_dir(dir);
    }
    if cli.lenient {
        options = options.lenient();
    }

    if detect_format_from_extension(&cli.input).is_none() {
        log::warn!("{}: unexpected extension, detecting by content", cli.input.display());
    }

    let document = match parse_file(&cli.input, &options) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Error: {}", describe(&e));
            return ExitCode::FAILURE;
        }
    };

    let json = if cli.compact {
        serde_json::to_string(&document).map_err(|e| e.to_string())
    } else {
        document.to_json().map_err(|e| e.to_string())
    };
    let json = match json {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error: failed to serialize document: {e}");
            return ExitCode::FAILURE;
        }
    };

    match &cli.output {
        Some(path) => {
            if let Err(e) = fs::write(path, json) {
                eprintln!("Error: failed to write {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        }
        None => println!("{json}"),
    }

    ExitCode::SUCCESS
}

fn describe(error: &Error) -> String {
    match error {
        Error::NotAFile(path) => format!("input file not found: {}", path.display()),
        e if e.is_protection() => format!("cannot decode protected document ({e})"),
        Error::UnknownFormat => "unrecognized file format (not an HWP document)".to_string(),
        Error::UnsupportedFormat(name) => format!("{name} documents are not supported"),
        e => format!("failed to parse document: {e}"),
    }
}
