use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use logprob_viz::{TokenVisualizerBuilder, VisualizerConfig};
use serde_json::Value;

#[path = "render_tokens/html_report_formatter.rs"]
mod html_report_formatter;
#[path = "render_tokens/json_report_formatter.rs"]
mod json_report_formatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Single-shot markup fragment.
    Html,
    /// Standalone page with the bucket stylesheet inlined.
    Page,
    /// Structured payloads plus failures.
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "render_tokens")]
#[command(about = "Render per-token probability data as color-coded markup or JSON payloads")]
struct Args {
    /// JSON array of token records, or an object with a `tokens` array.
    #[arg(long, env = "LOGPROB_VIZ_INPUT")]
    input: PathBuf,
    #[arg(long, env = "LOGPROB_VIZ_OUT")]
    out: Option<PathBuf>,
    #[arg(long, env = "LOGPROB_VIZ_CONFIG")]
    config: Option<PathBuf>,
    /// Top-p used during generation. Omit when nucleus restriction was not active.
    #[arg(long, env = "LOGPROB_VIZ_TOP_P")]
    top_p: Option<f64>,
    #[arg(
        long,
        env = "LOGPROB_VIZ_FORMAT",
        value_enum,
        default_value_t = OutputFormat::Html
    )]
    output_format: OutputFormat,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();

    let config = match args.config.as_ref() {
        Some(path) => VisualizerConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => VisualizerConfig::default(),
    };
    let visualizer = TokenVisualizerBuilder::new(config)
        .build()
        .map_err(|err| format!("Failed to build visualizer: {err}"))?;

    let records = load_records(&args.input)?;
    let visualization = visualizer
        .visualize(&records, args.top_p)
        .map_err(|err| format!("Failed to visualize '{}': {err}", args.input.display()))?;

    for failure in &visualization.failures {
        eprintln!("skipped record {}: {}", failure.index, failure.error);
    }

    match args.output_format {
        OutputFormat::Html => {
            html_report_formatter::write_fragment(args.out.as_deref(), &visualization.html)
        }
        OutputFormat::Page => {
            html_report_formatter::write_page(args.out.as_deref(), &visualization.html)
        }
        OutputFormat::Json => {
            let report = json_report_formatter::build_report(
                &args.input,
                records.len(),
                args.top_p,
                visualizer.config(),
                &visualization,
            );
            json_report_formatter::write_report(args.out.as_deref(), &report)
        }
    }
}

fn load_records(path: &Path) -> Result<Vec<Value>, String> {
    let data = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read input '{}': {err}", path.display()))?;
    let document: Value = serde_json::from_str(&data)
        .map_err(|err| format!("Failed to parse input JSON '{}': {err}", path.display()))?;
    match document {
        Value::Array(records) => Ok(records),
        Value::Object(mut map) => match map.remove("tokens") {
            Some(Value::Array(records)) => Ok(records),
            _ => Err(format!(
                "Input '{}' is an object without a `tokens` array",
                path.display()
            )),
        },
        _ => Err(format!(
            "Input '{}' must be an array of records or an object with `tokens`",
            path.display()
        )),
    }
}
