use anyhow::{Context, Result};
use clap::Parser;
use gcode_layer_fixup_lib::config::{DEFAULT_OUTPUT_FILE_NAME, DEFAULT_ZHOP};
use gcode_layer_fixup_lib::{process_file, FixupConfig};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Layer change post-processing for Marlin flavor gcode. Some Cura versions
/// neither z-hop before travelling to a new layer nor prime the extruder in the
/// right order after the layer change; this rewrites the gcode to do both.
#[derive(Parser, Debug)]
#[command(name = "gcode_layer_fixup", version, allow_negative_numbers = true)]
struct Args {
    /// Name of file to be processed.
    input_file: PathBuf,

    /// Amount to prime the extruder at each layer change, 400 or less.
    prime_amount: f64,

    /// Name of the output file.
    #[arg(short = 'o', long, alias = "output_file_name", default_value = DEFAULT_OUTPUT_FILE_NAME)]
    output_file_name: String,

    /// Output directory. Defaults to the current directory.
    #[arg(short = 'd', long, alias = "output_directory")]
    output_directory: Option<PathBuf>,

    /// Hop this far above the next layer while travelling to its start. 0
    /// disables z-hopping.
    #[arg(short = 'z', long, default_value_t = DEFAULT_ZHOP)]
    zhop: f64,

    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    let output_directory = match args.output_directory {
        Some(dir) => dir,
        None => env::current_dir().context("could not determine current directory")?,
    };
    let config = FixupConfig::new(args.prime_amount)
        .with_zhop(args.zhop)
        .with_output_directory(output_directory)
        .with_output_file_name(args.output_file_name);

    let written = process_file(&args.input_file, &config)
        .with_context(|| format!("failed to process {}", args.input_file.display()))?;
    info!(output = %written.display(), "wrote output");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    info!("gcode_layer_fixup starting");
    run(args)
}
