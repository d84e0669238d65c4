//! Post-processes Marlin flavor gcode so that every layer change z-hops before
//! travelling to the new layer's start, and primes the extruder on the first
//! move of the new layer instead of in the wrong order.

use std::ffi::OsString;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

pub mod config;
mod error;
pub mod layers;
pub mod line;
pub mod prime;
pub mod zhop;

pub use config::FixupConfig;
pub use error::FixupError;

use line::{Line, PROCESSED_MARKER};

/// Reads `input_filename`, fixes every layer change, and writes the result to
/// `config.output_path()`. Returns the path written.
///
/// The output can be the same file as the input; nothing is overwritten until
/// the complete output has been written to a temporary file next to it.
pub fn process_file(input_filename: &Path, config: &FixupConfig) -> Result<PathBuf, FixupError> {
    config.validate()?;
    let output_filename = config.output_path();

    info!(input = %input_filename.display(), output = %output_filename.display(), "processing");
    let before = Instant::now();

    let lines = read_lines(input_filename)?;
    let line_count = lines.len();
    let lines = process_lines(lines, config)?;
    write_lines_atomic(&output_filename, &lines)?;

    info!(lines = line_count, elapsed = ?before.elapsed(), "done");
    Ok(output_filename)
}

/// Runs the layer change fixups over an already-read document and returns the
/// rewritten document, with the processed marker inserted as line 2.
pub fn process_lines(mut lines: Vec<String>, config: &FixupConfig) -> Result<Vec<String>, FixupError> {
    check_preconditions(&lines, config)?;

    // Rewrites never add or remove lines, so indices collected up front stay valid.
    let mut boundaries = layers::layer_boundaries(&lines);
    if boundaries.next().is_none() {
        return Err(FixupError::SearchExhausted { target: "layer marker", from: 1 });
    }
    let boundaries: Vec<usize> = boundaries.collect();

    for &boundary in &boundaries {
        debug!(line = boundary + 1, "layer change");
        if config.hop_enabled() {
            zhop::apply_zhop(&mut lines, boundary, config.zhop)?;
        }
        prime::apply_prime(&mut lines, boundary, config.prime_amount)?;
    }

    lines.insert(1, PROCESSED_MARKER.to_owned());
    info!(layer_changes = boundaries.len(), "fixed layer changes");
    Ok(lines)
}

fn check_preconditions(lines: &[String], config: &FixupConfig) -> Result<(), FixupError> {
    let is = |index: usize, want: Line| match lines.get(index) {
        Some(text) => matches!(line::classify(index, text), Ok(kind) if kind == want),
        None => false,
    };
    if !is(0, Line::Header) {
        return Err(FixupError::InvalidFormat { expected: line::HEADER });
    }
    if is(1, Line::Processed) {
        return Err(FixupError::AlreadyProcessed);
    }
    config.check_prime_amount()
}

/// Reads the whole file into memory as lines, with `\n` / `\r\n` stripped.
pub fn read_lines(filename: &Path) -> Result<Vec<String>, FixupError> {
    let file = fs::File::open(filename).map_err(|e| FixupError::io(filename, e))?;
    io::BufReader::with_capacity(64 * 1024, file)
        .lines()
        .collect::<io::Result<Vec<String>>>()
        .map_err(|e| FixupError::io(filename, e))
}

/// Writes every line followed by `\n`.
pub fn write_lines<W: Write>(lines: &[String], mut writer: W) -> io::Result<()> {
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()
}

fn write_lines_atomic(output_filename: &Path, lines: &[String]) -> Result<(), FixupError> {
    let mut tmp: OsString = output_filename.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp_filename = PathBuf::from(tmp);

    let written = fs::File::create(&tmp_filename)
        .and_then(|file| write_lines(lines, io::BufWriter::with_capacity(8 * 1024, file)));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_filename);
        return Err(FixupError::io(&tmp_filename, e));
    }
    fs::rename(&tmp_filename, output_filename).map_err(|e| {
        let _ = fs::remove_file(&tmp_filename);
        FixupError::io(output_filename, e)
    })
}
