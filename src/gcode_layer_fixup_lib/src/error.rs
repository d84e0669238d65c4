use std::io;
use std::path::PathBuf;

/// Everything that can stop a fixup run. None of these are recoverable; the
/// whole file is rejected and no output gets written.
#[derive(Debug, thiserror::Error)]
pub enum FixupError {
    #[error("invalid file: must be Marlin flavor gcode (first line must start with \"{expected}\")")]
    InvalidFormat { expected: &'static str },

    #[error("file has already been modified by this post-processor")]
    AlreadyProcessed,

    #[error("prime amount {amount} is out of range (must be {max} or less)")]
    PrimeOutOfRange { amount: f64, max: f64 },

    #[error("z-hop distance {0} is invalid (must be 0 or more)")]
    InvalidHop(f64),

    /// The line right after a layer marker wasn't the `G0` travel we rewrite
    /// into the prime move.
    #[error("line {line}: expected a G0 travel move right after the layer marker, found {found:?}")]
    StructuralAssumption { line: usize, found: String },

    /// A bounded scan ran off the start or end of the document.
    #[error("no {target} found scanning from line {from}")]
    SearchExhausted { target: &'static str, from: usize },

    #[error("line {line}: could not parse {letter} parameter from {text:?}")]
    BadParameter { line: usize, letter: char, text: String },

    #[error("i/o error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FixupError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> FixupError {
        FixupError::Io { path: path.into(), source }
    }
}
