use regex::Regex;
use std::sync::OnceLock;

use crate::FixupError;

pub const HEADER: &str = ";FLAVOR:Marlin";
// Spelling has to stay as-is so files marked by older runs are still recognized.
pub const PROCESSED_MARKER: &str = ";Modified by Bbase postproccessor";
pub const LAYER_PREFIX: &str = ";LAYER:";
pub const TRAVEL_CODE: &str = "G0";
pub const DEPOSIT_CODE: &str = "G1";
const RESET_PREFIX: &str = "G92 ";

/// What a single gcode line means to the layer fixup. Re-derived from the raw
/// text every time a line is looked at; nothing parsed is kept around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Line {
    Header,
    Processed,
    LayerBoundary,
    /// `G92`, redefines the E zero point.
    Reset,
    /// `G1`. `feed` is the E value when the move has one.
    Deposit { feed: Option<Feed> },
    /// `G0`
    Travel,
    Other,
}

impl Line {
    pub fn is_deposit(&self) -> bool {
        matches!(self, Line::Deposit { .. })
    }

    pub fn feed(&self) -> Option<f64> {
        match self {
            Line::Deposit { feed: Some(feed) } => Some(feed.value),
            _ => None,
        }
    }
}

/// The E value of a `G1`, along with where its numeric text sits in the line
/// so it can be swapped without searching again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feed {
    pub value: f64,
    pub param: Param,
}

/// Classifies `text`, which sits at zero-based `index` in the document. The
/// index is only used for error reporting.
pub fn classify(index: usize, text: &str) -> Result<Line, FixupError> {
    if text.starts_with(HEADER) {
        return Ok(Line::Header);
    }
    if text.starts_with(PROCESSED_MARKER) {
        return Ok(Line::Processed);
    }
    if text.starts_with(LAYER_PREFIX) {
        return Ok(Line::LayerBoundary);
    }
    if text.starts_with(RESET_PREFIX) {
        return Ok(Line::Reset);
    }
    if text.strip_prefix(TRAVEL_CODE).is_some_and(|rest| rest.starts_with(' ')) {
        return Ok(Line::Travel);
    }
    if has_command_code(text, DEPOSIT_CODE) {
        let feed = match find_param(text, Axis::E) {
            Some(param) => Some(Feed { value: param.parse(index, text)?, param }),
            None => None,
        };
        return Ok(Line::Deposit { feed });
    }
    Ok(Line::Other)
}

// "G1" but not "G10"/"G11" (firmware retract).
fn has_command_code(text: &str, code: &str) -> bool {
    match text.strip_prefix(code) {
        Some(rest) => rest.is_empty() || rest.starts_with(&[' ', '\t', ';'][..]),
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Height.
    Z,
    /// Material feed position.
    E,
}

impl Axis {
    pub fn letter(self) -> char {
        match self {
            Axis::Z => 'Z',
            Axis::E => 'E',
        }
    }

    fn regex(self) -> &'static Regex {
        static Z_PARAM: OnceLock<Regex> = OnceLock::new();
        static E_PARAM: OnceLock<Regex> = OnceLock::new();
        // The patterns are fixed literals, so compiling them can't fail at runtime.
        match self {
            Axis::Z => Z_PARAM.get_or_init(|| Regex::new(r"(?:^|\s)Z(?<value>\S*)").unwrap()),
            Axis::E => E_PARAM.get_or_init(|| Regex::new(r"(?:^|\s)E(?<value>\S*)").unwrap()),
        }
    }
}

/// A letter-prefixed parameter token found in a line. `start..end` covers only
/// the numeric text after the letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub axis: Axis,
    pub start: usize,
    pub end: usize,
}

impl Param {
    pub fn text<'a>(&self, line: &'a str) -> &'a str {
        &line[self.start..self.end]
    }

    pub fn parse(&self, index: usize, line: &str) -> Result<f64, FixupError> {
        let text = self.text(line);
        text.parse::<f64>().map_err(|_| FixupError::BadParameter {
            line: index + 1,
            letter: self.axis.letter(),
            text: text.to_owned(),
        })
    }
}

/// Finds the first `axis` parameter in the command part of `line` (anything
/// after `;` is a comment and never matches).
pub fn find_param(line: &str, axis: Axis) -> Option<Param> {
    let captures = axis.regex().captures(command_part(line))?;
    let value = captures.name("value")?;
    Some(Param { axis, start: value.start(), end: value.end() })
}

fn command_part(line: &str) -> &str {
    match line.find(';') {
        Some(comment_start) => &line[..comment_start],
        None => line,
    }
}

/// Adds ` <letter><value>` after the last command token, ahead of any trailing
/// comment so the new parameter is still read as one. A line with no command
/// at all (only a comment) gets it tacked on the end, so markers keep their
/// prefix.
pub fn append_param(line: &str, axis: Axis, value: f64) -> String {
    let code = command_part(line).trim_end();
    if code.is_empty() {
        return format!("{} {}{}", line, axis.letter(), format_number(value));
    }
    format!("{} {}{}{}", code, axis.letter(), format_number(value), &line[code.len()..])
}

/// Swaps the numeric text of `param` for `value`, leaving the rest of the line
/// untouched.
pub fn replace_param(line: &str, param: &Param, value: f64) -> String {
    let mut out = String::with_capacity(line.len() + 8);
    out.push_str(&line[..param.start]);
    out.push_str(&format_number(value));
    out.push_str(&line[param.end..]);
    out
}

/// Shortest round-tripping decimal, never in exponent form.
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}
