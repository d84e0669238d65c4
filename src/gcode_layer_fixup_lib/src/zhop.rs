use tracing::{debug, warn};

use crate::layers::{scan_backward, scan_forward};
use crate::line::{self, Axis, Line};
use crate::FixupError;

/// Makes the travel toward the new layer also lift the nozzle `zhop` above
/// that layer's height, so it doesn't drag across the previous layer before
/// the slicer's own z move happens.
///
/// The rewritten line is the one right after the last `G1` before the layer
/// marker; returns its index.
pub fn apply_zhop(lines: &mut [String], boundary: usize, zhop: f64) -> Result<usize, FixupError> {
    let last_deposit = scan_backward(lines, boundary.saturating_sub(1), "G1 move before layer change", |index, text| {
        Ok(line::classify(index, text)?.is_deposit())
    })?;
    let target = last_deposit + 1;

    let height_line = scan_forward(lines, boundary + 1, "Z height after layer change", |_, text| {
        Ok(line::find_param(text, Axis::Z).is_some())
    })?;
    let height = next_layer_height(height_line, &lines[height_line])?;

    if line::classify(target, &lines[target])? != Line::Travel {
        warn!(line = target + 1, text = %lines[target], "z-hop target after last G1 is not a G0 travel move");
    }

    let hop_to = height + zhop;
    let hopped = line::append_param(&lines[target], Axis::Z, hop_to);
    lines[target] = hopped;
    debug!(line = target + 1, height, hop_to, "added z-hop to travel move");
    Ok(target)
}

// Heights are treated as whole numbers; anything after the decimal point is
// dropped, with a warning since that usually means the input isn't laid out
// the way this tool expects.
fn next_layer_height(index: usize, text: &str) -> Result<f64, FixupError> {
    let param = line::find_param(text, Axis::Z).ok_or(FixupError::SearchExhausted {
        target: "Z height after layer change",
        from: index + 1,
    })?;
    let height = param.parse(index, text)?;
    if height.fract() != 0.0 {
        warn!(line = index + 1, height, "fractional layer height, truncating to whole units");
    }
    Ok(height.trunc())
}
