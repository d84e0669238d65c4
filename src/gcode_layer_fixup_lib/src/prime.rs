use tracing::debug;

use crate::layers::scan_backward;
use crate::line::{self, Axis, Line, DEPOSIT_CODE, TRAVEL_CODE};
use crate::FixupError;

/// Turns the first travel of the new layer into the prime move, then shifts
/// every following E value by the same `prime_amount` until the next `G92`
/// reset, so the absolute E coordinate stays consistent with the extra
/// material pushed.
pub fn apply_prime(lines: &mut [String], boundary: usize, prime_amount: f64) -> Result<(), FixupError> {
    let prime_index = boundary + 1;
    match lines.get(prime_index) {
        Some(text) if line::classify(prime_index, text)? == Line::Travel => {}
        found => {
            return Err(FixupError::StructuralAssumption {
                line: prime_index + 1,
                found: found.cloned().unwrap_or_else(|| "end of file".to_owned()),
            })
        }
    }

    let last_feed_line = scan_backward(lines, boundary, "G1 move with E before layer change", |index, text| {
        Ok(line::classify(index, text)?.feed().is_some())
    })?;
    let position = line::classify(last_feed_line, &lines[last_feed_line])?
        .feed()
        .unwrap_or_default();

    let primed = position + prime_amount;
    let deposit = format!("{}{}", DEPOSIT_CODE, &lines[prime_index][TRAVEL_CODE.len()..]);
    lines[prime_index] = line::append_param(&deposit, Axis::E, primed);
    debug!(line = prime_index + 1, from = position, to = primed, "converted travel into prime move");

    let (reset_index, adjusted) = shift_feeds_until_reset(lines, prime_index + 1, prime_amount)?;
    debug!(adjusted, reset_line = reset_index + 1, "shifted E values up to reset");
    Ok(())
}

// Returns the index of the reset line and how many moves were adjusted.
fn shift_feeds_until_reset(lines: &mut [String], from: usize, offset: f64) -> Result<(usize, usize), FixupError> {
    let mut adjusted = 0;
    for index in from..lines.len() {
        match line::classify(index, &lines[index])? {
            Line::Reset => return Ok((index, adjusted)),
            Line::Deposit { feed: Some(feed) } => {
                let updated = line::replace_param(&lines[index], &feed.param, feed.value + offset);
                lines[index] = updated;
                adjusted += 1;
            }
            _ => {}
        }
    }
    Err(FixupError::SearchExhausted { target: "G92 reset after layer change", from: from + 1 })
}
