use crate::line::{self, Line};
use crate::FixupError;

/// Indices of every `;LAYER:` marker, in file order. The first one is layer 0,
/// which callers skip since nothing has been printed before it.
pub fn layer_boundaries(lines: &[String]) -> impl Iterator<Item = usize> + '_ {
    lines
        .iter()
        .enumerate()
        .filter(|(index, text)| matches!(line::classify(*index, text), Ok(Line::LayerBoundary)))
        .map(|(index, _)| index)
}

/// Walks from `from` (inclusive) down to index 0 and returns the first index
/// where `hit` says yes. Running out of lines is a `SearchExhausted` for
/// `target`.
pub(crate) fn scan_backward(
    lines: &[String],
    from: usize,
    target: &'static str,
    mut hit: impl FnMut(usize, &str) -> Result<bool, FixupError>,
) -> Result<usize, FixupError> {
    let end = (from + 1).min(lines.len());
    for index in (0..end).rev() {
        if hit(index, &lines[index])? {
            return Ok(index);
        }
    }
    Err(FixupError::SearchExhausted { target, from: from + 1 })
}

/// Same as [`scan_backward`], but walks toward the end of the document.
pub(crate) fn scan_forward(
    lines: &[String],
    from: usize,
    target: &'static str,
    mut hit: impl FnMut(usize, &str) -> Result<bool, FixupError>,
) -> Result<usize, FixupError> {
    for index in from..lines.len() {
        if hit(index, &lines[index])? {
            return Ok(index);
        }
    }
    Err(FixupError::SearchExhausted { target, from: from + 1 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Vec<String> {
        text.lines().map(String::from).collect()
    }

    #[test]
    fn finds_every_layer_marker_in_order() {
        let lines = doc(";FLAVOR:Marlin\n;LAYER:0\nG1 X1 E1\n;LAYER:1\nG0 X2\n;LAYER:2\n");
        let found: Vec<usize> = layer_boundaries(&lines).collect();
        assert_eq!(found, vec![1, 3, 5]);
    }

    #[test]
    fn no_markers_yields_nothing() {
        let lines = doc(";FLAVOR:Marlin\nG1 X1 E1\n;LAYER_COUNT:3\n");
        assert_eq!(layer_boundaries(&lines).count(), 0);
    }

    #[test]
    fn backward_scan_includes_start_and_stops_at_zero() {
        let lines = doc("a\nb\nc\n");
        assert_eq!(scan_backward(&lines, 2, "c", |_, t| Ok(t == "c")).unwrap(), 2);
        assert_eq!(scan_backward(&lines, 2, "a", |_, t| Ok(t == "a")).unwrap(), 0);
        let err = scan_backward(&lines, 2, "z", |_, t| Ok(t == "z")).unwrap_err();
        assert!(matches!(err, FixupError::SearchExhausted { target: "z", from: 3 }));
    }

    #[test]
    fn forward_scan_stops_at_end() {
        let lines = doc("a\nb\nc\n");
        assert_eq!(scan_forward(&lines, 1, "c", |_, t| Ok(t == "c")).unwrap(), 2);
        assert!(matches!(
            scan_forward(&lines, 1, "a", |_, t| Ok(t == "a")),
            Err(FixupError::SearchExhausted { .. })
        ));
        assert!(matches!(
            scan_forward(&lines, 10, "a", |_, _| Ok(true)),
            Err(FixupError::SearchExhausted { .. })
        ));
    }
}
