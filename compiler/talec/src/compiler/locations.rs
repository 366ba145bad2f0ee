//! Clean-up of recorded location maps.

use tale_ir::SourceLocation;

use crate::program::LocationMap;

/// Pull ends at column 0 of a later line back to the end of the previous
/// line. `line_length(script, line)` gives a line's length in characters.
pub(crate) fn normalize(map: &mut LocationMap, line_length: impl Fn(u32, u32) -> Option<u32>) {
    for location in map.values_mut() {
        normalize_one(location, &line_length);
    }
}

fn normalize_one(location: &mut SourceLocation, line_length: &impl Fn(u32, u32) -> Option<u32>) {
    if location.end_col != 0 || location.end_line <= location.start_line {
        return;
    }
    let line = location.end_line - 1;
    if let Some(length) = line_length(location.script_index, line) {
        location.end_line = line;
        location.end_col = length;
    }
}

/// Order by `(script_index, line, column)`, then path.
pub(crate) fn sort(map: &mut LocationMap) {
    map.sort_by(|path_a, a, path_b, b| a.cmp_by_start(b).then_with(|| path_a.cmp(path_b)));
}
