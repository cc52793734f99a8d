//! Plain-text rendering of matrix contents for dumps.

use std::fmt::Write;

use frustum_types::Scalar;

/// Formats row-major `values` as one line per row.
pub fn format_rows(values: &[Scalar], cols: usize) -> String {
    let mut out = String::new();
    if cols == 0 {
        return out;
    }
    for row in values.chunks(cols) {
        let line: Vec<String> = row.iter().map(|v| format!("{v:>12.5}")).collect();
        let _ = writeln!(out, "{}", line.join(" "));
    }
    out
}
