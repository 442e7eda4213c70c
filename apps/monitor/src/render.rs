use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use poller_core::TableRow;

/// Renders rows as a two-column text table with the title column padded.
pub fn format_table(rows: &[TableRow], updated_at: DateTime<Utc>) -> String {
    let width = rows
        .iter()
        .map(|row| row.title.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = format!("-- {} --\n", updated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    for row in rows {
        let _ = writeln!(out, "{:<width$}  {}", row.title, row.value);
    }
    out
}
