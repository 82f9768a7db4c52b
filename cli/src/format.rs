//! Pipe-separated table rendering for the shell's SELECT/JOIN output (§4.7).

use pesadb_core::Row;

/// Renders rows as a pipe-separated table with a header drawn from the
/// first row's key order. An empty result set prints nothing.
pub fn render_rows(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return "(0 rows)".to_string();
    };
    let headers: Vec<&String> = first.keys().collect();
    let mut out = String::new();
    out.push_str(&headers.iter().map(|h| h.as_str()).collect::<Vec<_>>().join(" | "));
    out.push('\n');
    for row in rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| row.get(h).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        out.push_str(&cells.join(" | "));
        out.push('\n');
    }
    out.push_str(&format!("({} row{})", rows.len(), if rows.len() == 1 { "" } else { "s" }));
    out
}
