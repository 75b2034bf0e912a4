//! Plain-text rendering of display tables with spanned header rows.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{header::HeaderCell, project::DisplayTable};

const COLUMN_GAP: usize = 2;

pub fn render_table(table: &DisplayTable) -> String {
    let header_rows = table.header.rows();
    let column_count = table
        .rows
        .iter()
        .map(Vec::len)
        .max()
        .unwrap_or(0)
        .max(table.header.column_count());
    let mut widths = vec![1usize; column_count];

    for row in &table.rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(display_width(&sanitize_cell(cell)));
        }
    }

    // Widen the last column under any label that overflows its span.
    for row in header_rows.iter().rev() {
        let mut start = 0;
        for cell in row {
            let end = (start + cell.span).min(column_count);
            if end > start {
                let available = spanned_width(&widths[start..end]);
                let needed = display_width(&sanitize_cell(&cell.label));
                if needed > available {
                    widths[end - 1] += needed - available;
                }
            }
            start += cell.span;
        }
    }

    let mut output = String::new();

    // Header
    for row in header_rows {
        let _ = writeln!(output, "{}", format_header_row(row, &widths));
    }

    // Separator
    let separator_cells = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator_cells, &widths));

    // Rows
    for row in &table.rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }

    output
}

/// Renders each table followed by a blank line.
pub fn render_tables(tables: &[DisplayTable]) -> String {
    let mut output = String::new();
    for table in tables {
        output.push_str(&render_table(table));
        output.push('\n');
    }
    output
}

pub fn print_tables(tables: &[DisplayTable]) {
    let rendered = render_tables(tables);
    print!("{rendered}");
}

fn spanned_width(widths: &[usize]) -> usize {
    widths.iter().sum::<usize>() + COLUMN_GAP * widths.len().saturating_sub(1)
}

fn format_header_row(cells: &[HeaderCell], widths: &[usize]) -> String {
    let mut parts = Vec::with_capacity(cells.len());
    let mut start = 0;
    for cell in cells {
        let end = (start + cell.span).min(widths.len());
        if end > start {
            let width = spanned_width(&widths[start..end]);
            parts.push(pad_label(&cell.label, width, !cell.is_leaf_row));
        }
        start += cell.span;
    }
    trim_line(parts.join(&" ".repeat(COLUMN_GAP)))
}

fn pad_label(label: &str, width: usize, centered: bool) -> String {
    let sanitized = sanitize_cell(label);
    let padding = width.saturating_sub(display_width(&sanitized));
    let left = if centered { padding / 2 } else { 0 };
    format!(
        "{}{}{}",
        " ".repeat(left),
        sanitized,
        " ".repeat(padding - left)
    )
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let mut cells = Vec::with_capacity(values.len());
    for (idx, value) in values.iter().enumerate() {
        if idx >= widths.len() {
            break;
        }
        cells.push(pad_label(value, widths[idx], false));
    }
    trim_line(cells.join(&" ".repeat(COLUMN_GAP)))
}

fn trim_line(mut line: String) -> String {
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn display_width(value: &str) -> usize {
    let mut width = 0usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            // Skip ANSI escape sequence (e.g. \x1b[31m)
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        let mut sanitized = String::with_capacity(value.len());
        for ch in value.chars() {
            match ch {
                '\n' | '\r' | '\t' => sanitized.push(' '),
                other => sanitized.push(other),
            }
        }
        Cow::Owned(sanitized)
    } else {
        Cow::Borrowed(value)
    }
}
