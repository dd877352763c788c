use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{schema::ColumnSpec, snapshot::Row};

/// Renders a page as an aligned text table. The first column carries the
/// row identity; headers show `name:Type`.
pub fn render_page(columns: &[ColumnSpec], rows: &[Row]) -> String {
    let mut headers = Vec::with_capacity(columns.len() + 1);
    headers.push("#".to_string());
    headers.extend(
        columns
            .iter()
            .map(|column| format!("{}:{}", column.name, column.column_type)),
    );
    let body = rows
        .iter()
        .map(|row| {
            let mut cells = Vec::with_capacity(row.cells.len() + 1);
            cells.push(row.identity.clone());
            cells.extend(row.cells.iter().map(|cell| cell.as_display()));
            cells
        })
        .collect::<Vec<_>>();
    render_table(&headers, &body)
}

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|h| h.chars().count().max(1))
        .collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(sanitize_cell(cell).chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let separator = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| format!("{:<width$}", sanitize_cell(value), width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::Cell, schema::ColumnType};

    #[test]
    fn page_table_lists_identity_and_typed_headers() {
        let columns = vec![
            ColumnSpec::new("Name", ColumnType::String),
            ColumnSpec::new("Count", ColumnType::Integer),
        ];
        let rows = vec![
            Row::new(0, vec![Cell::String("Cisco".into()), Cell::Integer(36)]),
            Row::new(1, vec![Cell::String("multi\nline".into()), Cell::Integer(7)]),
        ];
        let rendered = render_page(&columns, &rows);
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "#  Name:String  Count:Integer");
        assert_eq!(lines[1], "-  -----------  -------------");
        assert_eq!(lines[2], "0  Cisco        36");
        assert_eq!(lines[3], "1  multi line   7");
    }
}
