//! Console rendering for the CLI: pages, schemas and streamed row operations.

use std::io::{self, Write};

use crate::{
    cli::OutputFormat,
    error::SourceError,
    reconcile::{RowConsumer, RowOp},
    schema::HeaderInfo,
    snapshot::{Row, Snapshot},
    table,
};

pub fn render_schema(header: &HeaderInfo) -> String {
    let headers = vec![
        "#".to_string(),
        "name".to_string(),
        "type".to_string(),
        "key".to_string(),
    ];
    let rows = header
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let key = if header.key_column_index == Some(idx) {
                "yes"
            } else {
                ""
            };
            vec![
                (idx + 1).to_string(),
                column.name.clone(),
                column.column_type.to_string(),
                key.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    table::render_table(&headers, &rows)
}

pub fn render_snapshot(snapshot: &Snapshot, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Table => Ok(table::render_page(snapshot.columns(), &snapshot.rows)),
        OutputFormat::Json => serde_json::to_string_pretty(snapshot).map(|json| json + "\n"),
    }
}

pub fn render_op(op: &RowOp, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string(op),
        OutputFormat::Table => Ok(match op {
            RowOp::Add(row) => format!("+ {}", describe_row(row)),
            RowOp::Update(row) => format!("~ {}", describe_row(row)),
            RowOp::Remove { identity } => format!("- {identity}"),
        }),
    }
}

fn describe_row(row: &Row) -> String {
    let cells = row
        .cells
        .iter()
        .map(|cell| cell.as_display())
        .collect::<Vec<_>>()
        .join(" | ");
    format!("{}: {cells}", row.identity)
}

/// Writes every received operation to stdout as soon as it is emitted.
pub struct ConsoleConsumer {
    format: OutputFormat,
}

impl ConsoleConsumer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    fn emit(&mut self, op: RowOp) {
        match render_op(&op, self.format) {
            Ok(line) => {
                let mut stdout = io::stdout().lock();
                let _ = writeln!(stdout, "{line}");
                let _ = stdout.flush();
            }
            Err(err) => log::error!("Failed to render operation for row {}: {err}", op.identity()),
        }
    }
}

impl RowConsumer for ConsoleConsumer {
    fn add_row(&mut self, row: Row) {
        self.emit(RowOp::Add(row));
    }

    fn update_row(&mut self, row: Row) {
        self.emit(RowOp::Update(row));
    }

    fn remove_row(&mut self, identity: &str) {
        self.emit(RowOp::Remove {
            identity: identity.to_string(),
        });
    }

    fn report_error(&mut self, error: &SourceError) {
        eprintln!("error: {error}");
    }
}
