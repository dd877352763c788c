//! Position-based reconciliation of a freshly read row set against the
//! previously published one.
//!
//! Row `i` of the new pass updates identity `i` when that identity already
//! exists and is added otherwise; surplus old identities are removed from
//! the highest down. Identity is never derived from cell values or from the
//! `::key` column, so an insertion in the middle of the file shows up as a
//! cascade of updates followed by one add.

use log::warn;
use serde::Serialize;

use crate::{error::SourceError, snapshot::Row};

/// Receives the row operations of a reconciliation pass, in emission order.
pub trait RowConsumer: Send {
    fn add_row(&mut self, row: Row);

    fn update_row(&mut self, row: Row);

    fn remove_row(&mut self, identity: &str);

    /// Called when a live pass fails; the previous rows stay published.
    fn report_error(&mut self, error: &SourceError) {
        warn!("Live update failed: {error}");
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum RowOp {
    Add(Row),
    Update(Row),
    Remove { identity: String },
}

impl RowOp {
    pub fn identity(&self) -> &str {
        match self {
            RowOp::Add(row) | RowOp::Update(row) => &row.identity,
            RowOp::Remove { identity } => identity,
        }
    }
}

impl RowConsumer for Vec<RowOp> {
    fn add_row(&mut self, row: Row) {
        self.push(RowOp::Add(row));
    }

    fn update_row(&mut self, row: Row) {
        self.push(RowOp::Update(row));
    }

    fn remove_row(&mut self, identity: &str) {
        self.push(RowOp::Remove {
            identity: identity.to_string(),
        });
    }
}

pub fn reconcile(previous_count: usize, fresh_rows: &[Row], emit: &mut dyn RowConsumer) -> usize {
    for (ordinal, row) in fresh_rows.iter().enumerate() {
        if ordinal < previous_count {
            emit.update_row(row.clone());
        } else {
            emit.add_row(row.clone());
        }
    }

    let fresh_count = fresh_rows.len();
    let mut remaining = previous_count;
    while remaining > fresh_count {
        remaining -= 1;
        emit.remove_row(&remaining.to_string());
    }
    fresh_count
}
