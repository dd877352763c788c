#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use csv_live::{Row, RowConsumer, RowOp, SourceError};
use tempfile::{TempDir, tempdir};

pub const EVENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Replaces `name` in one step by renaming a fully written sibling over
    /// it, so a watcher never observes a half-written file.
    pub fn replace(&self, name: &str, contents: &str) -> PathBuf {
        let staging = self.write(&format!(".{name}.staging"), contents);
        let path = self.temp_dir.path().join(name);
        fs::rename(&staging, &path).expect("rename staged file");
        path
    }
}

#[derive(Debug)]
pub enum Observed {
    Op(RowOp),
    Error(String),
}

/// Forwards every consumer callback onto a channel the test can block on.
pub struct ChannelConsumer {
    sender: Sender<Observed>,
}

pub fn channel_consumer() -> (ChannelConsumer, Receiver<Observed>) {
    let (sender, receiver) = mpsc::channel();
    (ChannelConsumer { sender }, receiver)
}

impl RowConsumer for ChannelConsumer {
    fn add_row(&mut self, row: Row) {
        let _ = self.sender.send(Observed::Op(RowOp::Add(row)));
    }

    fn update_row(&mut self, row: Row) {
        let _ = self.sender.send(Observed::Op(RowOp::Update(row)));
    }

    fn remove_row(&mut self, identity: &str) {
        let _ = self.sender.send(Observed::Op(RowOp::Remove {
            identity: identity.to_string(),
        }));
    }

    fn report_error(&mut self, error: &SourceError) {
        let _ = self.sender.send(Observed::Error(error.to_string()));
    }
}

/// Blocks until `count` row operations arrive, skipping reported errors.
pub fn next_ops(receiver: &Receiver<Observed>, count: usize) -> Vec<RowOp> {
    let mut ops = Vec::with_capacity(count);
    while ops.len() < count {
        match receiver.recv_timeout(EVENT_TIMEOUT) {
            Ok(Observed::Op(op)) => ops.push(op),
            Ok(Observed::Error(_)) => continue,
            Err(err) => panic!("expected {count} op(s), got {}: {err}", ops.len()),
        }
    }
    ops
}

/// Blocks until the consumer reports an error.
pub fn next_error(receiver: &Receiver<Observed>) -> String {
    loop {
        match receiver.recv_timeout(EVENT_TIMEOUT) {
            Ok(Observed::Error(message)) => return message,
            Ok(Observed::Op(_)) => continue,
            Err(err) => panic!("expected an error report: {err}"),
        }
    }
}
