//! Candidate backing files under a root directory, for hosts that offer a
//! file picker instead of a free-form path.

use std::{
    fs,
    path::{Path, PathBuf},
};

use itertools::Itertools;

use crate::error::Result;

const CANDIDATE_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

pub fn list_candidates(root: &Path) -> Result<Vec<PathBuf>> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if path.is_file() && has_candidate_extension(&path) {
            candidates.push(path);
        }
    }
    Ok(candidates
        .into_iter()
        .sorted_by_key(|path| path.file_name().map(|name| name.to_ascii_lowercase()))
        .collect())
}

fn has_candidate_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            CANDIDATE_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
}
