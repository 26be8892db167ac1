//! `.gerrit-cherry-ignore` discovery and parsing.
//!
//! The file lists changes that should be treated as already merged, one
//! `<Change-Id> <commit-id>` pair per line. It is looked up from a starting
//! directory upward, and the nearest file wins.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use crate::record::IgnoreEntry;

pub const IGNORE_FILE_NAME: &str = ".gerrit-cherry-ignore";

/// `I` followed by 40 hex digits
const MAX_CHANGE_ID_LEN: usize = 41;
const MAX_COMMIT_ID_LEN: usize = 40;

/// Find the nearest ignore file at or above `start`.
///
/// Any entry with the sentinel name stops the search, even one that later
/// turns out to be unreadable.
pub fn find_ignore_file(start: &Path) -> Option<PathBuf> {
    let mut dir = std::path::absolute(start).unwrap_or_else(|_| start.to_path_buf());

    loop {
        let candidate = dir.join(IGNORE_FILE_NAME);
        match fs::metadata(&candidate) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            _ => {
                debug!("Found ignore file at {}", candidate.display());
                return Some(candidate);
            }
        }

        match dir.parent() {
            Some(parent) if parent != dir => dir = parent.to_path_buf(),
            _ => {
                trace!("No {} above {}", IGNORE_FILE_NAME, start.display());
                return None;
            }
        }
    }
}

/// Parse ignore file contents. Malformed lines are skipped.
pub fn parse_ignore_list(content: &str) -> Vec<IgnoreEntry> {
    let mut entries = Vec::new();

    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        match (tokens.next(), tokens.next()) {
            (Some(change_id), Some(commit_id)) => entries.push(IgnoreEntry::new(
                bounded(change_id, MAX_CHANGE_ID_LEN),
                bounded(commit_id, MAX_COMMIT_ID_LEN),
            )),
            _ => debug!("Skipping malformed ignore line {}: {:?}", lineno + 1, line),
        }
    }

    entries
}

/// Read an ignore file; an unreadable file yields no entries
pub fn read_ignore_file(path: &Path) -> Vec<IgnoreEntry> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let entries = parse_ignore_list(&content);
            debug!("Loaded {} ignore entries from {}", entries.len(), path.display());
            entries
        }
        Err(e) => {
            warn!("Cannot read {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Search upward from `start` and load the first ignore file found
pub fn load_ignore_list(start: &Path) -> Vec<IgnoreEntry> {
    find_ignore_file(start)
        .map(|path| read_ignore_file(&path))
        .unwrap_or_default()
}

fn bounded(token: &str, max_chars: usize) -> &str {
    match token.char_indices().nth(max_chars) {
        Some((end, _)) => &token[..end],
        None => token,
    }
}
