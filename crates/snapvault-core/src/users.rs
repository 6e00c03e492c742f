use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;

/// Read one username per line. Blank lines are skipped and duplicates are
/// collapsed in first-seen order.
pub fn users_from_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let file =
        File::open(path).with_context(|| format!("opening user file {}", path.display()))?;
    let mut users = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.with_context(|| format!("reading user file {}", path.display()))?;
        push_unique(&mut users, line.trim());
    }
    Ok(users)
}

/// Split a comma-separated `--user` value into usernames.
pub fn users_from_list(list: &str) -> Vec<String> {
    let mut users = Vec::new();
    for part in list.split(',') {
        push_unique(&mut users, part.trim());
    }
    users
}

fn push_unique(users: &mut Vec<String>, name: &str) {
    if name.is_empty() {
        return;
    }
    if users.iter().any(|existing| existing == name) {
        return;
    }
    users.push(name.to_string());
}
