use std::path::{Path, PathBuf};

pub fn stable_id(input: &str) -> String {
    blake3::hash(input.as_bytes()).to_hex().to_string()
}

pub fn join_relpath(root: &Path, relpath: &str) -> PathBuf {
    let mut out = PathBuf::from(root);
    for part in relpath.split('/') {
        if part.is_empty() {
            continue;
        }
        out.push(part);
    }
    out
}

// MPD writes `begin:` values as full relative paths; those are kept as is.
pub fn join_dir(parent: Option<&str>, name: &str) -> String {
    let parent = match parent {
        Some(parent) if !parent.is_empty() => parent.trim_end_matches('/'),
        _ => return name.to_string(),
    };
    if let Some(rest) = name.strip_prefix(parent) {
        if rest.starts_with('/') {
            return name.to_string();
        }
    }
    format!("{}/{}", parent, name)
}
