//! Include path resolution against the open documents.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("cannot find '{path}' (tried {})", .tried.join(", "))]
    NotFound { path: String, tried: Vec<String> },
}

/// Directory part of a uri, with its trailing separator.
fn directory_of(uri: &str) -> &str {
    uri.rfind('/').map_or("", |i| &uri[..=i])
}

/// Join `relative` onto `directory`, folding `.` and `..` segments. An
/// absolute `relative` starts over from the root of `directory`, keeping
/// its scheme and authority.
fn join(directory: &str, relative: &str) -> String {
    let (prefix, directory) = split_root(directory);
    let leading_slash = directory.starts_with('/');
    let (base, rest) = match relative.strip_prefix('/') {
        Some(absolute) => ("", absolute),
        None => (directory, relative),
    };
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    let joined = segments.join("/");
    if leading_slash {
        format!("{prefix}/{joined}")
    } else {
        format!("{prefix}{joined}")
    }
}

/// Split a `scheme://authority/` prefix, like `file:///`, off `uri`.
fn split_root(uri: &str) -> (&str, &str) {
    match uri.find("://") {
        Some(i) => {
            let after = i + 3;
            let root = uri[after..].find('/').map_or(uri.len(), |j| after + j + 1);
            uri.split_at(root)
        }
        None => ("", uri),
    }
}

fn has_extension(path: &str) -> bool {
    path.rsplit('/')
        .next()
        .and_then(|name| name.rfind('.'))
        .is_some_and(|dot| dot > 0)
}

/// Resolve `relative` against the directory of `root_uri`, trying each
/// extension in turn. `exists` decides whether a candidate uri is a known
/// document.
pub fn resolve_file(
    root_uri: &str,
    relative: &str,
    extensions: &[String],
    exists: impl Fn(&str) -> bool,
) -> Result<String, ResolveError> {
    let path = join(directory_of(root_uri), relative.trim());
    let mut tried = Vec::new();
    for ext in extensions {
        if ext.is_empty() && !has_extension(&path) {
            continue;
        }
        let candidate = format!("{path}{ext}");
        if exists(&candidate) {
            return Ok(candidate);
        }
        tried.push(candidate);
    }
    Err(ResolveError::NotFound {
        path: relative.to_string(),
        tried,
    })
}
