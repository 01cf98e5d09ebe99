//! Path utilities for the lab filesystem.
//!
//! All functions here are pure string transforms. Walking the tree is done
//! by the engine on top of [`components`].

/// Resolve `path` against `cwd` and `home` into a canonical absolute path.
///
/// `~` at the start is replaced by `home`, relative paths are joined onto
/// `cwd`, then `.` and `..` are folded textually. `..` at the root stays at
/// the root.
pub fn resolve(path: &str, cwd: &str, home: &str) -> String {
    if path.is_empty() {
        return normalize(cwd);
    }

    let expanded = match path.strip_prefix('~') {
        Some(rest) => format!("{}{}", home, rest),
        None => path.to_string(),
    };

    if expanded.starts_with('/') {
        normalize(&expanded)
    } else {
        normalize(&format!("{}/{}", cwd, expanded))
    }
}

/// Fold `.`, `..` and empty segments of a path into canonical absolute form.
pub fn normalize(path: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();

    for component in path.split('/') {
        match component {
            "" | "." => continue,
            ".." => {
                stack.pop();
            }
            c => stack.push(c),
        }
    }

    if stack.is_empty() {
        return String::from("/");
    }

    let mut result = String::new();
    for component in stack {
        result.push('/');
        result.push_str(component);
    }
    result
}

/// Non-empty segments of an absolute path.
pub fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|c| !c.is_empty())
}

/// Get the parent path of a given path.
pub fn parent_path(path: &str) -> String {
    if path == "/" {
        return String::from("/");
    }

    match path.rfind('/') {
        Some(0) => String::from("/"),
        Some(pos) => String::from(&path[..pos]),
        None => String::from("/"),
    }
}

/// Get the filename (last component) of a path.
pub fn filename(path: &str) -> &str {
    if path == "/" {
        return "";
    }

    match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// Join two path components.
pub fn join_path(base: &str, name: &str) -> String {
    if base == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", base, name)
    }
}

/// Check if a path is under a given base path.
pub fn is_under(path: &str, base: &str) -> bool {
    if base == "/" {
        return true;
    }

    path.starts_with(base) && (path.len() == base.len() || path.as_bytes()[base.len()] == b'/')
}

/// Replace a leading `home` with `~`, as shells do in the prompt.
pub fn abbreviate_home(path: &str, home: &str) -> String {
    if home.is_empty() || home == "/" || !is_under(path, home) {
        return path.to_string();
    }
    format!("~{}", &path[home.len()..])
}
