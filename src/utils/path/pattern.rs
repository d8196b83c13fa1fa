//! Glob helpers shared by source scanning, partitions and watch bindings.
//!
//! Patterns are always matched against `/`-separated paths relative to a
//! root, with `*` never crossing a separator (only `**` does).

use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};

/// Options used for every glob match in the crate.
pub const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Static directory prefix of a glob pattern.
///
/// ```ignore
/// glob_base("src/builds/*.css") == "src/builds"
/// glob_base("docs/**")          == "docs"
/// glob_base("*.css")            == ""
/// ```
pub fn glob_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    let segments: Vec<&str> = pattern.split('/').collect();
    // The last segment names files, never the base
    for segment in &segments[..segments.len().saturating_sub(1)] {
        if segment.contains(['*', '?', '[', '{']) {
            break;
        }
        base.push(segment);
    }
    base
}

/// Render a relative path with `/` separators.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Match a relative path against a compiled pattern.
pub fn matches(pattern: &Pattern, relative: &Path) -> bool {
    pattern.matches_with(&to_slash(relative), MATCH_OPTIONS)
}
