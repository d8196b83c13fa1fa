//! Custom property inlining for browsers without `var()`.
//!
//! Every declaration that uses `var(--x)` gets a resolved copy placed before
//! it, so old browsers read the first and modern ones the second:
//!
//! ```css
//! :root { --accent: #0096bf; }
//! a { color: var(--accent); }
//! /* -> */
//! a { color: #0096bf; color: var(--accent); }
//! ```
//!
//! Only `:root` definitions are considered; a reference that cannot be
//! resolved and has no fallback leaves the declaration as it is.

use std::sync::LazyLock;

use parcel_sourcemap::{SourceMap, SourceMapError};
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::asset::Asset;
use crate::pipeline::{PipelineError, Stage};

const MAX_DEPTH: usize = 16;

static ROOT_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":root\s*\{([^}]*)\}").unwrap());

static DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(--[\w-]+)\s*:\s*([^;]+)").unwrap());

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<pre>^|[;{])(?P<ws>\s*)(?P<prop>[A-Za-z-][\w-]*)\s*:\s*(?P<value>[^;{}]*var\([^;{}]*)")
        .unwrap()
});

static ANY_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<pre>^|[;{}])\s*(?P<prop>[A-Za-z-][\w-]*)\s*:\s*(?P<value>[^;{}]*)").unwrap()
});

/// Inline `:root` custom properties, keeping the original declarations.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineVars;

impl Stage for InlineVars {
    fn name(&self) -> &str {
        "css variables"
    }

    fn apply(&self, mut asset: Asset) -> Result<Vec<Asset>, PipelineError> {
        let text = asset.text()?;
        if !text.contains("var(") {
            return Ok(vec![asset]);
        }
        let text = inline_vars(text);
        asset.set_text(text);
        Ok(vec![asset])
    }
}

pub fn inline_vars(css: &str) -> String {
    inline_with(css, |_, _| true, |_| {})
}

/// Where a resolved copy went into the output, in output coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Insertion {
    line: u32,
    column: u32,
    /// Newlines in the inserted text.
    lines: u32,
    /// Column the displaced text starts at afterwards.
    column_after: u32,
}

#[derive(Debug, Default, Clone, Copy)]
struct Cursor {
    line: u32,
    column: u32,
}

impl Cursor {
    fn advance(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += c.len_utf16() as u32;
            }
        }
    }
}

fn inline_with(
    css: &str,
    wanted: impl Fn(&str, &str) -> bool,
    mut inserted: impl FnMut(Insertion),
) -> String {
    let defs = collect_definitions(css);
    let mut out = String::with_capacity(css.len());
    let mut cursor = Cursor::default();
    let mut copied = 0;

    for caps in DECLARATION.captures_iter(css) {
        let (Some(prop), Some(value)) = (caps.name("prop"), caps.name("value")) else {
            continue;
        };
        let (start, prop, value) = (prop.start(), prop.as_str(), value.as_str().trim());
        if prop.starts_with("--") || !wanted(prop, value) {
            continue;
        }
        let Some(resolved) = resolve(value, &defs, 0).filter(|r| r != value) else {
            continue;
        };

        let ws = &caps["ws"];
        let sep = if ws.contains('\n') { ws } else { " " };
        let copy = format!("{prop}: {resolved};{sep}");

        let head = &css[copied..start];
        out.push_str(head);
        cursor.advance(head);
        let at = cursor;
        out.push_str(&copy);
        cursor.advance(&copy);
        inserted(Insertion {
            line: at.line,
            column: at.column,
            lines: cursor.line - at.line,
            column_after: cursor.column,
        });
        copied = start;
    }

    out.push_str(&css[copied..]);
    out
}

fn fallback_key(prop: &str, value: &str) -> (String, String) {
    let value = value.chars().filter(|c| !c.is_whitespace()).collect();
    (prop.to_ascii_lowercase(), value)
}

/// `var()` declarations in `css` that directly follow a plain declaration of
/// the same property.
pub(crate) fn inlined_fallbacks(css: &str) -> FxHashSet<(String, String)> {
    let mut found = FxHashSet::default();
    let mut previous: Option<(&str, &str, usize)> = None;

    for caps in ANY_DECLARATION.captures_iter(css) {
        let (Some(pre), Some(prop), Some(value)) =
            (caps.name("pre"), caps.name("prop"), caps.name("value"))
        else {
            continue;
        };
        let (prop_name, value_text) = (prop.as_str(), value.as_str().trim());

        if let Some((last_prop, last_value, end)) = previous
            && pre.as_str() == ";"
            && pre.start() == end
            && last_prop.eq_ignore_ascii_case(prop_name)
            && !last_value.contains("var(")
            && value_text.contains("var(")
        {
            found.insert(fallback_key(prop_name, value_text));
        }
        previous = Some((prop_name, value_text, value.end()));
    }
    found
}

/// Put back the resolved copies of `fallbacks` that a printer dropped,
/// shifting `map` past each insertion.
pub(crate) fn restore_fallbacks(
    css: &str,
    fallbacks: &FxHashSet<(String, String)>,
    map: Option<&mut SourceMap>,
) -> Result<String, SourceMapError> {
    let mut insertions = Vec::new();
    let out = inline_with(
        css,
        |prop, value| fallbacks.contains(&fallback_key(prop, value)),
        |at| insertions.push(at),
    );

    if let Some(map) = map {
        for at in insertions {
            shift(map, at)?;
        }
    }
    Ok(out)
}

fn shift(map: &mut SourceMap, at: Insertion) -> Result<(), SourceMapError> {
    let delta = i64::from(at.column_after) - i64::from(at.column);
    if at.lines > 0 {
        map.offset_lines(at.line, i64::from(at.lines))?;
        if delta != 0 {
            map.offset_columns(at.line + at.lines, at.column, delta)?;
        }
        Ok(())
    } else {
        map.offset_columns(at.line, at.column, delta)
    }
}

fn collect_definitions(css: &str) -> FxHashMap<String, String> {
    let mut defs = FxHashMap::default();
    for rule in ROOT_RULE.captures_iter(css) {
        for def in DEFINITION.captures_iter(&rule[1]) {
            defs.insert(def[1].to_string(), def[2].trim().to_string());
        }
    }
    defs
}

/// Substitute every `var()` in `value`; `None` when one cannot be resolved.
fn resolve(value: &str, defs: &FxHashMap<String, String>, depth: usize) -> Option<String> {
    if depth > MAX_DEPTH {
        return None;
    }
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("var(") {
        out.push_str(&rest[..start]);
        let inner_start = start + "var(".len();
        let len = close_paren(&rest[inner_start..])?;
        let inner = &rest[inner_start..inner_start + len];

        let (name, fallback) = match top_level_comma(inner) {
            Some(at) => (inner[..at].trim(), Some(inner[at + 1..].trim())),
            None => (inner.trim(), None),
        };
        let substituted = match (defs.get(name), fallback) {
            (Some(def), _) => def.as_str(),
            (None, Some(fallback)) => fallback,
            (None, None) => return None,
        };
        out.push_str(&resolve(substituted, defs, depth + 1)?);
        rest = &rest[inner_start + len + 1..];
    }

    out.push_str(rest);
    Some(out)
}

fn close_paren(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return Some(i),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn top_level_comma(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}
