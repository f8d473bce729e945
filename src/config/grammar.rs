//! Line grammar for INI-style configuration text.
//!
//! ```text
//! ; comment
//! [group]
//! key = value
//! key<environment> = value
//! ```

use super::environment::DEFAULT_ENVIRONMENT;
use regex_lite::Regex;
use std::sync::LazyLock;

static GROUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(.*)\]$").expect("group tag pattern"));

static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*=\s*").expect("separator pattern"));

static ENVIRONMENT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b<(.+)>").expect("environment tag pattern"));

const COMMENT_MARKER: char = ';';

/// One meaningful line of configuration text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// `[name]`; the name keeps any whitespace inside the brackets.
    Group(&'a str),
    Assignment(Assignment<'a>),
}

/// A `key<environment> = value` line split into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment<'a> {
    pub name: &'a str,
    /// `__default__` when the key carries no `<environment>` tag.
    pub environment: &'a str,
    /// `None` when the line has no `=` separator.
    pub value: Option<&'a str>,
}

/// Drop everything from the first `;`. Quotes are not special.
pub fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT_MARKER) {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Classify a raw line. Returns `None` for blank and comment-only lines.
pub fn tokenize(line: &str) -> Option<Line<'_>> {
    let line = strip_comment(line).trim();
    if line.is_empty() {
        return None;
    }

    if let Some(caps) = GROUP_TAG.captures(line)
        && let Some(name) = caps.get(1)
    {
        return Some(Line::Group(name.as_str()));
    }

    Some(Line::Assignment(parse_param(line)))
}

/// Split an assignment into parameter name, environment and raw value.
///
/// Splits on the first `=` (with surrounding spaces), then pulls a trailing
/// `<environment>` tag off the key.
pub fn parse_param(text: &str) -> Assignment<'_> {
    let (key, value) = match SEPARATOR.find(text) {
        Some(sep) => (&text[..sep.start()], Some(&text[sep.end()..])),
        None => (text, None),
    };

    let (name, environment) = match ENVIRONMENT_TAG.captures(key) {
        Some(caps) => match (caps.get(0), caps.get(1)) {
            (Some(tag), Some(env)) => (&key[..tag.start()], env.as_str()),
            _ => (key, DEFAULT_ENVIRONMENT),
        },
        None => (key, DEFAULT_ENVIRONMENT),
    };

    Assignment {
        name,
        environment,
        value,
    }
}
