//! Output formatting for resolved configuration: INI-style text, JSON and YAML.

use crate::config::{Config, Value, coerce};
use anyhow::Result;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            _ => Err(format!(
                "Invalid format '{}'. Valid options: text, json, yaml",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

fn serialize<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        _ => serde_json::to_string_pretty(value)? + "\n",
    })
}

/// Render a value the way it would be written in a config file.
///
/// Strings that would coerce to something else, or lose surrounding
/// whitespace when the line is trimmed, are quoted. A `;` always starts a
/// comment, so strings containing one cannot be written back.
pub fn ini_value(value: &Value) -> String {
    match value {
        Value::String(s) if s.trim() != s || coerce(Some(s)) != *value => {
            format!("\"{}\"", s)
        }
        other => other.to_string(),
    }
}

/// A single resolved value.
pub fn render_value(value: &Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format!("{}\n", value)),
        _ => serialize(value, format),
    }
}

/// Group names in declaration order.
pub fn render_groups(config: &Config, format: OutputFormat) -> Result<String> {
    let groups: Vec<&str> = config.groups().collect();
    match format {
        OutputFormat::Text => Ok(groups.iter().map(|g| format!("{}\n", g)).collect()),
        _ => serialize(&groups, format),
    }
}

/// Groups keyed in declaration order, parameters sorted by name.
struct ResolvedView<'a>(&'a Config);

impl Serialize for ResolvedView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for name in self.0.groups() {
            if let Some(group) = self.0.resolved().group(name) {
                map.serialize_entry(name, group)?;
            }
        }
        map.end()
    }
}

/// The whole resolved configuration.
pub fn render_config(config: &Config, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_config_text(config)),
        _ => serialize(&ResolvedView(config), format),
    }
}

/// Resolved configuration as INI-style text, one section per group.
pub fn format_config_text(config: &Config) -> String {
    let mut out = String::new();

    for (idx, name) in config.groups().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(&format!("[{}]\n", name));
        if let Some(group) = config.group(name) {
            for (param, value) in group.iter() {
                out.push_str(&format!("{} = {}\n", param, ini_value(value)));
            }
        }
    }

    out
}

/// Every stored value of one parameter, ordered by priority.
#[derive(Debug, Serialize)]
pub struct Explanation<'a> {
    pub group: &'a str,
    pub param: &'a str,
    pub resolved: Option<&'a Value>,
    pub candidates: Vec<Candidate<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Candidate<'a> {
    pub environment: &'a str,
    pub value: &'a Value,
    /// Position in the priority order; `None` when the environment is not requested.
    pub rank: Option<usize>,
    pub wins: bool,
    #[serde(rename = "override")]
    pub is_override: bool,
}

/// Explain how a parameter resolves. `None` if nothing is stored for it.
pub fn explain<'a>(config: &'a Config, group: &'a str, param: &'a str) -> Option<Explanation<'a>> {
    let stored = config.document().stored(group, param)?;
    let priority = config.environment_priority();
    let winner = priority.iter().find(|env| stored.contains_key(*env));

    let mut candidates: Vec<Candidate<'a>> = stored
        .iter()
        .map(|(env, value)| Candidate {
            environment: env,
            value,
            rank: priority.rank(env),
            wins: winner == Some(env.as_str()),
            is_override: config.is_override(group, param, env),
        })
        .collect();
    candidates.sort_by_key(|c| c.rank.unwrap_or(usize::MAX));

    Some(Explanation {
        group,
        param,
        resolved: config.get(group, param),
        candidates,
    })
}

pub fn render_explanation(explanation: &Explanation<'_>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_explanation_text(explanation)),
        _ => serialize(explanation, format),
    }
}

fn format_explanation_text(explanation: &Explanation<'_>) -> String {
    let mut out = String::new();

    match explanation.resolved {
        Some(value) => out.push_str(&format!(
            "{}.{} = {}\n",
            explanation.group,
            explanation.param,
            ini_value(value)
        )),
        None => out.push_str(&format!(
            "{}.{} is not set for the requested environments\n",
            explanation.group, explanation.param
        )),
    }

    let width = explanation
        .candidates
        .iter()
        .map(|c| c.environment.len())
        .max()
        .unwrap_or(0);

    for candidate in &explanation.candidates {
        let marker = if candidate.wins {
            "  <- wins"
        } else if candidate.rank.is_none() {
            "  (not requested)"
        } else {
            ""
        };
        out.push_str(&format!(
            "  {:<width$}  {}{}\n",
            candidate.environment,
            ini_value(candidate.value),
            marker,
            width = width
        ));
    }

    out
}
