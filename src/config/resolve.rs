//! Override resolution.
//!
//! Picks one value per parameter from its per-environment values. Environments
//! are scanned in [`EnvironmentPriority::scan_order`] (default first, then the
//! requested environments reversed) and each stored value overwrites the
//! previous one, so the first requested environment has the final say and the
//! default environment is the fallback of last resort.
//!
//! # Example
//! ```
//! use envconf::config::Config;
//!
//! let text = "[ftp]\npath = /tmp/\npath<production> = /srv/ftp/\n";
//! let config = Config::from_text(text, ["production"]).unwrap();
//! assert_eq!(config.get("ftp", "path").and_then(|v| v.as_str()), Some("/srv/ftp/"));
//! ```

use super::document::{ConfigDocument, EnvironmentValues};
use super::environment::EnvironmentPriority;
use super::value::Value;
use crate::error::ParseError;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Group → parameter → winning value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConfig {
    groups: HashMap<String, BTreeMap<String, Value>>,
}

impl ResolvedConfig {
    pub fn get(&self, group: &str, param: &str) -> Option<&Value> {
        self.groups.get(group)?.get(param)
    }

    pub fn group(&self, group: &str) -> Option<&BTreeMap<String, Value>> {
        self.groups.get(group)
    }

    /// Number of parameters that resolved to a value.
    pub fn len(&self) -> usize {
        self.groups.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolve every parameter of `document` against `priority`.
///
/// Every group of the document is present in the result, possibly empty.
/// Parameters with no value for any prioritized environment are left out.
pub fn resolve(document: &ConfigDocument, priority: &EnvironmentPriority) -> ResolvedConfig {
    let mut groups = HashMap::new();
    for name in document.groups() {
        let resolved: BTreeMap<String, Value> = document
            .group(name)
            .into_iter()
            .flatten()
            .filter_map(|(param, stored)| {
                resolve_parameter(stored, priority).map(|value| (param.clone(), value.clone()))
            })
            .collect();
        groups.insert(name.to_string(), resolved);
    }
    ResolvedConfig { groups }
}

/// The last stored value met while scanning in overwrite order.
pub fn resolve_parameter<'a>(
    stored: &'a EnvironmentValues,
    priority: &EnvironmentPriority,
) -> Option<&'a Value> {
    priority
        .scan_order()
        .filter_map(|env| stored.get(env))
        .last()
}

/// A parsed document resolved against an environment priority.
///
/// This is the lookup surface handed out by loads. The document is shared,
/// so cloning a `Config` does not copy the stored values.
#[derive(Debug, Clone)]
pub struct Config {
    document: Arc<ConfigDocument>,
    priority: EnvironmentPriority,
    resolved: ResolvedConfig,
}

impl Config {
    pub fn new(document: Arc<ConfigDocument>, priority: EnvironmentPriority) -> Self {
        let resolved = resolve(&document, &priority);
        Self {
            document,
            priority,
            resolved,
        }
    }

    /// Parse `text` and resolve it for `environments` (highest priority first).
    pub fn from_text<I, E>(text: &str, environments: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = E>,
        E: AsRef<str>,
    {
        let document = ConfigDocument::parse(text)?;
        Ok(Self::new(
            Arc::new(document),
            EnvironmentPriority::new(environments),
        ))
    }

    /// The winning value, or `None` if the group or parameter is unknown or
    /// has no value for any prioritized environment.
    pub fn get(&self, group: &str, param: &str) -> Option<&Value> {
        self.resolved.get(group, param)
    }

    pub fn group(&self, name: &str) -> Option<Group<'_>> {
        self.resolved
            .groups
            .get_key_value(name)
            .map(|(name, values)| Group { name, values })
    }

    /// Group names in declaration order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.document.groups()
    }

    /// True if `environment` is prioritized and holds a value for the
    /// parameter, whether or not that value wins.
    pub fn is_override(&self, group: &str, param: &str, environment: &str) -> bool {
        self.priority.contains(environment)
            && self
                .document
                .stored_value(group, param, environment)
                .is_some()
    }

    pub fn environment_priority(&self) -> &EnvironmentPriority {
        &self.priority
    }

    /// Re-resolve for a new priority without re-parsing.
    ///
    /// Returns false, doing nothing, if the priority is unchanged.
    pub fn set_priority(&mut self, priority: EnvironmentPriority) -> bool {
        if priority == self.priority {
            return false;
        }
        debug!(priority = %priority, "Re-resolving configuration");
        self.resolved = resolve(&self.document, &priority);
        self.priority = priority;
        true
    }

    pub fn set_environments<I, E>(&mut self, environments: I) -> bool
    where
        I: IntoIterator<Item = E>,
        E: AsRef<str>,
    {
        self.set_priority(EnvironmentPriority::new(environments))
    }

    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    /// Same parsed document (not just equal) resolved for the same priority.
    pub(crate) fn same_state(&self, other: &Config) -> bool {
        Arc::ptr_eq(&self.document, &other.document) && self.priority == other.priority
    }

    pub fn resolved(&self) -> &ResolvedConfig {
        &self.resolved
    }
}

/// Borrowed view of one resolved group.
#[derive(Debug, Clone, Copy)]
pub struct Group<'a> {
    name: &'a str,
    values: &'a BTreeMap<String, Value>,
}

impl<'a> Group<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn get(&self, param: &str) -> Option<&'a Value> {
        self.values.get(param)
    }

    /// Resolved parameters, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Value)> + use<'a> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
