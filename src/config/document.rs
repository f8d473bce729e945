//! Parsed configuration document.
//!
//! Holds every group in declaration order and, for each parameter, the
//! coerced value stored per environment. Nothing here depends on which
//! environments are requested; see [`super::resolve`] for that.

use super::grammar::{Line, tokenize};
use super::value::{Value, coerce};
use crate::error::ParseError;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Environment name → stored value for one parameter.
pub type EnvironmentValues = BTreeMap<String, Value>;

/// Parameter name → per-environment values for one group.
pub type GroupValues = BTreeMap<String, EnvironmentValues>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    /// Declaration order, each name once.
    groups: Vec<String>,
    values: HashMap<String, GroupValues>,
}

impl ConfigDocument {
    /// Parse configuration text.
    ///
    /// Fails on the first assignment that cannot be placed: one before any
    /// `[group]` header, or one with an empty parameter name. Values that
    /// cannot be coerced are stored as [`Value::Null`].
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut document = Self::default();
        let mut current: Option<String> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            match tokenize(raw) {
                None => {}
                Some(Line::Group(name)) => {
                    document.add_group(name);
                    current = Some(name.to_string());
                }
                Some(Line::Assignment(assignment)) => {
                    let Some(group) = current.as_deref() else {
                        return Err(ParseError::OrphanParameter {
                            line: line_no,
                            text: raw.trim().to_string(),
                        });
                    };
                    if assignment.name.is_empty() {
                        return Err(ParseError::EmptyParameterName {
                            line: line_no,
                            text: raw.trim().to_string(),
                        });
                    }
                    document.store(
                        group,
                        assignment.name,
                        assignment.environment,
                        coerce(assignment.value),
                    );
                }
            }
        }

        debug!(
            groups = document.groups.len(),
            parameters = document.parameter_count(),
            "Parsed configuration document"
        );
        Ok(document)
    }

    /// Register a group; re-declaring keeps its parameters.
    fn add_group(&mut self, name: &str) {
        if !self.values.contains_key(name) {
            self.groups.push(name.to_string());
            self.values.insert(name.to_string(), GroupValues::new());
        }
    }

    /// Store a value; a later write for the same environment replaces it.
    fn store(&mut self, group: &str, param: &str, environment: &str, value: Value) {
        self.values
            .entry(group.to_string())
            .or_default()
            .entry(param.to_string())
            .or_default()
            .insert(environment.to_string(), value);
    }

    /// Group names in declaration order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(String::as_str)
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.values.contains_key(group)
    }

    /// All parameters of a group with their per-environment values.
    pub fn group(&self, group: &str) -> Option<&GroupValues> {
        self.values.get(group)
    }

    /// Every stored environment value for one parameter.
    pub fn stored(&self, group: &str, param: &str) -> Option<&EnvironmentValues> {
        self.values.get(group)?.get(param)
    }

    pub fn stored_value(&self, group: &str, param: &str, environment: &str) -> Option<&Value> {
        self.stored(group, param)?.get(environment)
    }

    /// Number of distinct (group, parameter) pairs.
    pub fn parameter_count(&self) -> usize {
        self.values.values().map(BTreeMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[common]
basic_size_limit = 26214400
student_size_limit = 52428800
path = /srv/var/tmp/
path<production> = /srv/var/tmp/production/ ; per host

[ftp]
name = \"hello there, ftp uploading\"
enabled = no
";

    #[test]
    fn test_parse_groups_in_order() {
        let doc = ConfigDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.groups().collect::<Vec<_>>(), vec!["common", "ftp"]);
        assert_eq!(doc.parameter_count(), 5);
    }

    #[test]
    fn test_stores_values_per_environment() {
        let doc = ConfigDocument::parse(SAMPLE).unwrap();
        let stored = doc.stored("common", "path").unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(
            doc.stored_value("common", "path", "__default__"),
            Some(&Value::from("/srv/var/tmp/"))
        );
        assert_eq!(
            doc.stored_value("common", "path", "production"),
            Some(&Value::from("/srv/var/tmp/production/"))
        );
        assert_eq!(
            doc.stored_value("ftp", "name", "__default__"),
            Some(&Value::from("hello there, ftp uploading"))
        );
    }

    #[test]
    fn test_redeclared_group_keeps_parameters() {
        let text = "[a]\nx = 1\n[b]\ny = 2\n[a]\nz = 3\n";
        let doc = ConfigDocument::parse(text).unwrap();
        assert_eq!(doc.groups().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(doc.stored("a", "x").is_some());
        assert!(doc.stored("a", "z").is_some());
    }

    #[test]
    fn test_last_write_wins_within_environment() {
        let text = "[a]\nx = 1\nx<prod> = 2\nx = 3\n";
        let doc = ConfigDocument::parse(text).unwrap();
        assert_eq!(
            doc.stored_value("a", "x", "__default__"),
            Some(&Value::Integer(3))
        );
        assert_eq!(doc.stored_value("a", "x", "prod"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_empty_group_is_kept() {
        let doc = ConfigDocument::parse("[empty]\n; nothing here\n").unwrap();
        assert!(doc.has_group("empty"));
        assert_eq!(doc.group("empty").map(BTreeMap::len), Some(0));
    }

    #[test]
    fn test_assignment_before_group_is_an_error() {
        let err = ConfigDocument::parse("; header\n\nkey = value\n[a]\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::OrphanParameter {
                line: 3,
                text: "key = value".to_string()
            }
        );
    }

    #[test]
    fn test_empty_parameter_name_is_an_error() {
        let err = ConfigDocument::parse("[a]\n= value\n").unwrap_err();
        assert!(matches!(err, ParseError::EmptyParameterName { line: 2, .. }));
    }

    #[test]
    fn test_missing_value_is_stored_as_null() {
        let doc = ConfigDocument::parse("[a]\nflag\nempty =\n").unwrap();
        assert_eq!(
            doc.stored_value("a", "flag", "__default__"),
            Some(&Value::Null)
        );
        assert_eq!(
            doc.stored_value("a", "empty", "__default__"),
            Some(&Value::Null)
        );
    }

    #[test]
    fn test_parse_empty_text() {
        let doc = ConfigDocument::parse("").unwrap();
        assert_eq!(doc.groups().count(), 0);
        assert_eq!(doc.parameter_count(), 0);
    }
}
