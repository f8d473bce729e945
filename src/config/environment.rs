//! Environment priority.
//!
//! Callers list environments highest priority first. The built-in default
//! environment is always present, exactly once, as the lowest priority.

use std::fmt;

/// The implicit environment of assignments without an `<environment>` tag.
pub const DEFAULT_ENVIRONMENT: &str = "__default__";

/// Ordered, deduplicated environments that always end with [`DEFAULT_ENVIRONMENT`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentPriority {
    /// Highest priority first; excludes the default environment.
    requested: Vec<String>,
}

impl EnvironmentPriority {
    /// Build from the caller's list, highest priority first.
    ///
    /// Repeated names keep their first position; an explicit default
    /// environment is ignored since it is always last.
    pub fn new<I, E>(environments: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: AsRef<str>,
    {
        let mut requested: Vec<String> = Vec::new();
        for env in environments {
            let env = env.as_ref();
            if env == DEFAULT_ENVIRONMENT || requested.iter().any(|seen| seen == env) {
                continue;
            }
            requested.push(env.to_string());
        }
        Self { requested }
    }

    /// The caller's environments, highest priority first.
    pub fn requested(&self) -> &[String] {
        &self.requested
    }

    /// All environments, highest priority first, ending with the default.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.requested
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(DEFAULT_ENVIRONMENT))
    }

    /// All environments in overwrite order: default first, then the caller's
    /// list reversed. The last environment holding a value wins.
    pub fn scan_order(&self) -> impl Iterator<Item = &str> {
        std::iter::once(DEFAULT_ENVIRONMENT).chain(self.requested.iter().rev().map(String::as_str))
    }

    pub fn contains(&self, environment: &str) -> bool {
        environment == DEFAULT_ENVIRONMENT || self.requested.iter().any(|e| e == environment)
    }

    /// Position in priority order, 0 being the highest.
    pub fn rank(&self, environment: &str) -> Option<usize> {
        self.iter().position(|e| e == environment)
    }

    pub fn len(&self) -> usize {
        self.requested.len() + 1
    }

    /// Never empty; the default environment is always present.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for EnvironmentPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().collect();
        write!(f, "{}", names.join(" > "))
    }
}
