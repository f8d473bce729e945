//! INI-style configuration with per-environment overrides.
//!
//! ```text
//! [ftp]
//! path = /tmp/
//! path<production> = /srv/var/tmp/
//! ```
//!
//! Loading runs in stages:
//! 1. **Grammar** - each line becomes a group tag or an assignment
//! 2. **Coercion** - raw values become strings, integers, booleans or lists
//! 3. **Document** - values are stored per (group, parameter, environment)
//! 4. **Resolution** - one value per parameter is picked for the requested
//!    environments, the first listed winning and `__default__` last
//!
//! [`ConfigStore`] caches the parsed document and only re-parses when its
//! [`ConfigSource`] reports a different [`Fingerprint`].

mod document;
mod environment;
pub mod grammar;
mod resolve;
mod source;
mod store;
mod value;

pub use document::{ConfigDocument, EnvironmentValues, GroupValues};
pub use environment::{DEFAULT_ENVIRONMENT, EnvironmentPriority};
pub use grammar::{Assignment, Line, parse_param};
pub use resolve::{Config, Group, ResolvedConfig, resolve, resolve_parameter};
pub use source::{ConfigSource, FileSource, Fingerprint, MemorySource};
pub use store::{ConfigStore, SharedConfigStore};
pub use value::{CoercionError, Value, coerce, try_coerce};
