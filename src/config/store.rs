//! Caching configuration store.
//!
//! Keeps the last text read from a [`ConfigSource`] together with its
//! fingerprint and parsed document. A load re-parses only when the source's
//! fingerprint changed or a reload is forced; otherwise it reuses the
//! document and re-resolves only if the requested environments differ.

use super::document::ConfigDocument;
use super::environment::EnvironmentPriority;
use super::resolve::Config;
use super::source::{ConfigSource, Fingerprint};
use crate::error::ConfigResult;
use arc_swap::ArcSwapOption;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

#[derive(Debug)]
struct Loaded {
    text: String,
    fingerprint: Fingerprint,
    config: Config,
    newly_loaded: bool,
}

/// Loads configuration from a source, parsing only when its content changed.
#[derive(Debug)]
pub struct ConfigStore<S> {
    source: S,
    loaded: Option<Loaded>,
    parse_count: u64,
    generation: u64,
}

impl<S: ConfigSource> ConfigStore<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            loaded: None,
            parse_count: 0,
            generation: 0,
        }
    }

    /// Load the configuration, resolved for `environments` (highest priority first).
    ///
    /// Parses on the first call, when the source's fingerprint changed, or
    /// when `force_reload` is set. Source and parse failures are returned;
    /// the previously loaded document is kept for the next attempt but never
    /// handed out in place of the failed load.
    pub fn load<I, E>(&mut self, environments: I, force_reload: bool) -> ConfigResult<&Config>
    where
        I: IntoIterator<Item = E>,
        E: AsRef<str>,
    {
        let priority = EnvironmentPriority::new(environments);
        let fingerprint = self.source.fingerprint()?;

        let loaded = match self.loaded.take() {
            Some(mut loaded) if !force_reload && loaded.fingerprint == fingerprint => {
                debug!(
                    source = %self.source.describe(),
                    "Configuration unchanged, reusing parsed document"
                );
                loaded.newly_loaded = false;
                if loaded.config.set_priority(priority) {
                    self.generation += 1;
                }
                loaded
            }
            previous => match self.parse_source(fingerprint, priority, force_reload) {
                Ok(loaded) => loaded,
                Err(err) => {
                    self.loaded = previous;
                    return Err(err);
                }
            },
        };

        Ok(&self.loaded.insert(loaded).config)
    }

    /// Read and parse the source text.
    fn parse_source(
        &mut self,
        fingerprint: Fingerprint,
        priority: EnvironmentPriority,
        forced: bool,
    ) -> ConfigResult<Loaded> {
        let text = self.source.read()?;
        let document = ConfigDocument::parse(&text)?;
        self.parse_count += 1;
        self.generation += 1;
        info!(
            source = %self.source.describe(),
            forced,
            groups = document.groups().count(),
            "Loaded configuration"
        );
        Ok(Loaded {
            text,
            fingerprint,
            config: Config::new(Arc::new(document), priority),
            newly_loaded: true,
        })
    }

    /// The last successfully loaded configuration.
    pub fn current(&self) -> Option<&Config> {
        self.loaded.as_ref().map(|loaded| &loaded.config)
    }

    /// Text of the last successful parse.
    pub fn cached_text(&self) -> Option<&str> {
        self.loaded.as_ref().map(|loaded| loaded.text.as_str())
    }

    /// True if the most recent load parsed fresh content.
    pub fn is_newly_loaded(&self) -> bool {
        self.loaded.as_ref().is_some_and(|loaded| loaded.newly_loaded)
    }

    /// Number of times the source text has been parsed.
    pub fn parse_count(&self) -> u64 {
        self.parse_count
    }

    /// Bumped whenever the current configuration changes (parse or re-resolve).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

/// A [`ConfigStore`] shared between threads.
///
/// Loads are serialized by a mutex; each resulting configuration is published
/// as an immutable snapshot so readers never wait on a reload.
pub struct SharedConfigStore<S> {
    store: Mutex<ConfigStore<S>>,
    current: ArcSwapOption<Config>,
}

impl<S: ConfigSource> SharedConfigStore<S> {
    pub fn new(source: S) -> Self {
        Self {
            store: Mutex::new(ConfigStore::new(source)),
            current: ArcSwapOption::const_empty(),
        }
    }

    /// Load through the underlying store and publish the result.
    ///
    /// Returns the already published snapshot when nothing changed.
    pub fn load<I, E>(&self, environments: I, force_reload: bool) -> ConfigResult<Arc<Config>>
    where
        I: IntoIterator<Item = E>,
        E: AsRef<str>,
    {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        let config = store.load(environments, force_reload)?;

        if let Some(current) = self.current.load_full()
            && current.same_state(config)
        {
            return Ok(current);
        }

        let snapshot = Arc::new(config.clone());
        self.current.store(Some(Arc::clone(&snapshot)));
        Ok(snapshot)
    }

    /// The latest published snapshot, without locking.
    pub fn snapshot(&self) -> Option<Arc<Config>> {
        self.current.load_full()
    }

    pub fn parse_count(&self) -> u64 {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .parse_count()
    }
}
