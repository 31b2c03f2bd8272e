//! The store API: put, delete, nuke, increment, search, flush.
//!
//! A [`Store`] composes the normalizer, the namespace registry, and the
//! snapshot layout. Request handlers call straight into it; the flusher
//! worker calls [`Store::flush_dirty`] on its timer.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use typeahead_core::{unix_seconds, CompositeKey, Error, LocaleSpec, Normalizer, Result};
use typeahead_persist::{read_snapshot, Layout};

use crate::namespace::Namespace;
use crate::registry::Registry;
use crate::search::{Hit, SearchRequest, DEFAULT_LIMIT};

/// Store construction parameters.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Per-namespace entry cap; the oldest-inserted entry is evicted to
    /// stay within it.
    pub max_elems: usize,
    /// Snapshot tree root; `None` runs purely in memory.
    pub data_dir: Option<PathBuf>,
    /// Locale used when a request names none.
    pub default_locale: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            max_elems: 1000,
            data_dir: None,
            default_locale: "en_US".to_string(),
        }
    }
}

/// Parameters of one put call.
#[derive(Debug, Clone, Copy, Default)]
pub struct PutRequest<'a> {
    pub namespace: &'a str,
    pub key: &'a str,
    pub id: Option<&'a str>,
    pub data: Option<&'a str>,
    /// Trusted verbatim; wall clock when absent.
    pub ts: Option<u64>,
    pub locale: Option<&'a str>,
}

/// The namespaced autocomplete store.
pub struct Store {
    config: StoreConfig,
    normalizer: Normalizer,
    registry: Registry,
    layout: Option<Layout>,
}

impl Store {
    /// Build a store, pre-creating the snapshot directory tree when a data
    /// dir is configured.
    pub fn open(config: StoreConfig) -> Result<Store> {
        if config.max_elems == 0 {
            return Err(Error::bad_input("max_elems must be at least 1"));
        }
        let normalizer = Normalizer::new(&config.default_locale)?;
        let layout = match &config.data_dir {
            Some(dir) => {
                let layout = Layout::new(dir);
                layout.ensure_dirs()?;
                info!(root = %layout.root().display(), "snapshot tree ready");
                Some(layout)
            }
            None => None,
        };
        Ok(Store {
            config,
            normalizer,
            registry: Registry::new(),
            layout,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Names of namespaces already persisted on disk.
    pub fn persisted_namespaces(&self) -> Result<Vec<String>> {
        match &self.layout {
            Some(layout) => Ok(layout.scan()?),
            None => Ok(Vec::new()),
        }
    }

    /// Insert or update one entry, creating (and lazily loading) the
    /// namespace if needed. Returns the entry as it now stands.
    pub fn put(&self, req: PutRequest<'_>) -> Result<Hit> {
        validate_namespace(req.namespace)?;
        let nkey = self
            .normalizer
            .lowercase(req.key, LocaleSpec::from_param(req.locale))?;
        let ckey = CompositeKey::new(nkey, req.id.map(String::from))?;
        let when = req.ts.unwrap_or_else(unix_seconds);

        let ns = self.resolve_or_create(req.namespace);
        debug!(namespace = req.namespace, key = ckey.nkey(), "put");
        Ok(ns.apply_put(
            ckey,
            req.data.map(String::from),
            when,
            self.config.max_elems,
        ))
    }

    /// Remove the entry with exactly this key. Succeeds whether or not the
    /// namespace or entry exists.
    pub fn delete(
        &self,
        namespace: &str,
        key: &str,
        id: Option<&str>,
        locale: Option<&str>,
    ) -> Result<()> {
        validate_namespace(namespace)?;
        let nkey = self
            .normalizer
            .lowercase(key, LocaleSpec::from_param(locale))?;
        let ckey = CompositeKey::new(nkey, id.map(String::from))?;

        let Some(ns) = self.registry.get(namespace) else {
            return Ok(());
        };
        debug!(namespace, key = ckey.nkey(), "delete");
        ns.remove(&ckey);
        Ok(())
    }

    /// Remove every entry whose match key starts with `key`'s folded form
    /// (all entries when `key` is absent) and, when `id` is given, whose id
    /// equals it exactly. A missing namespace is a no-op.
    pub fn nuke(
        &self,
        namespace: &str,
        key: Option<&str>,
        id: Option<&str>,
        locale: Option<&str>,
    ) -> Result<()> {
        validate_namespace(namespace)?;
        let nprefix = match key {
            Some(raw) => self
                .normalizer
                .lowercase(raw, LocaleSpec::from_param(locale))?,
            None => String::new(),
        };

        let Some(ns) = self.registry.get(namespace) else {
            return Ok(());
        };
        let removed = ns.remove_matching(&nprefix, id);
        debug!(namespace, prefix = %nprefix, removed, "nuke");
        Ok(())
    }

    /// Add `value` to the count of the entry under `(key, "")`; negative
    /// values decrement and the entry is dropped once its count is zero or
    /// below. Unlike `delete`, missing namespaces and keys are reported.
    pub fn increment(
        &self,
        namespace: &str,
        key: &str,
        value: i64,
        locale: Option<&str>,
    ) -> Result<()> {
        validate_namespace(namespace)?;
        if value == 0 {
            return Err(Error::MissingRequiredArg("value"));
        }
        let nkey = self
            .normalizer
            .lowercase(key, LocaleSpec::from_param(locale))?;

        let ns = self
            .registry
            .get(namespace)
            .ok_or_else(|| Error::NamespaceNotFound(namespace.to_string()))?;
        debug!(namespace, key = %nkey, value, "increment");
        if ns.add_count(&nkey, value) {
            Ok(())
        } else {
            Err(Error::KeyNotFound)
        }
    }

    /// Ranked prefix search. Creates (and lazily loads) the namespace like
    /// a put would; a pure read otherwise.
    pub fn search(&self, req: SearchRequest<'_>) -> Result<Vec<Hit>> {
        validate_namespace(req.namespace)?;
        let nprefix = match req.prefix {
            Some(raw) => self
                .normalizer
                .lowercase(raw, LocaleSpec::from_param(req.locale))?,
            None => String::new(),
        };

        let ns = self.resolve_or_create(req.namespace);
        let limit = req.limit.unwrap_or(DEFAULT_LIMIT);
        let hits = ns.select(&nprefix, req.id, limit, req.ts_floor);
        debug!(
            namespace = req.namespace,
            prefix = %nprefix,
            hits = hits.len(),
            "search"
        );
        Ok(hits)
    }

    /// Snapshot every namespace that has unflushed mutations. Failures are
    /// logged and the namespace stays dirty for the next pass. Returns the
    /// number of namespaces written.
    pub fn flush_dirty(&self) -> usize {
        self.flush_pass(true)
    }

    /// Snapshot every namespace regardless of dirtiness (shutdown pass).
    pub fn flush_all(&self) -> usize {
        self.flush_pass(false)
    }

    fn flush_pass(&self, only_dirty: bool) -> usize {
        let Some(layout) = &self.layout else {
            return 0;
        };
        let mut written = 0;
        for ns in self.registry.all() {
            if only_dirty && !ns.is_dirty() {
                continue;
            }
            match ns.flush_to(&layout.namespace_path(ns.name())) {
                Ok(records) => {
                    debug!(namespace = ns.name(), records, "snapshot");
                    written += 1;
                }
                Err(e) => {
                    error!(namespace = ns.name(), error = %e, "snapshot failed, will retry");
                }
            }
        }
        written
    }

    /// Resolve a namespace, constructing and publishing it on first
    /// reference. Construction loads any on-disk snapshot before the
    /// namespace becomes visible, so no reader can observe it half-loaded;
    /// the loser of a racing create discards its copy.
    fn resolve_or_create(&self, name: &str) -> Arc<Namespace> {
        if let Some(ns) = self.registry.get(name) {
            return ns;
        }

        let ns = Namespace::new(name);
        if let Some(layout) = &self.layout {
            let path = layout.namespace_path(name);
            match read_snapshot(&path) {
                Ok(records) if !records.is_empty() => {
                    info!(namespace = name, records = records.len(), "loaded snapshot");
                    ns.load_records(records, self.config.max_elems);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(namespace = name, error = %e, "unreadable snapshot, starting empty");
                }
            }
        }
        self.registry.publish(name, Arc::new(ns))
    }
}

/// Namespace names become file names under the snapshot tree, so reject
/// anything that cannot be one.
fn validate_namespace(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::MissingRequiredArg("namespace"));
    }
    if name == "." || name == ".." {
        return Err(Error::bad_input("reserved namespace name"));
    }
    if name.bytes().any(|b| b == b'/' || b == 0) {
        return Err(Error::bad_input("namespace name contains / or NUL"));
    }
    if name.ends_with(".tmp") {
        return Err(Error::bad_input("namespace name collides with tmp files"));
    }
    Ok(())
}
