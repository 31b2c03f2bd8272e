//! The concurrent namespaced entry store.
//!
//! A [`Store`] owns a registry of independently locked namespaces. Each
//! namespace keeps its entries in insertion order, counts unflushed
//! mutations in a dirty counter, and serializes every operation under its
//! own mutex; operations on different namespaces never contend.
//!
//! Persistence is layered on from the `typeahead-persist` crate: namespaces
//! are lazily reloaded from disk on first reference, and a [`Flusher`]
//! worker periodically snapshots every dirty namespace.
//!
//! # Locking
//!
//! Two lock levels exist: the registry mutex (name → namespace map) and one
//! mutex per namespace. The registry lock is only ever held for the map
//! lookup or insert itself, never across a namespace operation, and no two
//! namespace locks are held at once.

pub mod flush;
pub mod namespace;
pub mod registry;
pub mod search;
pub mod store;

pub use flush::Flusher;
pub use namespace::Namespace;
pub use registry::Registry;
pub use search::{Hit, SearchRequest, DEFAULT_LIMIT};
pub use store::{PutRequest, Store, StoreConfig};
