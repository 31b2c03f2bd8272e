//! # typeahead
//!
//! An in-memory, namespaced prefix-autocomplete store with periodic
//! snapshot persistence.
//!
//! Clients write weighted entries keyed by a locale-lowercased string plus
//! an optional id, and query with a string prefix to get results ranked by
//! recency, then popularity. Each namespace is an isolated keyspace with
//! its own lock and a bounded entry count (oldest-inserted entries are
//! evicted past the cap). When a data directory is configured, dirty
//! namespaces are dumped to disk on a timer and reloaded lazily on first
//! reference after restart.
//!
//! # Quick Start
//!
//! ```
//! use typeahead::{PutRequest, SearchRequest, Store, StoreConfig};
//!
//! fn main() -> typeahead::Result<()> {
//!     let store = Store::open(StoreConfig::default())?;
//!
//!     store.put(PutRequest {
//!         namespace: "movies",
//!         key: "Star Wars",
//!         data: Some("sw"),
//!         ..Default::default()
//!     })?;
//!
//!     let hits = store.search(SearchRequest {
//!         namespace: "movies",
//!         prefix: Some("star"),
//!         ..Default::default()
//!     })?;
//!     assert_eq!(hits[0].key, "star wars");
//!     assert_eq!(hits[0].count, 1);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! [`Store`] is the main entry point: `put`, `delete`, `nuke`, `increment`,
//! `search`, and the flush operations the [`Flusher`] worker drives. The
//! HTTP server binary (`typeaheadd`) maps its GET endpoints onto these
//! calls one to one.
//!
//! Internal crates (persistence, normalization) are not exposed; only the
//! surface re-exported here is stable.

pub use typeahead_core::{unix_seconds, CompositeKey, Entry, Error, LocaleSpec, Result};
pub use typeahead_store::{
    Flusher, Hit, PutRequest, SearchRequest, Store, StoreConfig, DEFAULT_LIMIT,
};
