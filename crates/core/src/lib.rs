//! Core types for the typeahead autocomplete service.
//!
//! This crate carries the vocabulary shared by every other layer:
//!
//! - [`Error`] / [`Result`] — the unified error type
//! - [`CompositeKey`] — the `(normalized key, id)` identity of an entry
//! - [`Entry`] — the stored value record (payload, timestamp, count)
//! - [`Normalizer`] — locale-aware lowercase folding of raw keys
//!
//! Nothing in here performs I/O or takes locks; the concurrent store and the
//! snapshot layer are built on top of these types.

pub mod entry;
pub mod error;
pub mod key;
pub mod normalize;

pub use entry::{unix_seconds, Entry};
pub use error::{Error, Result};
pub use key::CompositeKey;
pub use normalize::{LocaleSpec, Normalizer};
