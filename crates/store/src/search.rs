//! Search request/result types and the ranking comparator.
//!
//! Ranking is recency first, popularity second: entries sort by
//! `(when DESC, count DESC)` with remaining ties left in selection order.
//! The sort runs on the candidate subset materialized per query, never on
//! the whole namespace.

use serde::Serialize;

/// Default result cap when the client supplies no usable `limit`.
pub const DEFAULT_LIMIT: usize = 100;

/// Parameters of one search call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchRequest<'a> {
    pub namespace: &'a str,
    /// Raw prefix; absent matches every entry.
    pub prefix: Option<&'a str>,
    /// Exact id filter; absent matches any id.
    pub id: Option<&'a str>,
    /// Locale for prefix folding; absent = process default, empty = root.
    pub locale: Option<&'a str>,
    /// Result cap; `None` applies [`DEFAULT_LIMIT`].
    pub limit: Option<usize>,
    /// Newer-than cursor: entries with `when <= ts_floor` are cut off.
    /// Zero disables the cursor.
    pub ts_floor: u64,
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hit {
    pub key: String,
    pub id: String,
    pub when: u64,
    pub count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Order hits newest first, ties broken by higher count. Callers rely on
/// the sort being stable.
pub fn rank(hits: &mut [Hit]) {
    hits.sort_by(|a, b| b.when.cmp(&a.when).then(b.count.cmp(&a.count)));
}
