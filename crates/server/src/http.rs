//! HTTP surface.
//!
//! Every endpoint is a GET carrying query-string parameters, mirroring the
//! store operations one to one:
//!
//! | Path      | Required           | Optional                          |
//! |-----------|--------------------|-----------------------------------|
//! | `/put`    | `namespace`, `key` | `id`, `data`, `ts`, `locale`      |
//! | `/del`    | `namespace`, `key` | `id`, `locale`                    |
//! | `/nuke`   | `namespace`        | `key`, `id`, `locale`             |
//! | `/incr`   | `namespace`, `key`, `value` | `locale`                 |
//! | `/decr`   | `namespace`, `key`, `value` | `locale`                 |
//! | `/search` | `namespace`        | `key`, `id`, `locale`, `limit`, `ts` |
//!
//! Mutations answer with a plain `OK`; search answers with a JSON object
//! `{"results": [...]}` whose rows omit `data` when the entry has none.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};

use typeahead_core::Error;
use typeahead_store::{Hit, PutRequest, SearchRequest, Store};

/// Build the service router. Each path registers exactly once.
pub fn router(store: Arc<Store>) -> Router {
    Router::new()
        .route("/put", get(put))
        .route("/del", get(del))
        .route("/nuke", get(nuke))
        .route("/incr", get(incr))
        .route("/decr", get(decr))
        .route("/search", get(search))
        .with_state(store)
}

#[derive(Debug, Deserialize)]
struct PutParams {
    namespace: Option<String>,
    key: Option<String>,
    id: Option<String>,
    data: Option<String>,
    ts: Option<String>,
    locale: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DelParams {
    namespace: Option<String>,
    key: Option<String>,
    id: Option<String>,
    locale: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NukeParams {
    namespace: Option<String>,
    key: Option<String>,
    id: Option<String>,
    locale: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IncrParams {
    namespace: Option<String>,
    key: Option<String>,
    value: Option<String>,
    locale: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    namespace: Option<String>,
    key: Option<String>,
    id: Option<String>,
    locale: Option<String>,
    limit: Option<String>,
    ts: Option<String>,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    results: Vec<Hit>,
}

async fn put(State(store): State<Arc<Store>>, Query(p): Query<PutParams>) -> Response {
    let (Some(namespace), Some(key)) = (p.namespace.as_deref(), p.key.as_deref()) else {
        return reply(Error::MissingRequiredArg("namespace, key"));
    };
    let outcome = store.put(PutRequest {
        namespace,
        key,
        id: p.id.as_deref(),
        data: p.data.as_deref(),
        ts: p.ts.as_deref().map(parse_seconds),
        locale: p.locale.as_deref(),
    });
    match outcome {
        Ok(_) => ok(),
        Err(e) => reply(e),
    }
}

async fn del(State(store): State<Arc<Store>>, Query(p): Query<DelParams>) -> Response {
    let (Some(namespace), Some(key)) = (p.namespace.as_deref(), p.key.as_deref()) else {
        return reply(Error::MissingRequiredArg("namespace, key"));
    };
    match store.delete(namespace, key, p.id.as_deref(), p.locale.as_deref()) {
        Ok(()) => ok(),
        Err(e) => reply(e),
    }
}

async fn nuke(State(store): State<Arc<Store>>, Query(p): Query<NukeParams>) -> Response {
    let Some(namespace) = p.namespace.as_deref() else {
        return reply(Error::MissingRequiredArg("namespace"));
    };
    match store.nuke(namespace, p.key.as_deref(), p.id.as_deref(), p.locale.as_deref()) {
        Ok(()) => ok(),
        Err(e) => reply(e),
    }
}

async fn incr(state: State<Arc<Store>>, params: Query<IncrParams>) -> Response {
    apply_count(state, params, 1)
}

async fn decr(state: State<Arc<Store>>, params: Query<IncrParams>) -> Response {
    apply_count(state, params, -1)
}

fn apply_count(
    State(store): State<Arc<Store>>,
    Query(p): Query<IncrParams>,
    sign: i64,
) -> Response {
    let (Some(namespace), Some(key), Some(value)) =
        (p.namespace.as_deref(), p.key.as_deref(), p.value.as_deref())
    else {
        return reply(Error::MissingRequiredArg("namespace, key, value"));
    };
    let value = value.parse::<i64>().unwrap_or(0);
    match store.increment(namespace, key, sign * value, p.locale.as_deref()) {
        Ok(()) => ok(),
        Err(e) => reply(e),
    }
}

async fn search(State(store): State<Arc<Store>>, Query(p): Query<SearchParams>) -> Response {
    let Some(namespace) = p.namespace.as_deref() else {
        return reply(Error::MissingRequiredArg("namespace"));
    };
    let request = SearchRequest {
        namespace,
        prefix: p.key.as_deref(),
        id: p.id.as_deref(),
        locale: p.locale.as_deref(),
        limit: parse_limit(p.limit.as_deref()),
        ts_floor: p.ts.as_deref().map_or(0, parse_seconds),
    };
    match store.search(request) {
        Ok(results) => Json(SearchResponse { results }).into_response(),
        Err(e) => reply(e),
    }
}

/// Decimal seconds; garbage is zero, matching the wire contract of the
/// `ts` parameters.
fn parse_seconds(s: &str) -> u64 {
    s.parse().unwrap_or(0)
}

/// A `limit` that fails to parse (or parses to 0) means the default.
fn parse_limit(s: Option<&str>) -> Option<usize> {
    s.and_then(|s| s.parse::<usize>().ok()).filter(|n| *n > 0)
}

fn ok() -> Response {
    (StatusCode::OK, "OK").into_response()
}

fn reply(e: Error) -> Response {
    let (status, body) = match e {
        Error::MissingRequiredArg(_) => (StatusCode::BAD_REQUEST, "MISSING_REQ_ARG"),
        Error::BadInput(_) => (StatusCode::BAD_REQUEST, "BAD_INPUT"),
        Error::NamespaceNotFound(_) => (StatusCode::NOT_FOUND, "NAMESPACE_NOT_FOUND"),
        Error::KeyNotFound => (StatusCode::NOT_FOUND, "KEY_NOT_FOUND"),
        Error::Corruption(_) | Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ERR"),
    };
    (status, body).into_response()
}
