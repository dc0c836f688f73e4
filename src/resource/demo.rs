//! The `test` resource: a small in-memory collection used by the CLI, the
//! integration tests and the benches.
//!
//! - `GET /rest/test` lists every record, `GET /rest/test/<id>` returns one
//!   record or `404`.
//! - `PUT /rest/test/<id>` stores the JSON body under `<id>`; without an id it
//!   is `403`.
//! - `POST /rest/test` appends the form fields (or the JSON body) and answers
//!   `201` with the new record's URL, or `409` once ids run out.
//! - `DELETE /rest/test/<id>` answers `204` whether or not the record existed.
//! - `OPTIONS` answers `200` with the CORS headers.
//!
//! Cross-origin requests from the allow-listed origins get their origin echoed
//! with credentials allowed. When a token is configured every request except
//! `OPTIONS` must carry `Authorization: Bearer <token>`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use http::StatusCode;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use super::{ExecResult, Resource};
use crate::cors::{CorsOverrides, OriginValidation};
use crate::dispatcher::RestContext;
use crate::method::{MethodSet, RestMethod};
use crate::signal::{Message, Signal};

/// Origins whose cross-origin requests are answered with credentials.
pub const ALLOWED_ORIGINS: [&str; 3] = [
    "http://example.com:3001",
    "http://www.example.com",
    "http://test.example.com",
];

const SEED: [(u64, &str, &str, &str); 9] = [
    (1, "one", "Jeremy", "Hi"),
    (2, "two", "Tara", "Hello"),
    (3, "three", "Isaac", "Hey"),
    (4, "four", "Zander", "Yo"),
    (5, "five", "Bryan", "Holla"),
    (6, "six", "Jon", "Ciao"),
    (7, "seven", "Leah", "How do you do?"),
    (8, "eight", "Sean", "Bonjour"),
    (9, "nine", "Scott", "what's up"),
];

/// Records shared by every `TestResource` built from the same store.
///
/// New ids come from a counter that only moves forward and stays above every
/// id ever stored, so ids of deleted records are not handed out again.
#[derive(Debug, Clone)]
pub struct TestStore {
    records: Arc<DashMap<u64, Value>>,
    next_id: Arc<AtomicU64>,
}

impl Default for TestStore {
    fn default() -> Self {
        Self {
            records: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl TestStore {
    /// Store holding the nine sample records.
    #[must_use]
    pub fn seeded() -> Self {
        let store = Self::default();
        for (id, title, author, content) in SEED {
            store.put(
                id,
                json!({ "id": id, "title": title, "author": author, "content": content }),
            );
        }
        store
    }

    #[must_use]
    pub fn get(&self, id: u64) -> Option<Value> {
        self.records.get(&id).map(|r| r.value().clone())
    }

    pub fn put(&self, id: u64, record: Value) {
        self.records.insert(id, record);
        self.next_id.fetch_max(id.saturating_add(1), Ordering::SeqCst);
    }

    pub fn remove(&self, id: u64) -> Option<Value> {
        self.records.remove(&id).map(|(_, v)| v)
    }

    /// Every record, ordered by id.
    #[must_use]
    pub fn all(&self) -> Vec<Value> {
        let mut records: Vec<(u64, Value)> = self
            .records
            .iter()
            .map(|r| (*r.key(), r.value().clone()))
            .collect();
        records.sort_by_key(|(id, _)| *id);
        records.into_iter().map(|(_, v)| v).collect()
    }

    /// Insert under the next free id and return it.
    ///
    /// `None` once the id space is exhausted (a record was stored under
    /// `u64::MAX`).
    pub fn append(&self, mut record: Value) -> Option<u64> {
        loop {
            let id = self
                .next_id
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
                .ok()?;
            if let Entry::Vacant(slot) = self.records.entry(id) {
                if let Value::Object(map) = &mut record {
                    map.entry("id").or_insert_with(|| json!(id));
                }
                slot.insert(record);
                return Some(id);
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The demo resource.
pub struct TestResource {
    store: TestStore,
    origins: OriginValidation,
    token: Option<String>,
}

impl TestResource {
    #[must_use]
    pub fn new(store: TestStore) -> Self {
        Self {
            store,
            origins: OriginValidation::Exact(
                ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
            ),
            token: None,
        }
    }

    /// Require `Authorization: Bearer <token>` on everything but `OPTIONS`.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_origins(mut self, origins: OriginValidation) -> Self {
        self.origins = origins;
        self
    }

    fn record_id(ctx: &RestContext) -> Option<Result<u64, Signal>> {
        let raw = ctx.param("id")?;
        Some(raw.parse::<u64>().map_err(|_| not_found(raw)))
    }
}

fn not_found(id: impl std::fmt::Display) -> Signal {
    Signal::not_found(Message::new("Resource not found, ID: :id").param(":id", id))
}

impl Resource for TestResource {
    fn methods(&self) -> MethodSet {
        MethodSet::BASIC.with(RestMethod::Options)
    }

    fn get(&mut self, ctx: &mut RestContext) -> ExecResult {
        match Self::record_id(ctx) {
            Some(id) => {
                let id = id?;
                self.store.get(id).map(Some).ok_or_else(|| not_found(id))
            }
            None => Ok(Some(Value::Array(self.store.all()))),
        }
    }

    fn put(&mut self, ctx: &mut RestContext) -> ExecResult {
        let Some(id) = Self::record_id(ctx) else {
            return Err(Signal::status(StatusCode::FORBIDDEN));
        };
        let id = id?;
        let record = ctx.body(Some("json"))?;
        self.store.put(id, record.clone());
        info!(id, "Test record stored");
        Ok(Some(record))
    }

    fn post(&mut self, ctx: &mut RestContext) -> ExecResult {
        let form = ctx.post();
        let record = if form.is_empty() {
            ctx.body(Some("json"))?
        } else {
            Value::Object(
                form.into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect::<Map<String, Value>>(),
            )
        };
        let Some(id) = self.store.append(record) else {
            warn!("Test record ids exhausted");
            return Err(Signal::status_with(
                StatusCode::CONFLICT,
                "No record id left to assign.",
            ));
        };
        info!(id, "Test record created");
        Err(ctx.created(id))
    }

    fn delete(&mut self, ctx: &mut RestContext) -> ExecResult {
        if let Some(Ok(id)) = Self::record_id(ctx) {
            let existed = self.store.remove(id).is_some();
            debug!(id, existed, "Test record deleted");
        }
        Err(Signal::status(StatusCode::NO_CONTENT))
    }

    fn options(&mut self, _ctx: &mut RestContext) -> ExecResult {
        Err(Signal::status(StatusCode::OK))
    }

    fn cors(&mut self, ctx: &mut RestContext) -> Result<(), Signal> {
        let Some(origin) = ctx.request().get_header("origin").map(str::to_string) else {
            return Ok(());
        };
        if self.origins.is_allowed(&origin) {
            ctx.apply_cors(&CorsOverrides::new().origin(origin).credentials(true));
        } else {
            debug!(origin = %origin, "Origin not on the allow-list, no CORS headers");
        }
        Ok(())
    }

    fn authorize(&mut self, ctx: &RestContext) -> bool {
        if ctx.method().eq_ignore_ascii_case("OPTIONS") {
            return true;
        }
        match &self.token {
            None => true,
            Some(token) => ctx
                .request()
                .get_header("authorization")
                .and_then(|h| h.strip_prefix("Bearer "))
                .is_some_and(|t| t.trim() == token),
        }
    }
}
