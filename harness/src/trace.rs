//! @ai:module:intent Time-bounded record of which traces invoked a tool before grading
//! @ai:module:layer infrastructure
//! @ai:module:public_api TraceStore, TraceStoreTrait, DEFAULT_TRACE_TTL
//! @ai:module:stateless false

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Records older than this are treated as absent.
pub const DEFAULT_TRACE_TTL: Duration = Duration::from_secs(30 * 60);

/// @ai:intent Trait for the tool-call trace record
pub trait TraceStoreTrait: Send + Sync {
    /// @ai:intent Record that a tool ran for this trace
    fn mark_tool_called(&self, trace_id: &str) -> impl std::future::Future<Output = ()> + Send;

    /// @ai:intent Whether a live record says a tool ran for this trace
    fn was_tool_called(&self, trace_id: &str) -> impl std::future::Future<Output = bool> + Send;
}

#[derive(Debug, Clone, Copy)]
struct TraceRecord {
    tool_called: bool,
    seen_at: Instant,
}

/// @ai:intent Shared trace_id -> tool_called map with lazy TTL eviction
///            Last write wins; an empty trace id is never recorded
#[derive(Clone)]
pub struct TraceStore {
    records: Arc<Mutex<HashMap<String, TraceRecord>>>,
    ttl: Duration,
}

impl TraceStore {
    /// @ai:intent Create a store with the default 30 minute TTL
    /// @ai:effects pure
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TRACE_TTL)
    }

    /// @ai:effects pure
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// @ai:intent Number of records currently held, stale ones included
    /// @ai:effects state:read
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// @ai:intent Drop every stale record, returning how many were removed
    /// @ai:effects state:write, time
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, record| now.duration_since(record.seen_at) <= self.ttl);
        before - records.len()
    }
}

impl Default for TraceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceStoreTrait for TraceStore {
    /// @ai:effects state:write, time
    async fn mark_tool_called(&self, trace_id: &str) {
        if trace_id.is_empty() {
            return;
        }

        let record = TraceRecord {
            tool_called: true,
            seen_at: Instant::now(),
        };
        self.records.lock().await.insert(trace_id.to_string(), record);
        tracing::debug!("trace {} marked as tool-called", trace_id);
    }

    /// @ai:effects state:write, time
    async fn was_tool_called(&self, trace_id: &str) -> bool {
        if trace_id.is_empty() {
            return false;
        }

        let mut records = self.records.lock().await;
        let Some(record) = records.get(trace_id).copied() else {
            return false;
        };

        if record.seen_at.elapsed() > self.ttl {
            records.remove(trace_id);
            tracing::debug!("trace {} expired", trace_id);
            return false;
        }

        record.tool_called
    }
}
