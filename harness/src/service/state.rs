//! @ai:module:intent Shared state for the grader service
//! @ai:module:layer application
//! @ai:module:public_api AppState
//! @ai:module:stateless false

use crate::trace::TraceStore;
use std::time::Duration;

/// @ai:intent State cloned into every request handler
#[derive(Clone, Default)]
pub struct AppState {
    pub traces: TraceStore,
}

impl AppState {
    /// @ai:effects pure
    pub fn new(traces: TraceStore) -> Self {
        Self { traces }
    }

    /// @ai:effects pure
    pub fn with_trace_ttl(ttl: Duration) -> Self {
        Self::new(TraceStore::with_ttl(ttl))
    }
}
