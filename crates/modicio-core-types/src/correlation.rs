//! Correlation identifiers
//!
//! A request entering the engine (an evolution, an instantiation, a reference
//! switch) is tagged with a `RequestId` so that every log line and every
//! `ExError` raised while serving it can be tied back together.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! correlation_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh, time-ordered identifier (UUIDv7)
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Wrap an identifier received from outside (CLI flag, log replay)
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

correlation_id!(
    /// Identifies one service call
    RequestId
);
correlation_id!(
    /// Identifies a chain of service calls (e.g. evolve then set-reference)
    TraceId
);
correlation_id!(
    /// Identifies one step inside a request
    SpanId
);

/// Correlation context threaded through engine services
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub trace_id: Option<TraceId>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            trace_id: None,
        }
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Derive a context for a follow-up request within the same trace.
    ///
    /// The trace id is kept (or started from the current request id when
    /// absent) and a new request id is issued.
    pub fn follow_up(&self) -> Self {
        let trace_id = self
            .trace_id
            .clone()
            .unwrap_or_else(|| TraceId::from_string(self.request_id.as_str()));
        Self {
            request_id: RequestId::new(),
            trace_id: Some(trace_id),
        }
    }
}
