//! Correlation types for request tracking and tracing
//!
//! A mutation request carries a `RequestContext` from the embedding service
//! down to the engine so that log events and errors can be joined back to
//! the request that caused them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! correlation_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh, time-ordered identifier (UUIDv7)
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            /// Get the string representation
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Wrap an identifier received from an upstream caller
            pub fn from_string(s: String) -> Self {
                Self(s)
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
    /// Unique identifier for a single mutation or query request
    RequestId
);

correlation_id!(
    /// Trace identifier propagated from the embedding service
    TraceId
);

correlation_id!(
    /// Span identifier for nested work inside one trace
    SpanId
);

/// Context carried through the engine boundary for correlation
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub trace_id: Option<TraceId>,
}

impl RequestContext {
    /// Create a new context with a fresh RequestId
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            trace_id: None,
        }
    }

    /// Create a context for a request id issued upstream
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            trace_id: None,
        }
    }

    /// Attach a TraceId to the context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Trace id as a string, empty when the request is untraced
    pub fn trace_str(&self) -> &str {
        self.trace_id.as_ref().map(TraceId::as_str).unwrap_or("")
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();

        assert_ne!(id1, id2);
        assert!(!id1.as_str().is_empty());
    }

    #[test]
    fn test_display_matches_as_str() {
        let id = TraceId::new();
        assert_eq!(format!("{}", id), id.as_str());

        let span = SpanId::from_string("span-1".to_string());
        assert_eq!(span.to_string(), "span-1");
    }

    #[test]
    fn test_request_context_trace() {
        let ctx = RequestContext::new();
        assert!(ctx.trace_id.is_none());
        assert_eq!(ctx.trace_str(), "");

        let trace_id = TraceId::from_string("trace-9".to_string());
        let ctx = ctx.with_trace_id(trace_id.clone());
        assert_eq!(ctx.trace_id, Some(trace_id));
        assert_eq!(ctx.trace_str(), "trace-9");
    }

    #[test]
    fn test_upstream_request_id_is_preserved() {
        let ctx = RequestContext::with_request_id(RequestId::from_string("req-1".to_string()));
        assert_eq!(ctx.request_id.as_str(), "req-1");
    }

    #[test]
    fn test_serialization() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: RequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
