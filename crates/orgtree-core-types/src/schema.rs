//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names identical between the logging macros,
//! the error facility and the test capture layer.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Entity identifiers
pub const FIELD_ORG_ID: &str = "org_id";
pub const FIELD_PARENT_ID: &str = "parent_id";

// Tree index context
pub const FIELD_TREE_ID: &str = "tree_id";
pub const FIELD_LEFT: &str = "left";
pub const FIELD_RIGHT: &str = "right";
pub const FIELD_LEVEL: &str = "level";
pub const FIELD_STAGE: &str = "stage";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
