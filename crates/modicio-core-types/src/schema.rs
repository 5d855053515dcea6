//! Canonical schema constants for structured logging

// Canonical field keys
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Coordinates
pub const FIELD_VARIANT_ID: &str = "variant_id";
pub const FIELD_RUNNING_ID: &str = "running_id";
pub const FIELD_GLOBAL_ID: &str = "global_id";
pub const FIELD_DATA_ID: &str = "data_id";
pub const FIELD_NODE_URI: &str = "node_uri";

// Collection sizes
pub const FIELD_SLICE_LEN: &str = "slice_len";
pub const FIELD_OBJECT_COUNT: &str = "object_count";
pub const FIELD_STATEMENT_COUNT: &str = "statement_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
