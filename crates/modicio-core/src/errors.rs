use modicio_core_types::{RequestId, TraceId};
use thiserror::Error;

/// Result type alias using ModicioError
pub type Result<T> = std::result::Result<T, ModicioError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure in the workspace classifies into one of these kinds. The
/// kind's `code()` is stable and is what callers (CLI exit messages, log
/// assertions, boundary adapters) should match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Resolution
    NotFound,
    AlreadyExists,

    // Model integrity
    InvariantViolation,
    CycleDetected,
    ConstraintViolation,

    // Requests
    InvalidInput,
    MalformedRequest,
    /// An accessor was requested over an object whose node is not in the model
    NotWired,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    Concurrency,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::InvariantViolation => "ERR_INVARIANT_VIOLATION",
            ExErrorKind::CycleDetected => "ERR_CYCLE_DETECTED",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::MalformedRequest => "ERR_MALFORMED_REQUEST",
            ExErrorKind::NotWired => "ERR_NOT_WIRED",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Used directly by the store and engine layers; kernel errors convert into
/// it through `From<ModicioError>`.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity context (node uri, variant id, data id, ...)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain failures raised by the in-memory kernel
///
/// The evolution variants display the exact messages evolution clients
/// have always received ("Class does not exist!" and friends).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModicioError {
    // ===== NotFound =====
    /// Slice root does not resolve within the model
    #[error("Root node not found: {uri}")]
    RootNotFound { uri: String },

    #[error("Node not found: {uri}")]
    NodeNotFound { uri: String },

    #[error("Class does not exist!")]
    ClassNotFound { name: String },

    #[error("Attribute does not exist!")]
    AttributeNotFound { name: String },

    #[error("Association does not exist!")]
    AssociationNotFound { name: String },

    #[error("Composition does not exist!")]
    CompositionNotFound { name: String },

    #[error("Parent relation does not exist!")]
    ParentRelationNotFound { name: String },

    /// Target of a new association, composition or parent relation
    #[error("No target class with this name found!")]
    TargetNotFound { name: String },

    #[error("No object of type {instance_of} in instance")]
    ObjectNotFound { instance_of: String },

    #[error("Fragment {global_id} holds no instance")]
    NoInstance { global_id: String },

    #[error("Fragment not found: {query}")]
    FragmentNotFound { query: String },

    #[error("Predecessor variant not found: {variant_id}")]
    VariantNotFound { variant_id: String },

    #[error("Undefined reference model")]
    ReferenceNotSet,

    #[error("Function not found: {name}")]
    FunctionNotFound { name: String },

    // ===== InvariantViolation =====
    #[error("Fragment {global_id} holds an instance and cannot be pushed as a model")]
    InstanceBearingPush { global_id: String },

    #[error("Fragment cannot become the reference: {reason}")]
    InvalidReference { reason: String },

    #[error("Attribute {attribute_uri} is concretized more than once in the closure of {node_uri}")]
    ConcretizationConflict {
        attribute_uri: String,
        node_uri: String,
    },

    #[error("Inheritance cycle through node {node_uri}")]
    InheritanceCycle { node_uri: String },

    #[error("Target {target_uri} is not compatible with relation {relation_uri}")]
    IncompatibleTarget {
        relation_uri: String,
        target_uri: String,
    },

    // ===== MalformedRequest =====
    #[error("Unknown evolution statement: {statement}")]
    UnknownStatement { statement: String },

    #[error("Statement '{statement}' needs an open {slot}")]
    SelectionNotOpen { statement: String, slot: String },

    #[error("Malformed statement '{statement}': {reason}")]
    MalformedArgument { statement: String, reason: String },

    // ===== Other =====
    /// Object references a node the model does not contain
    #[error("Object of type {instance_of} is not wired to a model node")]
    NotWired { instance_of: String },

    #[error("Node already exists: {uri}")]
    NodeAlreadyExists { uri: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl ModicioError {
    /// Kind of this error within the canonical taxonomy
    pub fn kind(&self) -> ExErrorKind {
        use ModicioError::*;
        match self {
            RootNotFound { .. }
            | NodeNotFound { .. }
            | ClassNotFound { .. }
            | AttributeNotFound { .. }
            | AssociationNotFound { .. }
            | CompositionNotFound { .. }
            | ParentRelationNotFound { .. }
            | TargetNotFound { .. }
            | ObjectNotFound { .. }
            | NoInstance { .. }
            | FragmentNotFound { .. }
            | VariantNotFound { .. }
            | ReferenceNotSet
            | FunctionNotFound { .. } => ExErrorKind::NotFound,
            InstanceBearingPush { .. }
            | InvalidReference { .. }
            | ConcretizationConflict { .. }
            | IncompatibleTarget { .. } => ExErrorKind::InvariantViolation,
            InheritanceCycle { .. } => ExErrorKind::CycleDetected,
            UnknownStatement { .. } | SelectionNotOpen { .. } | MalformedArgument { .. } => {
                ExErrorKind::MalformedRequest
            }
            NotWired { .. } => ExErrorKind::NotWired,
            NodeAlreadyExists { .. } => ExErrorKind::AlreadyExists,
            InvalidInput { .. } => ExErrorKind::InvalidInput,
            Serialization { .. } => ExErrorKind::Serialization,
        }
    }

    fn entity(&self) -> Option<&str> {
        use ModicioError::*;
        match self {
            RootNotFound { uri } | NodeNotFound { uri } | NodeAlreadyExists { uri } => Some(uri),
            ClassNotFound { name }
            | AttributeNotFound { name }
            | AssociationNotFound { name }
            | CompositionNotFound { name }
            | ParentRelationNotFound { name }
            | TargetNotFound { name }
            | FunctionNotFound { name } => Some(name),
            ObjectNotFound { instance_of } | NotWired { instance_of } => Some(instance_of),
            NoInstance { global_id } | InstanceBearingPush { global_id } => Some(global_id),
            VariantNotFound { variant_id } => Some(variant_id),
            ConcretizationConflict { node_uri, .. } | InheritanceCycle { node_uri } => {
                Some(node_uri)
            }
            IncompatibleTarget { target_uri, .. } => Some(target_uri),
            FragmentNotFound { .. }
            | ReferenceNotSet
            | InvalidReference { .. }
            | UnknownStatement { .. }
            | SelectionNotOpen { .. }
            | MalformedArgument { .. }
            | InvalidInput { .. }
            | Serialization { .. } => None,
        }
    }
}

impl From<ModicioError> for ExError {
    fn from(err: ModicioError) -> Self {
        let mut ex = ExError::new(err.kind()).with_message(err.to_string());
        if let Some(entity) = err.entity() {
            ex = ex.with_entity_id(entity);
        }
        ex
    }
}

impl From<serde_json::Error> for ModicioError {
    fn from(err: serde_json::Error) -> Self {
        ModicioError::Serialization {
            message: err.to_string(),
        }
    }
}
