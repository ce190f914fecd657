use orgtree_core_types::{RequestContext, RequestId, TraceId};
use thiserror::Error;

/// Result type alias using OrgTreeError
pub type Result<T> = std::result::Result<T, OrgTreeError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that embedding services can use
/// for programmatic handling and external responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Identity
    InvalidIdentity,
    AlreadyExists,

    // Structural/Validation
    InvalidInput,
    NotFound,
    CycleRejected,
    AlreadyReplaced,
    ConstraintViolation,

    // Tree index integrity (fatal)
    IntervalCorruption,

    // Integration
    Persistence,
    Config,
    Concurrency,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidIdentity => "ERR_INVALID_IDENTITY",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::CycleRejected => "ERR_CYCLE_REJECTED",
            ExErrorKind::AlreadyReplaced => "ERR_ALREADY_REPLACED",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::IntervalCorruption => "ERR_INTERVAL_CORRUPTION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether a request failing with this kind can be corrected and retried.
    ///
    /// Interval corruption and internal errors mean an invariant is already
    /// broken; the enclosing transaction must be aborted.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ExErrorKind::IntervalCorruption | ExErrorKind::Internal
        )
    }
}

/// Canonical structured error type
///
/// Classification fields for programmatic handling plus correlation
/// context for joining the error back to the request that raised it.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Copy request and trace ids from a request context
    pub fn with_context(mut self, ctx: &RequestContext) -> Self {
        self.request_id = Some(ctx.request_id.clone());
        self.trace_id = ctx.trace_id.clone();
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the trace ID context, if any
    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
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

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for hierarchy operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrgTreeError {
    // ===== Identity Errors =====
    /// Data source or origin id cannot form an unambiguous identity
    #[error("Invalid identity {data_source_id:?}:{origin_id:?}: {reason}")]
    InvalidIdentity {
        data_source_id: String,
        origin_id: String,
        reason: String,
    },

    /// Identity or (data source, origin id) pair is already taken
    #[error("Identity already exists: {id}")]
    DuplicateIdentity { id: String },

    // ===== Lookup Errors =====
    /// Organization not found in store
    #[error("Organization not found: {id}")]
    OrganizationNotFound { id: String },

    /// Referenced parent organization not found
    #[error("Parent organization not found: {id}")]
    ParentNotFound { id: String },

    /// Referenced successor organization not found
    #[error("Successor organization not found: {id}")]
    SuccessorNotFound { id: String },

    /// Referenced category not found
    #[error("Category not found: {id}")]
    CategoryNotFound { id: String },

    // ===== Structural Errors =====
    /// Mutation would make a node its own ancestor (tree) or successor (replacement chain)
    #[error("Cycle rejected: {node_id} cannot be placed under or replaced by {target_id}")]
    CycleRejected { node_id: String, target_id: String },

    /// Successor is already the replacement of another organization
    #[error("Organization {successor_id} already replaces {replaced_id}")]
    AlreadyReplaced {
        successor_id: String,
        replaced_id: String,
    },

    /// Category is still referenced and cannot be deleted
    #[error("Cannot delete category {category_id}: referenced by {reference_count} organizations")]
    CategoryProtected {
        category_id: String,
        reference_count: usize,
    },

    // ===== Validation Errors =====
    /// Invalid name (empty or whitespace-only)
    #[error("Invalid name: {reason}")]
    InvalidName { reason: String },

    // ===== Tree Index Integrity =====
    /// Tree index invariant violated (fatal)
    #[error("Interval corruption at {node_id} (tree {tree_id}, [{left}, {right}], level {level}): {reason}")]
    IntervalCorruption {
        node_id: String,
        tree_id: u64,
        left: u64,
        right: u64,
        level: u32,
        reason: String,
    },

    // ===== Integration Errors =====
    /// Record store backend failure
    #[error("Store error: {message}")]
    Store { message: String },

    /// Settings could not be loaded or are invalid
    #[error("Config error: {message}")]
    Config { message: String },

    /// Shared state lock was poisoned by a panicking writer
    #[error("Concurrency error: {message}")]
    Concurrency { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl OrgTreeError {
    /// Canonical kind for this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            OrgTreeError::InvalidIdentity { .. } => ExErrorKind::InvalidIdentity,
            OrgTreeError::DuplicateIdentity { .. } => ExErrorKind::AlreadyExists,
            OrgTreeError::OrganizationNotFound { .. }
            | OrgTreeError::ParentNotFound { .. }
            | OrgTreeError::SuccessorNotFound { .. }
            | OrgTreeError::CategoryNotFound { .. } => ExErrorKind::NotFound,
            OrgTreeError::CycleRejected { .. } => ExErrorKind::CycleRejected,
            OrgTreeError::AlreadyReplaced { .. } => ExErrorKind::AlreadyReplaced,
            OrgTreeError::CategoryProtected { .. } => ExErrorKind::ConstraintViolation,
            OrgTreeError::InvalidName { .. } => ExErrorKind::InvalidInput,
            OrgTreeError::IntervalCorruption { .. } => ExErrorKind::IntervalCorruption,
            OrgTreeError::Store { .. } => ExErrorKind::Persistence,
            OrgTreeError::Config { .. } => ExErrorKind::Config,
            OrgTreeError::Concurrency { .. } => ExErrorKind::Concurrency,
            OrgTreeError::Internal { .. } => ExErrorKind::Internal,
        }
    }

    /// Whether the request can be corrected and retried (see [`ExErrorKind::is_recoverable`])
    pub fn is_recoverable(&self) -> bool {
        self.kind().is_recoverable()
    }

    fn entity_id(&self) -> Option<&str> {
        match self {
            OrgTreeError::DuplicateIdentity { id }
            | OrgTreeError::OrganizationNotFound { id }
            | OrgTreeError::ParentNotFound { id }
            | OrgTreeError::SuccessorNotFound { id }
            | OrgTreeError::CategoryNotFound { id } => Some(id),
            OrgTreeError::CycleRejected { node_id, .. }
            | OrgTreeError::IntervalCorruption { node_id, .. } => Some(node_id),
            OrgTreeError::AlreadyReplaced { successor_id, .. } => Some(successor_id),
            OrgTreeError::CategoryProtected { category_id, .. } => Some(category_id),
            _ => None,
        }
    }
}

/// Conversion from OrgTreeError to the structured facility
impl From<OrgTreeError> for ExError {
    fn from(err: OrgTreeError) -> Self {
        let mut ex = ExError::new(err.kind()).with_message(err.to_string());
        if let Some(id) = err.entity_id() {
            ex = ex.with_entity_id(id);
        }
        ex
    }
}
