//! Shared hierarchy handle
//!
//! `Hierarchy` serializes mutations of the whole forest behind one write
//! lock. Each mutation runs `apply()` on a clone of the committed state and
//! swaps the result in only on success, so readers holding the read lock
//! never observe intermediate intervals.
//!
//! That clone is the transaction: `MemoryStore` copies the whole forest per
//! mutation. A store backed by a database should make `Clone` cheap (a
//! handle onto an open transaction) or call `apply()` inside its own
//! transaction instead of going through `Hierarchy`.

use std::sync::{Arc, PoisonError, RwLock};

use orgtree_core_types::RequestContext;
use tracing::{info_span, warn};

use crate::apply::apply;
use crate::commands::Command;
use crate::errors::{ExError, OrgTreeError, Result};
use crate::model::Organization;
use crate::mutation::MutationOutcome;
use crate::naming;
use crate::ops::store::RecordStore;
use crate::policy::DatasetPolicy;
use crate::rules::validation;
use crate::tree::index::load;

fn poisoned<T>(_: PoisonError<T>) -> OrgTreeError {
    OrgTreeError::Concurrency {
        message: "hierarchy lock poisoned by a panicking writer".to_string(),
    }
}

/// Shared handle over a committed store
///
/// Every `execute` clones the committed store as its working copy.
pub struct Hierarchy<S: RecordStore + Clone> {
    state: RwLock<S>,
    policy: Arc<dyn DatasetPolicy>,
}

impl<S: RecordStore + Clone> Hierarchy<S> {
    pub fn new(state: S, policy: Arc<dyn DatasetPolicy>) -> Self {
        Self {
            state: RwLock::new(state),
            policy,
        }
    }

    pub fn policy(&self) -> &dyn DatasetPolicy {
        self.policy.as_ref()
    }

    /// Apply `cmd` atomically
    ///
    /// # Errors
    /// Any error of `apply()`; the committed state is unchanged on error.
    /// `Concurrency` if the lock was poisoned.
    pub fn execute(&self, cmd: Command) -> Result<MutationOutcome> {
        let mut guard = self.state.write().map_err(poisoned)?;
        let working = guard.clone();
        let (next, outcome) = apply(working, cmd, self.policy.as_ref())?;
        *guard = next;
        Ok(outcome)
    }

    /// Apply `cmd` inside a request span, mapping failures to the error facility
    ///
    /// # Errors
    /// The command's error as an `ExError` carrying op, entity and correlation ids.
    pub fn execute_with_context(
        &self,
        ctx: &RequestContext,
        cmd: Command,
    ) -> std::result::Result<MutationOutcome, ExError> {
        let op = cmd.op_name();
        let span = info_span!(
            "request",
            request_id = %ctx.request_id,
            trace_id = ctx.trace_str()
        );
        let _enter = span.enter();

        self.execute(cmd).map_err(|err| {
            if !err.is_recoverable() {
                warn!(component = module_path!(), op, error = %err, "fatal mutation error");
            }
            ExError::from(err).with_op(op).with_context(ctx)
        })
    }

    /// Run `f` against the committed state under the read lock
    ///
    /// # Errors
    /// `Concurrency` if the lock was poisoned, else whatever `f` returns.
    pub fn read<T>(&self, f: impl FnOnce(&S) -> Result<T>) -> Result<T> {
        let guard = self.state.read().map_err(poisoned)?;
        f(&guard)
    }

    /// Copy of the committed state
    ///
    /// # Errors
    /// `Concurrency` if the lock was poisoned.
    pub fn snapshot(&self) -> Result<S> {
        self.read(|s| Ok(s.clone()))
    }

    /// # Errors
    /// `OrganizationNotFound` if `id` is unknown.
    pub fn get(&self, id: &str) -> Result<Organization> {
        self.read(|s| load(s, id))
    }

    /// Resolve a distinct name with an explicit level count
    ///
    /// # Errors
    /// `OrganizationNotFound` if `id` is unknown, `ParentNotFound` on a dangling ancestor.
    pub fn resolve_name(&self, id: &str, max_levels: usize) -> Result<String> {
        self.read(|s| {
            let org = load(s, id)?;
            naming::resolve(s, &org, self.policy.as_ref(), max_levels)
        })
    }

    /// Validate every tree of the committed state
    ///
    /// # Errors
    /// `IntervalCorruption` on the first violation.
    pub fn check_integrity(&self) -> Result<()> {
        self.read(|s| validation::validate_forest(s))
    }
}
