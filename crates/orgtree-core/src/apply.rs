//! Functional-boundary apply function
//!
//! `apply()` is the canonical entry point for mutations.
//!
//! ## Atomicity Contract
//!
//! - **All-or-nothing**: either the command succeeds and a new valid state
//!   is returned, or it fails and the state the caller cloned from stays valid
//! - **No panics**: invalid input returns typed errors
//! - **Validated before commit**: trees touched by a structural command are
//!   checked; a violation surfaces `IntervalCorruption` and the new state is
//!   dropped
//!
//! ## Example
//!
//! ```
//! use orgtree_core::{apply, Command, MemoryStore, NewOrganization};
//! use orgtree_core::policy::NoStopPolicy;
//!
//! let state = MemoryStore::new();
//! let cmd = Command::CreateOrganization(NewOrganization::new("helsinki", "1", "City"));
//! let (state, outcome) = apply(state, cmd, &NoStopPolicy).unwrap();
//! assert_eq!(outcome.id, "helsinki:1");
//! assert_eq!(state.list().len(), 1);
//! ```

use std::collections::BTreeSet;
use std::time::Instant;

use crate::commands::Command;
use crate::errors::{OrgTreeError, Result};
use crate::mutation::{Mutation, MutationOutcome, MutationStage};
use crate::ops::store::RecordStore;
use crate::ops::{category_ops, organization_ops};
use crate::policy::DatasetPolicy;
use crate::replacement;
use crate::rules::validation;
use crate::{log_op_end, log_op_error, log_op_start};

/// Apply a command to a store, returning the new state
///
/// Ownership of the state moves in; callers that need the prior state on
/// failure keep a clone (see `Hierarchy`).
///
/// # Errors
///
/// Returns the first error raised by the command. Rejections such as
/// `CycleRejected`, `AlreadyReplaced`, `InvalidIdentity` and the not-found
/// family are recoverable; `IntervalCorruption` is not and is logged with
/// the full node and interval context.
pub fn apply<S: RecordStore>(
    mut state: S,
    cmd: Command,
    policy: &dyn DatasetPolicy,
) -> Result<(S, MutationOutcome)> {
    let op = cmd.op_name();
    let start = Instant::now();
    log_op_start!(op);

    match execute(&mut state, cmd, policy) {
        Ok(outcome) => {
            log_op_end!(
                op,
                duration_ms = start.elapsed().as_millis() as u64,
                org_id = %outcome.id
            );
            Ok((state, outcome))
        }
        Err(err) => {
            log_op_error!(
                op,
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            Err(err)
        }
    }
}

fn execute<S: RecordStore>(
    state: &mut S,
    cmd: Command,
    policy: &dyn DatasetPolicy,
) -> Result<MutationOutcome> {
    let mut mutation = Mutation::begin(cmd.op_name());

    let trees: BTreeSet<u64> = match cmd {
        Command::CreateOrganization(new) => {
            organization_ops::create_organization(state, new, policy, &mut mutation)?
        }

        Command::UpdateOrganization { id, patch } => {
            organization_ops::update_organization(state, &id, patch, policy, &mut mutation)?
        }

        Command::MoveOrganization {
            id,
            new_parent,
            position,
        } => organization_ops::move_organization(
            state,
            &id,
            new_parent.as_deref(),
            position,
            policy,
            &mut mutation,
        )?,

        Command::DeleteOrganization { id } => {
            organization_ops::delete_organization(state, &id, policy, &mut mutation)?
        }

        Command::SetReplacement { id, successor } => {
            mutation.identified(&id);
            match successor {
                Some(successor_id) => {
                    replacement::set_replacement(state, &id, &successor_id)?;
                }
                None => {
                    replacement::clear_replacement(state, &id)?;
                }
            }
            BTreeSet::new()
        }

        Command::CreateCategory {
            id,
            data_source_id,
            origin_id,
            name,
        } => {
            let category = category_ops::create_category(
                state,
                id.as_deref(),
                &data_source_id,
                &origin_id,
                &name,
            )?;
            mutation.identified(category.id);
            BTreeSet::new()
        }

        Command::DeleteCategory { id } => {
            mutation.identified(&id);
            category_ops::delete_category(state, &id)?;
            BTreeSet::new()
        }
    };

    for tree_id in trees {
        validation::validate_tree(state, tree_id)?;
    }
    mutation.advance(MutationStage::StructurallyPlaced);
    mutation.advance(MutationStage::PositionallyOrdered);
    Ok(mutation.commit())
}

/// True if `err` must abort the enclosing transaction rather than be reported
pub fn is_fatal(err: &OrgTreeError) -> bool {
    !err.is_recoverable()
}
