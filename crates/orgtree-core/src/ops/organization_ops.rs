//! Organization mutations
//!
//! Each operation runs against a working copy inside `apply()` and reports
//! the stages it reaches. Returned tree ids are the trees whose intervals
//! changed and must be validated before commit.

use std::collections::BTreeSet;

use crate::errors::{OrgTreeError, Result};
use crate::identity;
use crate::model::{NewOrganization, Organization, OrganizationPatch};
use crate::mutation::{Mutation, MutationStage};
use crate::naming;
use crate::ops::store::RecordStore;
use crate::policy::DatasetPolicy;
use crate::tree::index::{self, load, move_to, Position, Slot};
use crate::tree::ordering::{default_position, place_by_kind, resolve_slot};

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(OrgTreeError::InvalidName {
            reason: "name cannot be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn ensure_category<S: RecordStore + ?Sized>(store: &S, category_id: &str) -> Result<()> {
    match store.get_category(category_id)? {
        Some(_) => Ok(()),
        None => Err(OrgTreeError::CategoryNotFound {
            id: category_id.to_string(),
        }),
    }
}

/// Move `id` under `new_parent` honoring `position` within its kind group
fn relocate<S: RecordStore + ?Sized>(
    store: &mut S,
    org: &Organization,
    new_parent: Option<&str>,
    position: Position,
) -> Result<()> {
    match new_parent {
        Some(parent_id) => {
            index::load_parent(store, parent_id)?;
            let slot = resolve_slot(store, &org.id, org.kind, parent_id, position)?;
            move_to(store, &org.id, Some(parent_id), &slot)
        }
        None => move_to(store, &org.id, None, &Slot::LastChild),
    }
}

/// Create an organization, place it, order it and name it
///
/// # Errors
/// * `InvalidName` - If the name is blank
/// * `InvalidIdentity` - If the identity cannot be derived
/// * `DuplicateIdentity` - If the identity or (data source, origin id) pair is taken
/// * `CategoryNotFound` - If the classification does not exist
/// * `ParentNotFound` - If the parent does not exist
pub(crate) fn create_organization<S: RecordStore + ?Sized>(
    store: &mut S,
    new: NewOrganization,
    policy: &dyn DatasetPolicy,
    mutation: &mut Mutation,
) -> Result<BTreeSet<u64>> {
    let name = validate_name(&new.name)?;
    let id = identity::assign(new.id.as_deref(), &new.data_source_id, &new.origin_id)?;
    mutation.identified(&id);

    if store.get(&id)?.is_some() {
        return Err(OrgTreeError::DuplicateIdentity { id });
    }
    if let Some(existing) = store.get_by_identity_key(&new.data_source_id, &new.origin_id)? {
        return Err(OrgTreeError::DuplicateIdentity { id: existing.id });
    }
    if let Some(category_id) = new.classification_id.as_deref() {
        ensure_category(store, category_id)?;
    }

    let mut org = Organization::new(id.clone(), new.data_source_id, new.origin_id, name);
    org.kind = new.kind;
    org.abbreviation = new.abbreviation;
    org.classification_id = new.classification_id;
    org.founding_date = new.founding_date;
    org.dissolution_date = new.dissolution_date;
    org.last_modified_by = new.created_by.clone();
    org.created_by = new.created_by;

    let placed = match new.parent_id.as_deref() {
        None => index::insert_root(store, org)?,
        Some(parent_id) => index::insert_child(store, org, parent_id, Position::LastChild)?,
    };
    mutation.advance(MutationStage::StructurallyPlaced);

    place_by_kind(store, &id)?;
    mutation.advance(MutationStage::PositionallyOrdered);

    naming::refresh(store, &id, policy)?;

    let mut trees = BTreeSet::new();
    trees.insert(placed.interval.tree_id);
    Ok(trees)
}

/// Apply field edits; a parent change moves the subtree, a kind change reorders it
///
/// # Errors
/// * `OrganizationNotFound` - If the organization does not exist
/// * `InvalidName` - If the new name is blank
/// * `CategoryNotFound` - If the new classification does not exist
/// * `ParentNotFound` - If the new parent does not exist
/// * `CycleRejected` - If the new parent is the organization or a descendant
pub(crate) fn update_organization<S: RecordStore + ?Sized>(
    store: &mut S,
    id: &str,
    patch: OrganizationPatch,
    policy: &dyn DatasetPolicy,
    mutation: &mut Mutation,
) -> Result<BTreeSet<u64>> {
    let mut org = load(store, id)?;
    mutation.identified(id);

    let touches_label = patch.touches_label();
    let mut trees = BTreeSet::new();
    trees.insert(org.interval.tree_id);

    if let Some(name) = patch.name {
        org.name = validate_name(&name)?;
    }
    if let Some(abbreviation) = patch.abbreviation {
        org.abbreviation = abbreviation;
    }
    if let Some(classification_id) = patch.classification_id {
        if let Some(category_id) = classification_id.as_deref() {
            ensure_category(store, category_id)?;
        }
        org.classification_id = classification_id;
    }
    if let Some(founding_date) = patch.founding_date {
        org.founding_date = founding_date;
    }
    if let Some(dissolution_date) = patch.dissolution_date {
        org.dissolution_date = dissolution_date;
    }
    if let Some(actor) = patch.last_modified_by {
        org.last_modified_by = Some(actor);
    }
    let kind_changed = patch.kind.is_some_and(|kind| kind != org.kind);
    if let Some(kind) = patch.kind {
        org.kind = kind;
    }
    org.touch();
    store.update(org.clone())?;

    let reparented = match patch.parent_id {
        Some(new_parent) if new_parent != org.parent_id => {
            relocate(store, &org, new_parent.as_deref(), default_position(org.kind))?;
            true
        }
        _ => false,
    };
    mutation.advance(MutationStage::StructurallyPlaced);

    if kind_changed && !reparented {
        place_by_kind(store, id)?;
    }
    mutation.advance(MutationStage::PositionallyOrdered);

    if touches_label {
        naming::refresh(store, id, policy)?;
    }

    trees.insert(load(store, id)?.interval.tree_id);
    Ok(trees)
}

/// Move an organization and its subtree
///
/// # Errors
/// * `OrganizationNotFound` - If the organization does not exist
/// * `ParentNotFound` - If the new parent does not exist
/// * `CycleRejected` - If the new parent is the organization or a descendant
pub(crate) fn move_organization<S: RecordStore + ?Sized>(
    store: &mut S,
    id: &str,
    new_parent: Option<&str>,
    position: Position,
    policy: &dyn DatasetPolicy,
    mutation: &mut Mutation,
) -> Result<BTreeSet<u64>> {
    let org = load(store, id)?;
    mutation.identified(id);

    let mut trees = BTreeSet::new();
    trees.insert(org.interval.tree_id);

    relocate(store, &org, new_parent, position)?;
    mutation.advance(MutationStage::StructurallyPlaced);
    // The slot was resolved inside the kind group, so the order already holds.
    mutation.advance(MutationStage::PositionallyOrdered);

    naming::refresh(store, id, policy)?;

    trees.insert(load(store, id)?.interval.tree_id);
    Ok(trees)
}

/// Delete an organization
///
/// Children are re-rooted, any `replaced_by` link pointing at the
/// organization is cleared, then the record is removed.
///
/// # Errors
/// * `OrganizationNotFound` - If the organization does not exist
pub(crate) fn delete_organization<S: RecordStore + ?Sized>(
    store: &mut S,
    id: &str,
    policy: &dyn DatasetPolicy,
    mutation: &mut Mutation,
) -> Result<BTreeSet<u64>> {
    let org = load(store, id)?;
    mutation.identified(id);

    if let Some(mut predecessor) = store.find_replacing(id)? {
        predecessor.replaced_by = None;
        predecessor.touch();
        store.update(predecessor)?;
    }

    let mut trees = BTreeSet::new();
    trees.insert(org.interval.tree_id);

    let (_, rerooted) = index::delete_node(store, id)?;
    mutation.advance(MutationStage::StructurallyPlaced);
    mutation.advance(MutationStage::PositionallyOrdered);

    for child_id in &rerooted {
        naming::refresh(store, child_id, policy)?;
        trees.insert(load(store, child_id)?.interval.tree_id);
    }
    Ok(trees)
}
