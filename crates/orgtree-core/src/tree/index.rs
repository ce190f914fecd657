//! Nested-interval maintenance
//!
//! Every structural mutation keeps each tree's bounds a gap-free `1..=2n`
//! sequence: inserting opens a gap of the inserted span, removing closes it.
//! Writes of one step go through `RecordStore::update_many` so a backend can
//! apply them as a single statement.

use std::collections::HashSet;

use tracing::debug;

use crate::errors::{OrgTreeError, Result};
use crate::model::{Interval, Organization};
use crate::ops::store::RecordStore;

/// Placement of a node among its new siblings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    FirstChild,
    LastChild,
}

/// Placement resolved against the destination's current children
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Slot {
    FirstChild,
    LastChild,
    Before(String),
    After(String),
}

impl From<Position> for Slot {
    fn from(position: Position) -> Self {
        match position {
            Position::FirstChild => Slot::FirstChild,
            Position::LastChild => Slot::LastChild,
        }
    }
}

pub(crate) fn load<S: RecordStore + ?Sized>(store: &S, id: &str) -> Result<Organization> {
    store
        .get(id)?
        .ok_or_else(|| OrgTreeError::OrganizationNotFound { id: id.to_string() })
}

pub(crate) fn load_parent<S: RecordStore + ?Sized>(store: &S, id: &str) -> Result<Organization> {
    store
        .get(id)?
        .ok_or_else(|| OrgTreeError::ParentNotFound { id: id.to_string() })
}

/// Bound at which a node placed in `slot` under `parent` will start
fn gap_point<S: RecordStore + ?Sized>(
    store: &S,
    parent: &Organization,
    slot: &Slot,
) -> Result<u64> {
    let sibling_bound = |sibling_id: &str, after: bool| -> Result<u64> {
        let sibling = load(store, sibling_id)?;
        if sibling.parent_id.as_deref() != Some(parent.id.as_str()) {
            return Err(OrgTreeError::Internal {
                message: format!(
                    "placement anchor {} is not a child of {}",
                    sibling_id, parent.id
                ),
            });
        }
        Ok(if after {
            sibling.interval.right + 1
        } else {
            sibling.interval.left
        })
    };

    match slot {
        Slot::FirstChild => Ok(parent.interval.left + 1),
        Slot::LastChild => Ok(parent.interval.right),
        Slot::Before(sibling_id) => sibling_bound(sibling_id, false),
        Slot::After(sibling_id) => sibling_bound(sibling_id, true),
    }
}

/// Shift every bound `>= point` in the tree right by `width`
fn open_gap<S: RecordStore + ?Sized>(
    store: &mut S,
    tree_id: u64,
    point: u64,
    width: u64,
    skip: &HashSet<String>,
) -> Result<()> {
    let mut shifted = Vec::new();
    for mut member in store.tree_members(tree_id)? {
        if skip.contains(&member.id) {
            continue;
        }
        let iv = &mut member.interval;
        let mut moved = false;
        if iv.left >= point {
            iv.left += width;
            moved = true;
        }
        if iv.right >= point {
            iv.right += width;
            moved = true;
        }
        if moved {
            shifted.push(member);
        }
    }
    store.update_many(shifted)
}

/// Shift every bound `> after` in the tree left by `width`
fn close_gap<S: RecordStore + ?Sized>(
    store: &mut S,
    tree_id: u64,
    after: u64,
    width: u64,
    skip: &HashSet<String>,
) -> Result<()> {
    let mut shifted = Vec::new();
    for mut member in store.tree_members(tree_id)? {
        if skip.contains(&member.id) {
            continue;
        }
        let iv = &mut member.interval;
        let mut moved = false;
        if iv.left > after {
            iv.left -= width;
            moved = true;
        }
        if iv.right > after {
            iv.right -= width;
            moved = true;
        }
        if moved {
            shifted.push(member);
        }
    }
    store.update_many(shifted)
}

/// Persist `org` as the single node of a fresh tree
///
/// # Errors
/// * `DuplicateIdentity` - If the store already holds this identity
pub fn insert_root<S: RecordStore + ?Sized>(
    store: &mut S,
    mut org: Organization,
) -> Result<Organization> {
    let tree_id = store.next_tree_id()?;
    org.parent_id = None;
    org.interval = Interval::root(tree_id);
    debug!(org_id = %org.id, tree_id, "insert_root");
    store.create(org.clone())?;
    Ok(org)
}

/// Persist `org` as a child of `parent_id`
///
/// # Errors
/// * `ParentNotFound` - If the parent does not exist
/// * `DuplicateIdentity` - If the store already holds this identity
pub fn insert_child<S: RecordStore + ?Sized>(
    store: &mut S,
    org: Organization,
    parent_id: &str,
    position: Position,
) -> Result<Organization> {
    insert_at(store, org, parent_id, &position.into())
}

pub(crate) fn insert_at<S: RecordStore + ?Sized>(
    store: &mut S,
    mut org: Organization,
    parent_id: &str,
    slot: &Slot,
) -> Result<Organization> {
    let parent = load_parent(store, parent_id)?;
    let point = gap_point(store, &parent, slot)?;
    let tree_id = parent.interval.tree_id;

    open_gap(store, tree_id, point, 2, &HashSet::new())?;

    org.parent_id = Some(parent.id.clone());
    org.interval = Interval::leaf_at(tree_id, point, parent.interval.level);
    debug!(org_id = %org.id, parent_id, tree_id, left = point, "insert_child");
    store.create(org.clone())?;
    Ok(org)
}

/// Move a node and its whole subtree
///
/// With `new_parent = None` the node becomes the root of a new tree.
///
/// # Errors
/// * `OrganizationNotFound` - If the node does not exist
/// * `ParentNotFound` - If the new parent does not exist
/// * `CycleRejected` - If the new parent is the node or one of its descendants
pub fn move_node<S: RecordStore + ?Sized>(
    store: &mut S,
    node_id: &str,
    new_parent: Option<&str>,
    position: Position,
) -> Result<()> {
    move_to(store, node_id, new_parent, &position.into())
}

pub(crate) fn move_to<S: RecordStore + ?Sized>(
    store: &mut S,
    node_id: &str,
    new_parent: Option<&str>,
    slot: &Slot,
) -> Result<()> {
    let node = load(store, node_id)?;

    if let Some(parent_id) = new_parent {
        let parent = load_parent(store, parent_id)?;
        if node.interval.contains_or_equals(&parent.interval) {
            return Err(OrgTreeError::CycleRejected {
                node_id: node_id.to_string(),
                target_id: parent_id.to_string(),
            });
        }
    } else if node.is_root() {
        return Ok(());
    }

    let origin = node.interval;
    let subtree = store.tree_range(origin.tree_id, origin.left, origin.right)?;
    let skip: HashSet<String> = subtree.iter().map(|o| o.id.clone()).collect();
    let width = origin.span();

    close_gap(store, origin.tree_id, origin.right, width, &skip)?;

    let (tree_id, base_left, base_level) = match new_parent {
        None => (store.next_tree_id()?, 1, 0),
        Some(parent_id) => {
            // Re-read: closing the gap may have shifted the parent and anchors.
            let parent = load_parent(store, parent_id)?;
            let point = gap_point(store, &parent, slot)?;
            open_gap(store, parent.interval.tree_id, point, width, &skip)?;
            (parent.interval.tree_id, point, parent.interval.level + 1)
        }
    };

    let rebased: Vec<Organization> = subtree
        .into_iter()
        .map(|mut member| {
            let iv = member.interval;
            member.interval = Interval {
                tree_id,
                left: base_left + (iv.left - origin.left),
                right: base_left + (iv.right - origin.left),
                level: base_level + (iv.level - origin.level),
            };
            if member.id == node_id {
                member.parent_id = new_parent.map(str::to_string);
                member.touch();
            }
            member
        })
        .collect();

    debug!(
        org_id = node_id,
        from_tree = origin.tree_id,
        tree_id,
        left = base_left,
        size = rebased.len(),
        "move"
    );
    store.update_many(rebased)
}

/// Re-root every direct child of a node that is about to be deleted
///
/// Each former child becomes the root of its own new tree, keeping its
/// subtree. Returns the re-rooted ids in former sibling order.
///
/// # Errors
/// * `OrganizationNotFound` - If the node does not exist
pub fn detach_children_on_delete<S: RecordStore + ?Sized>(
    store: &mut S,
    node_id: &str,
) -> Result<Vec<String>> {
    load(store, node_id)?;
    let children = store.get_by_parent(node_id)?;
    let mut rerooted = Vec::with_capacity(children.len());
    for child in children {
        move_to(store, &child.id, None, &Slot::LastChild)?;
        rerooted.push(child.id);
    }
    Ok(rerooted)
}

/// Remove a node from the index and the store
///
/// Children are re-rooted first; the node's then-empty interval is closed
/// before the record is deleted. Returns the removed record and the ids of
/// the re-rooted children.
///
/// # Errors
/// * `OrganizationNotFound` - If the node does not exist
pub fn delete_node<S: RecordStore + ?Sized>(
    store: &mut S,
    node_id: &str,
) -> Result<(Organization, Vec<String>)> {
    let rerooted = detach_children_on_delete(store, node_id)?;

    let node = load(store, node_id)?;
    let mut skip = HashSet::new();
    skip.insert(node.id.clone());
    close_gap(store, node.interval.tree_id, node.interval.right, 2, &skip)?;

    let removed = store.delete(node_id)?;
    debug!(org_id = node_id, rerooted = rerooted.len(), "delete");
    Ok((removed, rerooted))
}
