use tracing::error;

use crate::errors::{OrgTreeError, Result};
use crate::model::Organization;
use crate::ops::store::RecordStore;

fn corruption(org: &Organization, reason: impl Into<String>) -> OrgTreeError {
    let iv = org.interval;
    let err = OrgTreeError::IntervalCorruption {
        node_id: org.id.clone(),
        tree_id: iv.tree_id,
        left: iv.left,
        right: iv.right,
        level: iv.level,
        reason: reason.into(),
    };
    error!(
        org_id = %org.id,
        parent_id = ?org.parent_id,
        tree_id = iv.tree_id,
        left = iv.left,
        right = iv.right,
        level = iv.level,
        "{}",
        err
    );
    err
}

/// Validate the nested intervals of one tree
///
/// Checks that bounds are exactly `1..=2n`, that each interval nests inside
/// its parent's, that `level` counts ancestors, and that the tree has a
/// single root.
///
/// # Errors
/// * `IntervalCorruption` - On the first violated invariant
pub fn validate_tree<S: RecordStore + ?Sized>(store: &S, tree_id: u64) -> Result<()> {
    let members = store.tree_members(tree_id)?;
    let Some(root) = members.first() else {
        return Ok(());
    };

    let expected_right = 2 * members.len() as u64;
    if root.interval.left != 1 || root.interval.right != expected_right {
        return Err(corruption(
            root,
            format!("root must span 1..={}", expected_right),
        ));
    }
    if root.parent_id.is_some() || root.interval.level != 0 {
        return Err(corruption(root, "first member of the tree is not a root"));
    }

    let mut bounds: Vec<u64> = Vec::with_capacity(members.len() * 2);
    let mut stack: Vec<&Organization> = Vec::new();

    for member in &members {
        let iv = member.interval;
        if iv.left >= iv.right {
            return Err(corruption(member, "left bound must be below right bound"));
        }
        bounds.push(iv.left);
        bounds.push(iv.right);

        while stack
            .last()
            .is_some_and(|top| top.interval.right < iv.left)
        {
            stack.pop();
        }

        match stack.last() {
            None if member.id != root.id => {
                return Err(corruption(member, "interval lies outside the tree root"));
            }
            None => {}
            Some(parent) => {
                if iv.right >= parent.interval.right {
                    return Err(corruption(member, "interval overlaps its enclosing interval"));
                }
                if member.parent_id.as_deref() != Some(parent.id.as_str()) {
                    return Err(corruption(
                        member,
                        format!("enclosed by {} but parent is {:?}", parent.id, member.parent_id),
                    ));
                }
                if iv.level != parent.interval.level + 1 {
                    return Err(corruption(member, "level does not match ancestor count"));
                }
            }
        }
        stack.push(member);
    }

    bounds.sort_unstable();
    if bounds.iter().zip(1u64..).any(|(bound, expected)| *bound != expected) {
        return Err(corruption(root, "bounds are not the gap-free sequence 1..=2n"));
    }
    Ok(())
}

/// Validate every tree that has a root
///
/// # Errors
/// * `IntervalCorruption` - On the first violated invariant
pub fn validate_forest<S: RecordStore + ?Sized>(store: &S) -> Result<()> {
    for root in store.roots()? {
        validate_tree(store, root.interval.tree_id)?;
    }
    Ok(())
}
