use std::collections::HashSet;

use crate::errors::Result;
use crate::model::Organization;
use crate::ops::store::RecordStore;
use crate::tree::ordering::is_ordered;

/// Every organization reachable from a root, grouped by tree
///
/// # Errors
/// Returns `Store` if the backend fails.
pub fn all_organizations<S: RecordStore + ?Sized>(store: &S) -> Result<Vec<Organization>> {
    let mut all = Vec::new();
    for root in store.roots()? {
        all.extend(store.tree_members(root.interval.tree_id)?);
    }
    Ok(all)
}

/// Find parents whose children break the Affiliated-before-Normal order
///
/// Returns the parent ids.
///
/// # Errors
/// Returns `Store` if the backend fails.
pub fn find_ordering_violations<S: RecordStore + ?Sized>(store: &S) -> Result<Vec<String>> {
    let mut violations = Vec::new();
    for org in all_organizations(store)? {
        if org.interval.is_leaf() {
            continue;
        }
        if !is_ordered(&store.get_by_parent(&org.id)?) {
            violations.push(org.id);
        }
    }
    Ok(violations)
}

/// Find organizations whose parent reference does not resolve
///
/// Returns list of (child_id, parent_id) tuples
///
/// # Errors
/// Returns `Store` if the backend fails.
pub fn find_dangling_parents<S: RecordStore + ?Sized>(store: &S) -> Result<Vec<(String, String)>> {
    let mut dangling = Vec::new();
    for org in all_organizations(store)? {
        if let Some(parent_id) = org.parent_id {
            if store.get(&parent_id)?.is_none() {
                dangling.push((org.id, parent_id));
            }
        }
    }
    Ok(dangling)
}

/// Find organizations whose successor chain returns to them
///
/// # Errors
/// Returns `Store` if the backend fails.
pub fn find_replacement_cycles<S: RecordStore + ?Sized>(store: &S) -> Result<Vec<String>> {
    let mut cyclic = Vec::new();
    for org in all_organizations(store)? {
        let mut visited = HashSet::new();
        let mut cursor = org.replaced_by.clone();
        while let Some(id) = cursor {
            if id == org.id {
                cyclic.push(org.id.clone());
                break;
            }
            if !visited.insert(id.clone()) {
                break;
            }
            cursor = store.get(&id)?.and_then(|o| o.replaced_by);
        }
    }
    Ok(cyclic)
}
