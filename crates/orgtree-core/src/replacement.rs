//! Replacement chain
//!
//! `replaced_by` links an organization to its successor. Each organization
//! is the successor of at most one other, and following the links never
//! returns to the start. The chain is independent of the tree index.

use crate::errors::{OrgTreeError, Result};
use crate::model::Organization;
use crate::ops::store::RecordStore;
use crate::tree::index::load;

fn load_successor<S: RecordStore + ?Sized>(store: &S, id: &str) -> Result<Organization> {
    store
        .get(id)?
        .ok_or_else(|| OrgTreeError::SuccessorNotFound { id: id.to_string() })
}

/// Record that `successor_id` replaces `id`
///
/// # Errors
/// * `OrganizationNotFound` - If `id` does not exist
/// * `SuccessorNotFound` - If `successor_id` does not exist
/// * `AlreadyReplaced` - If another organization is already replaced by `successor_id`
/// * `CycleRejected` - If the successor's chain leads back to `id`
pub fn set_replacement<S: RecordStore + ?Sized>(
    store: &mut S,
    id: &str,
    successor_id: &str,
) -> Result<Organization> {
    let mut org = load(store, id)?;
    load_successor(store, successor_id)?;

    if id == successor_id {
        return Err(OrgTreeError::CycleRejected {
            node_id: id.to_string(),
            target_id: successor_id.to_string(),
        });
    }

    if let Some(existing) = store.find_replacing(successor_id)? {
        if existing.id != id {
            return Err(OrgTreeError::AlreadyReplaced {
                successor_id: successor_id.to_string(),
                replaced_id: existing.id,
            });
        }
        return Ok(org);
    }

    // Bounded by the record count: a longer walk means an existing cycle.
    let limit = store.count()?;
    let mut cursor = Some(successor_id.to_string());
    let mut steps = 0;
    while let Some(current) = cursor {
        if current == id {
            return Err(OrgTreeError::CycleRejected {
                node_id: id.to_string(),
                target_id: successor_id.to_string(),
            });
        }
        steps += 1;
        if steps > limit {
            return Err(OrgTreeError::Internal {
                message: format!("replacement chain from {} does not terminate", successor_id),
            });
        }
        cursor = store.get(&current)?.and_then(|o| o.replaced_by);
    }

    org.replaced_by = Some(successor_id.to_string());
    org.touch();
    store.update(org.clone())?;
    Ok(org)
}

/// Remove the successor link of `id`
///
/// # Errors
/// * `OrganizationNotFound` - If `id` does not exist
pub fn clear_replacement<S: RecordStore + ?Sized>(store: &mut S, id: &str) -> Result<Organization> {
    let mut org = load(store, id)?;
    if org.replaced_by.take().is_some() {
        org.touch();
        store.update(org.clone())?;
    }
    Ok(org)
}

/// Successors of `id` in order, `id` excluded
///
/// # Errors
/// * `OrganizationNotFound` - If `id` does not exist
/// * `SuccessorNotFound` - If a link is dangling
pub fn replacement_chain<S: RecordStore + ?Sized>(store: &S, id: &str) -> Result<Vec<Organization>> {
    let start = load(store, id)?;
    let limit = store.count()?;
    let mut chain = Vec::new();
    let mut cursor = start.replaced_by;
    while let Some(next_id) = cursor {
        if chain.len() >= limit {
            return Err(OrgTreeError::Internal {
                message: format!("replacement chain from {} does not terminate", id),
            });
        }
        let next = load_successor(store, &next_id)?;
        cursor = next.replaced_by.clone();
        chain.push(next);
    }
    Ok(chain)
}

/// Last organization in the chain starting at `id`; `id` itself if never replaced
///
/// # Errors
/// * `OrganizationNotFound` - If `id` does not exist
pub fn latest_successor<S: RecordStore + ?Sized>(store: &S, id: &str) -> Result<Organization> {
    match replacement_chain(store, id)?.pop() {
        Some(last) => Ok(last),
        None => load(store, id),
    }
}

/// The organization that `id` replaced, if any
///
/// # Errors
/// * `OrganizationNotFound` - If `id` does not exist
pub fn replaced_organization<S: RecordStore + ?Sized>(
    store: &S,
    id: &str,
) -> Result<Option<Organization>> {
    load(store, id)?;
    store.find_replacing(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::store::MemoryStore;
    use crate::tree::index::insert_root;

    fn store_with(names: &[&str]) -> MemoryStore {
        let mut store = MemoryStore::new();
        for name in names {
            let org = Organization::new(
                format!("t:{}", name),
                "t".to_string(),
                name.to_string(),
                name.to_uppercase(),
            );
            insert_root(&mut store, org).unwrap();
        }
        store
    }

    #[test]
    fn test_set_and_follow_chain() {
        let mut store = store_with(&["a", "b", "c"]);
        set_replacement(&mut store, "t:a", "t:b").unwrap();
        set_replacement(&mut store, "t:b", "t:c").unwrap();

        let chain: Vec<String> = replacement_chain(&store, "t:a")
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(chain, vec!["t:b", "t:c"]);
        assert_eq!(latest_successor(&store, "t:a").unwrap().id, "t:c");
        assert_eq!(latest_successor(&store, "t:c").unwrap().id, "t:c");
        assert_eq!(
            replaced_organization(&store, "t:b").unwrap().map(|o| o.id),
            Some("t:a".to_string())
        );
    }

    #[test]
    fn test_two_node_cycle_rejected() {
        let mut store = store_with(&["x", "y"]);
        set_replacement(&mut store, "t:x", "t:y").unwrap();

        let result = set_replacement(&mut store, "t:y", "t:x");
        assert!(matches!(result, Err(OrgTreeError::CycleRejected { .. })));
        assert_eq!(store.get("t:y").unwrap().unwrap().replaced_by, None);
    }

    #[test]
    fn test_long_cycle_and_self_rejected() {
        let mut store = store_with(&["a", "b", "c"]);
        set_replacement(&mut store, "t:a", "t:b").unwrap();
        set_replacement(&mut store, "t:b", "t:c").unwrap();

        assert!(matches!(
            set_replacement(&mut store, "t:c", "t:a"),
            Err(OrgTreeError::CycleRejected { .. })
        ));
        assert!(matches!(
            set_replacement(&mut store, "t:c", "t:c"),
            Err(OrgTreeError::CycleRejected { .. })
        ));
    }

    #[test]
    fn test_successor_taken_once() {
        let mut store = store_with(&["a", "b", "c"]);
        set_replacement(&mut store, "t:a", "t:c").unwrap();

        let result = set_replacement(&mut store, "t:b", "t:c");
        assert!(matches!(
            result,
            Err(OrgTreeError::AlreadyReplaced { ref replaced_id, .. }) if replaced_id == "t:a"
        ));

        // Re-setting the same link is accepted.
        set_replacement(&mut store, "t:a", "t:c").unwrap();
    }

    #[test]
    fn test_clear_then_reassign() {
        let mut store = store_with(&["a", "b", "c"]);
        set_replacement(&mut store, "t:a", "t:c").unwrap();
        clear_replacement(&mut store, "t:a").unwrap();

        set_replacement(&mut store, "t:b", "t:c").unwrap();
        assert_eq!(store.get("t:a").unwrap().unwrap().replaced_by, None);
    }

    #[test]
    fn test_missing_parties() {
        let mut store = store_with(&["a"]);
        assert!(matches!(
            set_replacement(&mut store, "t:a", "t:zz"),
            Err(OrgTreeError::SuccessorNotFound { .. })
        ));
        assert!(matches!(
            set_replacement(&mut store, "t:zz", "t:a"),
            Err(OrgTreeError::OrganizationNotFound { .. })
        ));
    }
}
