//! Structural queries answered from the nested intervals

use super::index::load;
use crate::errors::{OrgTreeError, Result};
use crate::model::{Organization, OrganizationKind};
use crate::ops::store::RecordStore;

/// Ancestors of a node, root first
///
/// # Errors
/// * `OrganizationNotFound` - If the node does not exist
pub fn ancestors<S: RecordStore + ?Sized>(store: &S, id: &str) -> Result<Vec<Organization>> {
    let node = load(store, id)?;
    let iv = node.interval;
    if iv.left <= 1 {
        return Ok(Vec::new());
    }
    Ok(store
        .tree_range(iv.tree_id, 1, iv.left - 1)?
        .into_iter()
        .filter(|o| o.interval.right > iv.right)
        .collect())
}

/// Every descendant of a node in pre-order
///
/// # Errors
/// * `OrganizationNotFound` - If the node does not exist
pub fn descendants<S: RecordStore + ?Sized>(store: &S, id: &str) -> Result<Vec<Organization>> {
    let node = load(store, id)?;
    let iv = node.interval;
    if iv.is_leaf() {
        return Ok(Vec::new());
    }
    store.tree_range(iv.tree_id, iv.left + 1, iv.right - 1)
}

/// Direct children in sibling order
///
/// # Errors
/// * `OrganizationNotFound` - If the node does not exist
pub fn children<S: RecordStore + ?Sized>(store: &S, id: &str) -> Result<Vec<Organization>> {
    load(store, id)?;
    store.get_by_parent(id)
}

/// Other children of the same parent; for a root, the other roots
///
/// # Errors
/// * `OrganizationNotFound` - If the node does not exist
pub fn siblings<S: RecordStore + ?Sized>(store: &S, id: &str) -> Result<Vec<Organization>> {
    let node = load(store, id)?;
    let all = match node.parent_id.as_deref() {
        Some(parent_id) => store.get_by_parent(parent_id)?,
        None => store.roots()?,
    };
    Ok(all.into_iter().filter(|o| o.id != node.id).collect())
}

/// Number of nodes in the subtree, the node included
///
/// # Errors
/// * `OrganizationNotFound` - If the node does not exist
pub fn subtree_size<S: RecordStore + ?Sized>(store: &S, id: &str) -> Result<u64> {
    Ok(load(store, id)?.interval.descendant_count() + 1)
}

/// True if `ancestor_id` is a proper ancestor of `id`
///
/// # Errors
/// * `OrganizationNotFound` - If either node does not exist
pub fn is_ancestor_of<S: RecordStore + ?Sized>(
    store: &S,
    ancestor_id: &str,
    id: &str,
) -> Result<bool> {
    let ancestor = load(store, ancestor_id)?;
    let node = load(store, id)?;
    Ok(ancestor.interval.contains(&node.interval))
}

/// Root of the tree containing the node
///
/// # Errors
/// * `OrganizationNotFound` - If the node does not exist
pub fn tree_root<S: RecordStore + ?Sized>(store: &S, id: &str) -> Result<Organization> {
    let node = load(store, id)?;
    if node.is_root() {
        return Ok(node);
    }
    let mut first = store.tree_range(node.interval.tree_id, 1, 1)?;
    match first.pop() {
        Some(root) => Ok(root),
        None => Err(OrgTreeError::IntervalCorruption {
            node_id: node.id,
            tree_id: node.interval.tree_id,
            left: node.interval.left,
            right: node.interval.right,
            level: node.interval.level,
            reason: "tree has no node at left bound 1".to_string(),
        }),
    }
}

/// True if the node has no children
///
/// # Errors
/// * `OrganizationNotFound` - If the node does not exist
pub fn is_leaf<S: RecordStore + ?Sized>(store: &S, id: &str) -> Result<bool> {
    Ok(load(store, id)?.interval.is_leaf())
}

fn children_of_kind<S: RecordStore + ?Sized>(
    store: &S,
    id: &str,
    kind: OrganizationKind,
) -> Result<Vec<Organization>> {
    Ok(children(store, id)?
        .into_iter()
        .filter(|o| o.kind == kind)
        .collect())
}

/// Normal children
///
/// # Errors
/// * `OrganizationNotFound` - If the node does not exist
pub fn sub_organizations<S: RecordStore + ?Sized>(
    store: &S,
    id: &str,
) -> Result<Vec<Organization>> {
    children_of_kind(store, id, OrganizationKind::Normal)
}

/// Affiliated children
///
/// # Errors
/// * `OrganizationNotFound` - If the node does not exist
pub fn affiliated_organizations<S: RecordStore + ?Sized>(
    store: &S,
    id: &str,
) -> Result<Vec<Organization>> {
    children_of_kind(store, id, OrganizationKind::Affiliated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::store::MemoryStore;
    use crate::tree::index::{insert_child, insert_root, Position};

    fn org(name: &str, kind: OrganizationKind) -> Organization {
        let mut o = Organization::new(
            format!("t:{}", name),
            "t".to_string(),
            name.to_string(),
            name.to_string(),
        );
        o.kind = kind;
        o
    }

    fn ids(orgs: Vec<Organization>) -> Vec<String> {
        orgs.into_iter().map(|o| o.origin_id).collect()
    }

    // root
    // ├── aff (affiliated)
    // ├── dept
    // │   └── unit
    // └── office
    fn sample() -> MemoryStore {
        let mut store = MemoryStore::new();
        insert_root(&mut store, org("root", OrganizationKind::Normal)).unwrap();
        insert_child(&mut store, org("aff", OrganizationKind::Affiliated), "t:root", Position::LastChild).unwrap();
        insert_child(&mut store, org("dept", OrganizationKind::Normal), "t:root", Position::LastChild).unwrap();
        insert_child(&mut store, org("unit", OrganizationKind::Normal), "t:dept", Position::LastChild).unwrap();
        insert_child(&mut store, org("office", OrganizationKind::Normal), "t:root", Position::LastChild).unwrap();
        store
    }

    #[test]
    fn test_ancestors_root_first() {
        let store = sample();
        assert_eq!(ids(ancestors(&store, "t:unit").unwrap()), vec!["root", "dept"]);
        assert!(ancestors(&store, "t:root").unwrap().is_empty());
    }

    #[test]
    fn test_descendants_preorder() {
        let store = sample();
        assert_eq!(
            ids(descendants(&store, "t:root").unwrap()),
            vec!["aff", "dept", "unit", "office"]
        );
        assert!(descendants(&store, "t:office").unwrap().is_empty());
        assert_eq!(subtree_size(&store, "t:root").unwrap(), 5);
        assert_eq!(subtree_size(&store, "t:unit").unwrap(), 1);
    }

    #[test]
    fn test_children_and_kind_filters() {
        let store = sample();
        assert_eq!(
            ids(children(&store, "t:root").unwrap()),
            vec!["aff", "dept", "office"]
        );
        assert_eq!(
            ids(sub_organizations(&store, "t:root").unwrap()),
            vec!["dept", "office"]
        );
        assert_eq!(ids(affiliated_organizations(&store, "t:root").unwrap()), vec!["aff"]);
    }

    #[test]
    fn test_siblings() {
        let mut store = sample();
        assert_eq!(ids(siblings(&store, "t:dept").unwrap()), vec!["aff", "office"]);

        insert_root(&mut store, org("other", OrganizationKind::Normal)).unwrap();
        assert_eq!(ids(siblings(&store, "t:root").unwrap()), vec!["other"]);
    }

    #[test]
    fn test_ancestry_predicates() {
        let store = sample();
        assert!(is_ancestor_of(&store, "t:root", "t:unit").unwrap());
        assert!(!is_ancestor_of(&store, "t:unit", "t:root").unwrap());
        assert!(!is_ancestor_of(&store, "t:dept", "t:dept").unwrap());
        assert!(!is_ancestor_of(&store, "t:dept", "t:office").unwrap());

        assert_eq!(tree_root(&store, "t:unit").unwrap().id, "t:root");
        assert!(is_leaf(&store, "t:unit").unwrap());
        assert!(!is_leaf(&store, "t:dept").unwrap());
    }

    #[test]
    fn test_unknown_node() {
        let store = sample();
        assert!(matches!(
            ancestors(&store, "t:missing"),
            Err(OrgTreeError::OrganizationNotFound { .. })
        ));
    }
}
