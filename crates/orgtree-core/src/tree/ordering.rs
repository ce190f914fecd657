//! Sibling ordering policy
//!
//! Under any parent, every Affiliated child comes before every Normal child.
//! Placement without an explicit position appends Affiliated children to the
//! front and Normal children to the back; explicit positions are honored
//! inside the node's own kind group.

use tracing::debug;

use super::index::{load, move_to, Position, Slot};
use crate::errors::Result;
use crate::model::{Organization, OrganizationKind};
use crate::ops::store::RecordStore;

/// Position used when a node is placed without an explicit one
pub fn default_position(kind: OrganizationKind) -> Position {
    match kind {
        OrganizationKind::Affiliated => Position::FirstChild,
        OrganizationKind::Normal => Position::LastChild,
    }
}

/// True if no Normal sibling precedes an Affiliated one
pub fn is_ordered(siblings: &[Organization]) -> bool {
    siblings
        .windows(2)
        .all(|pair| !(pair[0].kind == OrganizationKind::Normal && pair[1].is_affiliated()))
}

/// Translate a requested position into a slot that keeps the kind groups intact
pub(crate) fn resolve_slot<S: RecordStore + ?Sized>(
    store: &S,
    node_id: &str,
    kind: OrganizationKind,
    parent_id: &str,
    position: Position,
) -> Result<Slot> {
    let siblings: Vec<Organization> = store
        .get_by_parent(parent_id)?
        .into_iter()
        .filter(|o| o.id != node_id)
        .collect();

    let slot = match (kind, position) {
        (OrganizationKind::Affiliated, Position::FirstChild) => Slot::FirstChild,
        (OrganizationKind::Affiliated, Position::LastChild) => {
            match siblings.iter().rev().find(|o| o.is_affiliated()) {
                Some(last) => Slot::After(last.id.clone()),
                None => Slot::FirstChild,
            }
        }
        (OrganizationKind::Normal, Position::LastChild) => Slot::LastChild,
        (OrganizationKind::Normal, Position::FirstChild) => {
            match siblings.iter().find(|o| !o.is_affiliated()) {
                Some(first) => Slot::Before(first.id.clone()),
                None => Slot::LastChild,
            }
        }
    };
    Ok(slot)
}

/// Move a node to the default position for its kind under its current parent
///
/// Returns true when the node was moved; a node already in place is left alone.
///
/// # Errors
/// * `OrganizationNotFound` - If the node does not exist
pub fn place_by_kind<S: RecordStore + ?Sized>(store: &mut S, node_id: &str) -> Result<bool> {
    let node = load(store, node_id)?;
    let Some(parent_id) = node.parent_id.clone() else {
        return Ok(false);
    };

    let siblings = store.get_by_parent(&parent_id)?;
    let in_place = match default_position(node.kind) {
        Position::FirstChild => siblings.first(),
        Position::LastChild => siblings.last(),
    }
    .is_some_and(|o| o.id == node.id);
    if in_place {
        return Ok(false);
    }

    let slot = resolve_slot(
        store,
        node_id,
        node.kind,
        &parent_id,
        default_position(node.kind),
    )?;
    debug!(org_id = node_id, parent_id = %parent_id, ?slot, "place_by_kind");
    move_to(store, node_id, Some(&parent_id), &slot)?;
    Ok(true)
}

/// Re-place a node among its siblings if its kind puts it in the wrong group
///
/// Returns true when the node was moved.
///
/// # Errors
/// * `OrganizationNotFound` - If the node does not exist
pub fn apply_ordering_policy<S: RecordStore + ?Sized>(store: &mut S, node_id: &str) -> Result<bool> {
    let node = load(store, node_id)?;
    let Some(parent_id) = node.parent_id.clone() else {
        return Ok(false);
    };

    let siblings = store.get_by_parent(&parent_id)?;
    let Some(index) = siblings.iter().position(|o| o.id == node.id) else {
        return Ok(false);
    };

    let misplaced = match node.kind {
        OrganizationKind::Affiliated => siblings[..index].iter().any(|o| !o.is_affiliated()),
        OrganizationKind::Normal => siblings[index + 1..].iter().any(|o| o.is_affiliated()),
    };
    if !misplaced {
        return Ok(false);
    }

    let slot = resolve_slot(
        store,
        node_id,
        node.kind,
        &parent_id,
        default_position(node.kind),
    )?;
    debug!(org_id = node_id, parent_id = %parent_id, ?slot, "reorder");
    move_to(store, node_id, Some(&parent_id), &slot)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::store::MemoryStore;
    use crate::tree::index::{insert_at, insert_root};

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

    fn place(store: &mut MemoryStore, name: &str, kind: OrganizationKind, position: Position) {
        let id = format!("t:{}", name);
        let slot = resolve_slot(store, &id, kind, "t:p", position).unwrap();
        insert_at(store, org(name, kind), "t:p", &slot).unwrap();
    }

    fn child_names(store: &MemoryStore) -> Vec<String> {
        store
            .get_by_parent("t:p")
            .unwrap()
            .into_iter()
            .map(|o| o.origin_id)
            .collect()
    }

    fn parent_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        insert_root(&mut store, org("p", OrganizationKind::Normal)).unwrap();
        store
    }

    #[test]
    fn test_default_positions() {
        assert_eq!(default_position(OrganizationKind::Affiliated), Position::FirstChild);
        assert_eq!(default_position(OrganizationKind::Normal), Position::LastChild);
    }

    #[test]
    fn test_affiliated_placed_before_normal() {
        let mut store = parent_store();
        place(&mut store, "b", OrganizationKind::Normal, Position::LastChild);
        place(&mut store, "c", OrganizationKind::Affiliated, Position::FirstChild);

        assert_eq!(child_names(&store), vec!["c", "b"]);
    }

    #[test]
    fn test_explicit_positions_stay_inside_kind_group() {
        let mut store = parent_store();
        place(&mut store, "a1", OrganizationKind::Affiliated, Position::FirstChild);
        place(&mut store, "n1", OrganizationKind::Normal, Position::LastChild);
        // Normal first child lands after the affiliated group.
        place(&mut store, "n0", OrganizationKind::Normal, Position::FirstChild);
        // Affiliated last child lands before the normal group.
        place(&mut store, "a2", OrganizationKind::Affiliated, Position::LastChild);

        assert_eq!(child_names(&store), vec!["a1", "a2", "n0", "n1"]);
        assert!(is_ordered(&store.get_by_parent("t:p").unwrap()));
    }

    #[test]
    fn test_kind_change_reorders() {
        let mut store = parent_store();
        place(&mut store, "a", OrganizationKind::Affiliated, Position::FirstChild);
        place(&mut store, "b", OrganizationKind::Normal, Position::LastChild);
        place(&mut store, "c", OrganizationKind::Normal, Position::LastChild);

        let mut c = store.get("t:c").unwrap().unwrap();
        c.kind = OrganizationKind::Affiliated;
        store.update(c).unwrap();
        assert!(!is_ordered(&store.get_by_parent("t:p").unwrap()));

        assert!(apply_ordering_policy(&mut store, "t:c").unwrap());
        assert_eq!(child_names(&store), vec!["c", "a", "b"]);

        let mut c = store.get("t:c").unwrap().unwrap();
        c.kind = OrganizationKind::Normal;
        store.update(c).unwrap();

        assert!(apply_ordering_policy(&mut store, "t:c").unwrap());
        assert_eq!(child_names(&store), vec!["a", "b", "c"]);
        assert!(!apply_ordering_policy(&mut store, "t:b").unwrap());
    }

    #[test]
    fn test_place_by_kind_second_pass() {
        let mut store = parent_store();
        insert_at(&mut store, org("a1", OrganizationKind::Affiliated), "t:p", &Slot::LastChild).unwrap();
        insert_at(&mut store, org("b", OrganizationKind::Normal), "t:p", &Slot::LastChild).unwrap();
        insert_at(&mut store, org("a2", OrganizationKind::Affiliated), "t:p", &Slot::LastChild).unwrap();

        assert!(place_by_kind(&mut store, "t:a2").unwrap());
        assert_eq!(child_names(&store), vec!["a2", "a1", "b"]);
        assert!(!place_by_kind(&mut store, "t:a2").unwrap());
        assert!(!place_by_kind(&mut store, "t:b").unwrap());
        assert!(!place_by_kind(&mut store, "t:p").unwrap());
    }

    #[test]
    fn test_root_is_never_reordered() {
        let mut store = parent_store();
        assert!(!apply_ordering_policy(&mut store, "t:p").unwrap());
    }
}
