use serde_json::{json, Value};

use crate::errors::Result;
use crate::model::Organization;
use crate::ops::store::RecordStore;
use crate::tree::index::load;
use crate::tree::queries::descendants;

/// Render the subtree at `root_id` as an indented outline
///
/// One line per organization in sibling order, indented two spaces per
/// level below `root_id`, using each organization's display string.
/// Affiliated organizations are marked with `[affiliated]`.
///
/// # Errors
/// * `OrganizationNotFound` - If `root_id` does not exist
pub fn render_tree<S: RecordStore + ?Sized>(store: &S, root_id: &str) -> Result<String> {
    let root = load(store, root_id)?;
    let base_level = root.interval.level;

    let mut output = String::new();
    let mut push_line = |org: &Organization| {
        let depth = (org.interval.level - base_level) as usize;
        output.push_str(&"  ".repeat(depth));
        output.push_str("- ");
        output.push_str(&org.to_string());
        if org.is_affiliated() {
            output.push_str(" [affiliated]");
        }
        output.push('\n');
    };

    push_line(&root);
    for org in descendants(store, root_id)? {
        push_line(&org);
    }
    Ok(output)
}

/// Nested JSON view of the subtree at `root_id`
///
/// Each node carries `id`, `name`, `distinct_name`, `kind` and `children`.
///
/// # Errors
/// * `OrganizationNotFound` - If `root_id` does not exist
pub fn tree_to_json<S: RecordStore + ?Sized>(store: &S, root_id: &str) -> Result<Value> {
    let root = load(store, root_id)?;
    node_to_json(store, &root)
}

fn node_to_json<S: RecordStore + ?Sized>(store: &S, org: &Organization) -> Result<Value> {
    let children = store
        .get_by_parent(&org.id)?
        .iter()
        .map(|child| node_to_json(store, child))
        .collect::<Result<Vec<Value>>>()?;

    Ok(json!({
        "id": org.id,
        "name": org.name,
        "distinct_name": org.distinct_name,
        "kind": org.kind,
        "children": children,
    }))
}
