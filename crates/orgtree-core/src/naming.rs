//! Distinct-name resolution
//!
//! A distinct name prefixes an organization's name with the short names of
//! its nearest ancestors, e.g. `"ORG / Dept"`. The walk climbs at most
//! `max_levels` ancestors and stops early at organizations the dataset
//! policy marks as stops.

use tracing::debug;

use crate::errors::Result;
use crate::model::Organization;
use crate::ops::store::RecordStore;
use crate::policy::DatasetPolicy;
use crate::tree::index::{load, load_parent};
use crate::tree::queries::descendants;

/// Separator between composed name parts
pub const NAME_SEPARATOR: &str = " / ";

/// Compose the distinct name of `org` from at most `max_levels` ancestors
///
/// Stop lists are those of `org`'s data source. An organization matching
/// them keeps its plain name; an ancestor matching them is still prepended,
/// but the walk ends there.
///
/// # Errors
/// * `ParentNotFound` - If an ancestor reference is dangling
pub fn resolve<S: RecordStore + ?Sized>(
    store: &S,
    org: &Organization,
    policy: &dyn DatasetPolicy,
    max_levels: usize,
) -> Result<String> {
    let data_source_id = org.data_source_id.as_str();
    if policy.is_stop_for(data_source_id, org) {
        return Ok(org.name.clone());
    }

    let mut label = org.name.clone();
    let mut cursor = org.parent_id.clone();
    for _ in 0..max_levels {
        let Some(parent_id) = cursor else {
            break;
        };
        let parent = load_parent(store, &parent_id)?;
        label = format!("{}{}{}", parent.short_name(), NAME_SEPARATOR, label);
        if policy.is_stop_for(data_source_id, &parent) {
            break;
        }
        cursor = parent.parent_id;
    }
    Ok(label)
}

/// Resolve with the level count configured for the organization's data source
///
/// # Errors
/// * `ParentNotFound` - If an ancestor reference is dangling
pub fn resolve_default<S: RecordStore + ?Sized>(
    store: &S,
    org: &Organization,
    policy: &dyn DatasetPolicy,
) -> Result<String> {
    resolve(store, org, policy, policy.distinct_name_levels(&org.data_source_id))
}

/// Recompute cached distinct names affected by a change to `root_id`
///
/// Covers the node itself and every descendant whose label window reaches
/// back to it. Returns how many cached names changed.
pub(crate) fn refresh<S: RecordStore + ?Sized>(
    store: &mut S,
    root_id: &str,
    policy: &dyn DatasetPolicy,
) -> Result<usize> {
    let root = load(store, root_id)?;
    let base_level = root.interval.level;

    let mut candidates = vec![root];
    candidates.extend(descendants(store, root_id)?);

    let mut changed = Vec::new();
    for mut org in candidates {
        let depth = (org.interval.level - base_level) as usize;
        if depth > policy.distinct_name_levels(&org.data_source_id) {
            continue;
        }
        let name = resolve_default(store, &org, policy)?;
        if org.distinct_name.as_deref() != Some(name.as_str()) {
            org.distinct_name = Some(name);
            changed.push(org);
        }
    }

    let count = changed.len();
    if count > 0 {
        debug!(org_id = root_id, changed = count, "refresh_distinct_names");
        store.update_many(changed)?;
    }
    Ok(count)
}
