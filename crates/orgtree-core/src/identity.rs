//! Identity derivation
//!
//! Organizations and categories are identified by `{data_source_id}:{origin_id}`.
//! The identity is computed once, when a record lacking one is first
//! persisted, and never recomputed afterwards.

use crate::errors::{OrgTreeError, Result};

/// Separator between the data source and the origin id
pub const IDENTITY_SEPARATOR: char = ':';

/// Derive the composite identity for a record
///
/// The data source id must not contain the separator, otherwise the split
/// point of the composite would be ambiguous. The origin id may contain it:
/// the first separator always ends the data source part.
///
/// # Errors
/// * `InvalidIdentity` - If either part is empty or the data source id
///   contains the separator
pub fn derive(data_source_id: &str, origin_id: &str) -> Result<String> {
    let invalid = |reason: &str| OrgTreeError::InvalidIdentity {
        data_source_id: data_source_id.to_string(),
        origin_id: origin_id.to_string(),
        reason: reason.to_string(),
    };

    if data_source_id.trim().is_empty() {
        return Err(invalid("data source id cannot be empty"));
    }
    if origin_id.trim().is_empty() {
        return Err(invalid("origin id cannot be empty"));
    }
    if data_source_id.contains(IDENTITY_SEPARATOR) {
        return Err(invalid("data source id cannot contain the identity separator"));
    }

    Ok(format!(
        "{}{}{}",
        data_source_id, IDENTITY_SEPARATOR, origin_id
    ))
}

/// Split a composite identity into `(data_source_id, origin_id)`
pub fn split(identity: &str) -> Option<(&str, &str)> {
    let (data_source_id, origin_id) = identity.split_once(IDENTITY_SEPARATOR)?;
    if data_source_id.is_empty() || origin_id.is_empty() {
        return None;
    }
    Some((data_source_id, origin_id))
}

/// Resolve the identity of a record about to be persisted
///
/// The data source and origin id are always validated. An identity already
/// present is kept as-is; derivation only happens when none was supplied.
///
/// # Errors
/// * `InvalidIdentity` - If the parts are invalid or a supplied identity is blank
pub fn assign(existing: Option<&str>, data_source_id: &str, origin_id: &str) -> Result<String> {
    let derived = derive(data_source_id, origin_id)?;
    match existing {
        Some(id) if id.trim().is_empty() => Err(OrgTreeError::InvalidIdentity {
            data_source_id: data_source_id.to_string(),
            origin_id: origin_id.to_string(),
            reason: "supplied identity cannot be blank".to_string(),
        }),
        Some(id) => Ok(id.to_string()),
        None => Ok(derived),
    }
}
