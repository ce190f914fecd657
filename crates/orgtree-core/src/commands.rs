//! Command inventory
//!
//! Commands are the entry point for every structural or field mutation and
//! are processed by `apply()`.

use crate::model::{NewOrganization, OrganizationPatch};
use crate::tree::Position;

/// Mutation request processed by `apply()`
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Create an organization as a new root or under `parent_id`
    CreateOrganization(NewOrganization),

    /// Edit fields; a parent change re-places the subtree, a kind change reorders it
    UpdateOrganization {
        id: String,
        patch: OrganizationPatch,
    },

    /// Move an organization and its subtree; `None` makes it a root
    MoveOrganization {
        id: String,
        new_parent: Option<String>,
        position: Position,
    },

    /// Delete an organization; its children become roots
    DeleteOrganization { id: String },

    /// Set or (with `None`) clear the successor of an organization
    SetReplacement {
        id: String,
        successor: Option<String>,
    },

    CreateCategory {
        id: Option<String>,
        data_source_id: String,
        origin_id: String,
        name: String,
    },

    /// Delete a category; refused while organizations reference it
    DeleteCategory { id: String },
}

impl Command {
    /// Operation name used in logs and errors
    pub fn op_name(&self) -> &'static str {
        match self {
            Command::CreateOrganization(_) => "create_organization",
            Command::UpdateOrganization { .. } => "update_organization",
            Command::MoveOrganization { .. } => "move_organization",
            Command::DeleteOrganization { .. } => "delete_organization",
            Command::SetReplacement { .. } => "set_replacement",
            Command::CreateCategory { .. } => "create_category",
            Command::DeleteCategory { .. } => "delete_category",
        }
    }

    /// True for commands that change tree structure
    pub fn is_structural(&self) -> bool {
        match self {
            Command::CreateOrganization(_)
            | Command::MoveOrganization { .. }
            | Command::DeleteOrganization { .. } => true,
            Command::UpdateOrganization { patch, .. } => {
                patch.parent_id.is_some() || patch.kind.is_some()
            }
            Command::SetReplacement { .. }
            | Command::CreateCategory { .. }
            | Command::DeleteCategory { .. } => false,
        }
    }
}
