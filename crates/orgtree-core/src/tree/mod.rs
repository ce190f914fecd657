//! Nested-interval tree index
//!
//! `index` maintains the intervals, `ordering` decides where among its
//! siblings a node lands, `queries` answers structural questions from the
//! intervals alone.

pub mod index;
pub mod ordering;
pub mod queries;

pub use index::{delete_node, detach_children_on_delete, insert_child, insert_root, move_node, Position};
pub use ordering::{apply_ordering_policy, default_position, is_ordered, place_by_kind};
