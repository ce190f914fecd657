use serde::{Deserialize, Serialize};

/// Nested-interval coordinates of one node inside a tree of the forest
///
/// Within a tree every node owns `[left, right]`; a node is an ancestor of
/// another exactly when its interval strictly encloses the other's. Bounds
/// of one tree are the integers `1..=2n` with no gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Interval {
    /// Tree this node belongs to; disjoint trees share one forest
    pub tree_id: u64,
    pub left: u64,
    pub right: u64,
    /// Number of ancestors
    pub level: u32,
}

impl Interval {
    /// Interval of a single-node tree
    pub fn root(tree_id: u64) -> Self {
        Self {
            tree_id,
            left: 1,
            right: 2,
            level: 0,
        }
    }

    /// Interval of a leaf placed at `left` one level below `parent_level`
    pub fn leaf_at(tree_id: u64, left: u64, parent_level: u32) -> Self {
        Self {
            tree_id,
            left,
            right: left + 1,
            level: parent_level + 1,
        }
    }

    /// True when `other` is a strict descendant of this node
    pub fn contains(&self, other: &Interval) -> bool {
        self.tree_id == other.tree_id && self.left < other.left && other.right < self.right
    }

    /// True when `other` is this node or one of its descendants
    pub fn contains_or_equals(&self, other: &Interval) -> bool {
        self == other || self.contains(other)
    }

    /// True when both intervals belong to the same tree and do not overlap
    pub fn is_disjoint(&self, other: &Interval) -> bool {
        self.tree_id != other.tree_id || self.right < other.left || other.right < self.left
    }

    pub fn is_root(&self) -> bool {
        self.level == 0
    }

    pub fn is_leaf(&self) -> bool {
        self.right == self.left + 1
    }

    /// Number of bound positions the subtree occupies (always even)
    pub fn span(&self) -> u64 {
        self.right + 1 - self.left
    }

    pub fn descendant_count(&self) -> u64 {
        (self.right - self.left - 1) / 2
    }
}
