pub mod tree_render;

pub use tree_render::{render_tree, tree_to_json};
