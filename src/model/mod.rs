pub mod editor_state;
pub mod serialize;
pub mod tree_rows;
pub mod type_node;
