//! 类型树可视化编辑器库
//!
//! 提供不可变类型树、按路径编辑、源码序列化和编辑器行展开，
//! 遵循MVVM架构模式，UI 层只负责把回调转发给 EditorState

pub mod model;
pub mod vm;

// 重新导出主要类型
pub use model::editor_state::{EditError, EditorState};
pub use model::serialize::{render_declaration, serialize, NodeRole};
pub use model::tree_rows::{tree_rows, TypeRow};
pub use model::type_node::{IdGenerator, NodeId, TypeKind, TypeNode};
