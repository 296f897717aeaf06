//! 编辑器行：将类型树按先序展开为带深度的平铺列表
//!
//! 与序列化器使用同一套 NodeRole/深度规则：字段深度 +1，
//! 编辑器里数组元素也缩进一级以便区分。

use crate::model::serialize::NodeRole;
use crate::model::type_node::{NodeId, TypeKind, TypeNode};

#[derive(Debug, Clone, PartialEq)]
pub struct TypeRow {
    /// 从根开始的子节点下标序列，根为空
    pub path: Vec<usize>,
    pub id: NodeId,
    pub name: String,
    pub kind: TypeKind,
    /// 缩进层级
    pub depth: usize,
    pub role: NodeRole,
}

impl TypeRow {
    /// 数组元素没有名字
    pub fn name_editable(&self) -> bool {
        self.role != NodeRole::ArrayElement
    }

    /// 只有 object 的字段可以删除
    pub fn deletable(&self) -> bool {
        self.role == NodeRole::Field
    }

    pub fn can_add_field(&self) -> bool {
        self.kind == TypeKind::Object
    }
}

pub fn tree_rows(root: &TypeNode) -> Vec<TypeRow> {
    let mut out = Vec::new();
    let mut path = Vec::new();
    walk(&mut out, &mut path, root, 0, NodeRole::Root);
    out
}

fn walk(out: &mut Vec<TypeRow>, path: &mut Vec<usize>, node: &TypeNode, depth: usize, role: NodeRole) {
    out.push(TypeRow {
        path: path.clone(),
        id: node.id,
        name: node.name.clone(),
        kind: node.kind,
        depth,
        role,
    });
    let child_role = NodeRole::of_children(node.kind);
    for (idx, child) in node.children.iter().enumerate() {
        path.push(idx);
        walk(out, path, child, depth + 1, child_role);
        path.pop();
    }
}
