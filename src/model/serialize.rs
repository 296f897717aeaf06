//! 类型树 → 源码文本（纯函数）

use crate::model::type_node::{TypeKind, TypeNode};

/// 每级缩进两个空格
pub const INDENT_UNIT: &str = "  ";

/// 节点在父级中的角色，决定是否输出名字/缩进，以及编辑器中的可编辑性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Root,
    ArrayElement,
    Field,
}

impl NodeRole {
    /// 子节点的角色由父节点种类决定
    pub fn of_children(parent: TypeKind) -> Self {
        match parent {
            TypeKind::Array => NodeRole::ArrayElement,
            _ => NodeRole::Field,
        }
    }

    /// 根与数组元素不输出自己的名字
    pub fn elides_name(&self) -> bool {
        !matches!(self, NodeRole::Field)
    }
}

pub fn indent(depth: usize) -> String {
    INDENT_UNIT.repeat(depth)
}

/// `elide_name_and_indent` 为 true 时不输出 `缩进 + 名字: ` 前缀
pub fn serialize(node: Option<&TypeNode>, depth: usize, elide_name_and_indent: bool) -> String {
    let role = if elide_name_and_indent { NodeRole::Root } else { NodeRole::Field };
    let mut out = String::new();
    if let Some(node) = node {
        write_node(&mut out, node, depth, role);
    }
    out
}

fn write_node(out: &mut String, node: &TypeNode, depth: usize, role: NodeRole) {
    if !role.elides_name() {
        out.push_str(&indent(depth));
        out.push_str(&node.name);
        out.push_str(": ");
    }
    match node.kind {
        TypeKind::String | TypeKind::Number => out.push_str(node.kind.as_str()),
        TypeKind::Array => {
            out.push_str("Array<");
            // 元素不输出名字，深度不变
            if let Some(element) = node.children.first() {
                write_node(out, element, depth, NodeRole::ArrayElement);
            }
            out.push('>');
        }
        TypeKind::Object => {
            out.push_str("{\n");
            for (i, field) in node.children.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                write_node(out, field, depth + 1, NodeRole::Field);
            }
            out.push('\n');
            out.push_str(&indent(depth));
            out.push('}');
        }
    }
}

/// 完整声明：`type <name> = <root>`
pub fn render_declaration(root: &TypeNode) -> String {
    format!("type {} = {}", root.name, serialize(Some(root), 0, true))
}
