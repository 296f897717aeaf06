//! 类型树：不可变节点 + 写时复制编辑
//!
//! 每次编辑都返回新值，未改动的兄弟子树通过 `Rc` 共享，
//! UI 层可以直接用 `Rc::ptr_eq` 判断是否发生变化。

use std::{fmt, rc::Rc, str::FromStr};

use serde::Serialize;

use crate::model::editor_state::EditError;

/// 可表示的类型种类（封闭集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    String,
    Number,
    Array,
    Object,
}

impl TypeKind {
    /// 选择器中的固定顺序
    pub const ALL: [TypeKind; 4] = [
        TypeKind::String,
        TypeKind::Number,
        TypeKind::Array,
        TypeKind::Object,
    ];

    /// 输出中使用的种类名（原样输出）
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::String => "string",
            TypeKind::Number => "number",
            TypeKind::Array => "array",
            TypeKind::Object => "object",
        }
    }

    /// 在 ALL 中的位置，即下拉框的选中下标
    pub fn index(&self) -> usize {
        match self {
            TypeKind::String => 0,
            TypeKind::Number => 1,
            TypeKind::Array => 2,
            TypeKind::Object => 3,
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeKind {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| EditError::UnknownKind(s.to_string()))
    }
}

/// 节点身份标识，仅供编辑器做稳定键使用
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 显式传递的身份生成器，单调递增且从不重置
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 分配下一个 id（首个为 1）
    pub fn next_id(&mut self) -> NodeId {
        self.last += 1;
        NodeId(self.last)
    }

    /// 最近一次分配的 id，尚未分配时为 None
    #[cfg(test)]
    pub(crate) fn last_issued(&self) -> Option<NodeId> {
        (self.last > 0).then_some(NodeId(self.last))
    }
}

/// 一个类型声明或嵌套字段
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeNode {
    pub name: String,
    pub kind: TypeKind,
    pub id: NodeId,
    /// primitive: 空；array: 恰好一个元素类型；object: 零或多个字段
    pub children: Vec<Rc<TypeNode>>,
}

impl TypeNode {
    /// 新建默认节点：空名字、string 种类
    pub fn new_default(ids: &mut IdGenerator) -> Self {
        Self {
            name: String::new(),
            kind: TypeKind::String,
            id: ids.next_id(),
            children: Vec::new(),
        }
    }

    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// 切换种类：种类未变时原样返回，否则丢弃原有子节点
    pub fn with_kind(&self, kind: TypeKind, ids: &mut IdGenerator) -> Self {
        if kind == self.kind {
            return self.clone();
        }
        let children = match kind {
            TypeKind::Array => vec![Rc::new(TypeNode::new_default(ids))],
            _ => Vec::new(),
        };
        Self {
            kind,
            children,
            ..self.clone()
        }
    }

    /// 在同一位置替换子节点，其余子节点共享不变
    pub fn with_child_replaced(&self, idx: usize, child: Rc<TypeNode>) -> Result<Self, EditError> {
        if idx >= self.children.len() {
            return Err(EditError::PathNotFound(format!("{} 没有第 {} 个子节点", self.id, idx)));
        }
        let mut children = self.children.clone();
        children[idx] = child;
        Ok(Self {
            children,
            ..self.clone()
        })
    }

    /// 删除指定位置的子节点，后续兄弟前移
    pub fn without_child(&self, idx: usize) -> Result<Self, EditError> {
        if idx >= self.children.len() {
            return Err(EditError::PathNotFound(format!("{} 没有第 {} 个子节点", self.id, idx)));
        }
        let mut children = self.children.clone();
        children.remove(idx);
        Ok(Self {
            children,
            ..self.clone()
        })
    }

    /// 追加一个默认字段（仅 object）
    pub fn with_field_appended(&self, ids: &mut IdGenerator) -> Result<Self, EditError> {
        if self.kind != TypeKind::Object {
            return Err(EditError::NotAnObject(format!("{} 是 {}", self.id, self.kind)));
        }
        let mut children = self.children.clone();
        children.push(Rc::new(TypeNode::new_default(ids)));
        Ok(Self {
            children,
            ..self.clone()
        })
    }

    /// 子节点数量是否符合种类约束
    pub fn is_consistent(&self) -> bool {
        let own = match self.kind {
            TypeKind::String | TypeKind::Number => self.children.is_empty(),
            TypeKind::Array => self.children.len() == 1,
            TypeKind::Object => true,
        };
        own && self.children.iter().all(|c| c.is_consistent())
    }

    /// 按路径查找节点
    pub fn get(&self, path: &[usize]) -> Option<&TypeNode> {
        match path.split_first() {
            None => Some(self),
            Some((&idx, rest)) => self.children.get(idx)?.get(rest),
        }
    }
}

/// 重建从根到目标节点的路径，`edit` 作用于目标节点
///
/// `edit` 返回 `None` 表示目标未变化，此时原样返回旧根（指针相等）。
pub fn update_at<F>(node: &Rc<TypeNode>, path: &[usize], edit: F) -> Result<Rc<TypeNode>, EditError>
where
    F: FnOnce(&TypeNode) -> Result<Option<TypeNode>, EditError>,
{
    let Some((&idx, rest)) = path.split_first() else {
        return Ok(match edit(node)? {
            Some(updated) => Rc::new(updated),
            None => Rc::clone(node),
        });
    };

    let child = node
        .children
        .get(idx)
        .ok_or_else(|| EditError::PathNotFound(format!("{} 没有第 {} 个子节点", node.id, idx)))?;
    let new_child = update_at(child, rest, edit)?;
    if Rc::ptr_eq(child, &new_child) {
        return Ok(Rc::clone(node));
    }
    Ok(Rc::new(node.with_child_replaced(idx, new_child)?))
}
