//! EditorState：应用核心状态与按路径编辑

use std::rc::Rc;

use thiserror::Error;

use crate::model::serialize::render_declaration;
use crate::model::tree_rows::{tree_rows, TypeRow};
use crate::model::type_node::{update_at, IdGenerator, TypeKind, TypeNode};

#[derive(Error, Debug)]
pub enum EditError {
    #[error("路径不存在: {0}")]
    PathNotFound(String),
    #[error("路径格式错误: {0}")]
    InvalidPath(String),
    #[error("不可删除: {0}")]
    NotDeletable(String),
    #[error("数组元素没有名字: {0}")]
    UnnamedElement(String),
    #[error("不是 object: {0}")]
    NotAnObject(String),
    #[error("未知类型: {0}")]
    UnknownKind(String),
    #[error("JSON序列化失败: {0}")]
    Json(#[from] serde_json::Error),
}

/// 唯一的根节点 + 身份生成器；每次编辑整体替换根
#[derive(Debug)]
pub struct EditorState {
    ids: IdGenerator,
    root: Rc<TypeNode>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState {
    pub fn new() -> Self {
        let mut ids = IdGenerator::new();
        let root = Rc::new(TypeNode::new_default(&mut ids));
        Self { ids, root }
    }

    pub fn root(&self) -> &Rc<TypeNode> {
        &self.root
    }

    /// 修改名字；数组元素的名字不可编辑
    pub fn rename(&mut self, path: &[usize], name: &str) -> Result<bool, EditError> {
        if self.is_array_element(path) {
            return Err(EditError::UnnamedElement(format!("{:?}", path)));
        }
        self.apply(path, |node| {
            if node.name == name {
                return Ok(None);
            }
            Ok(Some(node.with_name(name)))
        })
    }

    /// 切换种类，种类相同时不产生新树
    pub fn change_kind(&mut self, path: &[usize], kind: TypeKind) -> Result<bool, EditError> {
        let ids = &mut self.ids;
        let root = &self.root;
        let new_root = update_at(root, path, |node| {
            if node.kind == kind {
                return Ok(None);
            }
            Ok(Some(node.with_kind(kind, ids)))
        })?;
        Ok(self.replace_root(new_root))
    }

    /// 给 object 追加一个默认字段
    pub fn add_field(&mut self, path: &[usize]) -> Result<bool, EditError> {
        let ids = &mut self.ids;
        let new_root = update_at(&self.root, path, |node| node.with_field_appended(ids).map(Some))?;
        Ok(self.replace_root(new_root))
    }

    /// 删除 object 的某个字段；根节点与数组元素不可删除
    pub fn delete_field(&mut self, path: &[usize]) -> Result<bool, EditError> {
        let Some((&idx, parent_path)) = path.split_last() else {
            return Err(EditError::NotDeletable("根节点".into()));
        };
        let parent = self
            .root
            .get(parent_path)
            .ok_or_else(|| EditError::PathNotFound(format!("{:?}", parent_path)))?;
        if parent.kind != TypeKind::Object {
            return Err(EditError::NotDeletable(format!("{:?} 是 {} 的元素", path, parent.kind)));
        }
        self.apply(parent_path, |node| node.without_child(idx).map(Some))
    }

    pub fn rows(&self) -> Vec<TypeRow> {
        tree_rows(&self.root)
    }

    /// 路径对应的行及其在 rows() 中的下标，用于原地更新单行
    pub fn row_at(&self, path: &[usize]) -> Option<(usize, TypeRow)> {
        self.rows().into_iter().enumerate().find(|(_, row)| row.path == path)
    }

    /// 右侧面板显示的源码
    pub fn source_text(&self) -> String {
        render_declaration(&self.root)
    }

    /// 结构 JSON（只读调试视图）
    pub fn structure_json(&self) -> Result<String, EditError> {
        Ok(serde_json::to_string_pretty(self.root.as_ref())?)
    }

    fn is_array_element(&self, path: &[usize]) -> bool {
        match path.split_last() {
            Some((_, parent_path)) => self
                .root
                .get(parent_path)
                .is_some_and(|p| p.kind == TypeKind::Array),
            None => false,
        }
    }

    fn apply<F>(&mut self, path: &[usize], edit: F) -> Result<bool, EditError>
    where
        F: FnOnce(&TypeNode) -> Result<Option<TypeNode>, EditError>,
    {
        let new_root = update_at(&self.root, path, edit)?;
        Ok(self.replace_root(new_root))
    }

    /// 按引用判断是否变化
    fn replace_root(&mut self, new_root: Rc<TypeNode>) -> bool {
        if Rc::ptr_eq(&self.root, &new_root) {
            return false;
        }
        self.root = new_root;
        debug_assert!(self.root.is_consistent(), "种类与子节点数量不一致");
        tracing::debug!(
            "类型树已更新: {}",
            serde_json::to_string(self.root.as_ref()).unwrap_or_default()
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::type_node::NodeId;

    #[test]
    fn test_initial_state() {
        let state = EditorState::new();
        assert_eq!(state.root().kind, TypeKind::String);
        assert_eq!(state.root().name, "");
        assert_eq!(state.root().id, NodeId(1));
        assert_eq!(state.source_text(), "type  = string");
    }

    #[test]
    fn test_scenario_root_string() {
        let mut state = EditorState::new();
        assert!(state.rename(&[], "Foo").unwrap());
        assert_eq!(state.source_text(), "type Foo = string");
    }

    #[test]
    fn test_scenario_array_of_number() {
        let mut state = EditorState::new();
        state.rename(&[], "Foo").unwrap();
        state.change_kind(&[], TypeKind::Array).unwrap();
        state.change_kind(&[0], TypeKind::Number).unwrap();
        assert_eq!(state.source_text(), "type Foo = Array<number>");
    }

    #[test]
    fn test_scenario_object_one_field() {
        let mut state = EditorState::new();
        state.rename(&[], "Foo").unwrap();
        state.change_kind(&[], TypeKind::Object).unwrap();
        state.add_field(&[]).unwrap();
        state.rename(&[0], "bar").unwrap();
        assert_eq!(state.source_text(), "type Foo = {\n  bar: string\n}");
    }

    #[test]
    fn test_scenario_nested_object_in_array_in_object() {
        let mut state = EditorState::new();
        state.rename(&[], "Foo").unwrap();
        state.change_kind(&[], TypeKind::Object).unwrap();
        state.add_field(&[]).unwrap();
        state.rename(&[0], "list").unwrap();
        state.change_kind(&[0], TypeKind::Array).unwrap();
        state.change_kind(&[0, 0], TypeKind::Object).unwrap();
        state.add_field(&[0, 0]).unwrap();
        state.rename(&[0, 0, 0], "deep").unwrap();
        state.change_kind(&[0, 0, 0], TypeKind::Object).unwrap();
        state.add_field(&[0, 0, 0]).unwrap();
        state.rename(&[0, 0, 0, 0], "n").unwrap();
        state.change_kind(&[0, 0, 0, 0], TypeKind::Number).unwrap();

        let expected = "type Foo = {\n  list: Array<{\n    deep: {\n      n: number\n    }\n  }>\n}";
        assert_eq!(state.source_text(), expected);
    }

    #[test]
    fn test_unchanged_edits_keep_root_pointer() {
        let mut state = EditorState::new();
        state.rename(&[], "Foo").unwrap();
        let before = Rc::clone(state.root());
        assert!(!state.rename(&[], "Foo").unwrap());
        assert!(!state.change_kind(&[], TypeKind::String).unwrap());
        assert!(Rc::ptr_eq(&before, state.root()));
    }

    #[test]
    fn test_edit_child_keeps_other_indices() {
        let mut state = EditorState::new();
        state.change_kind(&[], TypeKind::Object).unwrap();
        for _ in 0..3 {
            state.add_field(&[]).unwrap();
        }
        let before: Vec<Rc<TypeNode>> = state.root().children.clone();
        state.change_kind(&[1], TypeKind::Number).unwrap();

        let after = &state.root().children;
        assert!(Rc::ptr_eq(&before[0], &after[0]));
        assert!(Rc::ptr_eq(&before[2], &after[2]));
        assert_eq!(after[1].id, before[1].id);
        assert_eq!(after[1].kind, TypeKind::Number);
    }

    #[test]
    fn test_delete_middle_field() {
        let mut state = EditorState::new();
        state.change_kind(&[], TypeKind::Object).unwrap();
        for name in ["c0", "c1", "c2"] {
            state.add_field(&[]).unwrap();
            let last = state.root().children.len() - 1;
            state.rename(&[last], name).unwrap();
        }
        let before: Vec<Rc<TypeNode>> = state.root().children.clone();
        assert!(state.delete_field(&[1]).unwrap());

        let after = &state.root().children;
        assert_eq!(after.len(), 2);
        assert!(Rc::ptr_eq(&before[0], &after[0]));
        assert!(Rc::ptr_eq(&before[2], &after[1]));
    }

    #[test]
    fn test_delete_rejected_for_root_and_array_element() {
        let mut state = EditorState::new();
        assert!(matches!(state.delete_field(&[]), Err(EditError::NotDeletable(_))));

        state.change_kind(&[], TypeKind::Array).unwrap();
        assert!(matches!(state.delete_field(&[0]), Err(EditError::NotDeletable(_))));
        assert_eq!(state.root().children.len(), 1);
        assert!(state.root().is_consistent());
    }

    #[test]
    fn test_invalid_paths() {
        let mut state = EditorState::new();
        assert!(matches!(state.rename(&[0], "x"), Err(EditError::PathNotFound(_))));
        assert!(matches!(state.add_field(&[]), Err(EditError::NotAnObject(_))));
        state.change_kind(&[], TypeKind::Object).unwrap();
        assert!(matches!(state.delete_field(&[2]), Err(EditError::PathNotFound(_))));
        assert!(matches!(state.delete_field(&[0, 1]), Err(EditError::PathNotFound(_))));
    }

    #[test]
    fn test_array_element_name_not_editable() {
        let mut state = EditorState::new();
        state.change_kind(&[], TypeKind::Array).unwrap();
        assert!(matches!(state.rename(&[0], "x"), Err(EditError::UnnamedElement(_))));
        assert_eq!(state.root().children[0].name, "");
    }

    #[test]
    fn test_ids_monotonic_across_session() {
        let mut state = EditorState::new();
        state.change_kind(&[], TypeKind::Object).unwrap();
        state.add_field(&[]).unwrap();
        state.change_kind(&[0], TypeKind::Array).unwrap();
        state.add_field(&[]).unwrap();

        let ids: Vec<NodeId> = state.rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![NodeId(1), NodeId(2), NodeId(3), NodeId(4)]);
        assert_eq!(state.ids.last_issued(), Some(NodeId(4)));
    }

    #[test]
    fn test_row_at_follows_rename() {
        let mut state = EditorState::new();
        state.change_kind(&[], TypeKind::Object).unwrap();
        for _ in 0..3 {
            state.add_field(&[]).unwrap();
        }
        state.change_kind(&[1], TypeKind::Array).unwrap();

        let (before_idx, before) = state.row_at(&[2]).unwrap();
        assert!(state.rename(&[2], "renamed").unwrap());
        let (idx, row) = state.row_at(&[2]).unwrap();

        // 改名不改变行结构：同一下标、同一 id，名字与当前树一致
        assert_eq!(idx, before_idx);
        assert_eq!(idx, 4);
        assert_eq!(row.id, before.id);
        assert_eq!(row.name, "renamed");
        assert_eq!(row.name, state.root().children[2].name);
        assert_eq!(state.rows()[idx], row);

        assert!(state.row_at(&[9]).is_none());
    }

    #[test]
    fn test_structure_json() {
        let mut state = EditorState::new();
        state.rename(&[], "Foo").unwrap();
        let value: serde_json::Value = serde_json::from_str(&state.structure_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "name": "Foo", "kind": "string", "id": 1, "children": [] })
        );
    }
}
