//! VM桥接层：连接Slint UI与EditorState数据模型
//!
//! 注意：回调绑定在main.rs中，因为依赖于Slint生成的类型
//! 这里提供公共常量以及行路径的字符串编解码

use crate::model::editor_state::EditError;
use crate::model::type_node::TypeKind;

// === 常量定义（消除魔法值） ===
pub const STATUS_READY: &str = "就绪";
pub const STATUS_RENAMED: &str = "名字已更新";
pub const STATUS_KIND_CHANGED: &str = "类型已切换";
pub const STATUS_FIELD_ADDED: &str = "已添加字段";
pub const STATUS_FIELD_DELETED: &str = "已删除字段";
pub const STATUS_UNCHANGED: &str = "无变化";
pub const STATUS_ERROR_PREFIX: &str = "错误: ";

/// 行路径分隔符：根为空串，其余如 "0.2.1"
pub const PATH_SEPARATOR: char = '.';

/// 下拉框选项，顺序与 TypeKind::ALL 一致
pub fn kind_labels() -> Vec<&'static str> {
    TypeKind::ALL.iter().map(|k| k.as_str()).collect()
}

pub fn path_key(path: &[usize]) -> String {
    path.iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(&PATH_SEPARATOR.to_string())
}

pub fn parse_path_key(key: &str) -> Result<Vec<usize>, EditError> {
    if key.is_empty() {
        return Ok(Vec::new());
    }
    key.split(PATH_SEPARATOR)
        .map(|seg| {
            seg.parse::<usize>()
                .map_err(|_| EditError::InvalidPath(key.to_string()))
        })
        .collect()
}
